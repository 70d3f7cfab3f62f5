use crate::error::{HoughError, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where annotated frames go
pub trait Viewer {
    /// Show `image` in the window called `window`, replacing its previous content
    fn show(&mut self, window: &str, image: &DynamicImage) -> Result<()>;

    /// Tear down every window
    fn close_all(&mut self);
}

/// Writes every frame to one image file, overwriting it.
///
/// Keep the file open in an auto-reloading image viewer to watch tuning live.
#[derive(Debug)]
pub struct PreviewFile {
    path: PathBuf,
    frames: usize,
}

impl PreviewFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            frames: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Viewer for PreviewFile {
    fn show(&mut self, window: &str, image: &DynamicImage) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        image.save(&self.path).map_err(|source| HoughError::Save {
            path: self.path.clone(),
            source,
        })?;
        self.frames += 1;
        debug!(window, frame = self.frames, path = %self.path.display(), "frame written");
        Ok(())
    }

    fn close_all(&mut self) {
        info!(frames = self.frames, path = %self.path.display(), "preview closed");
    }
}

/// Discards frames
#[derive(Debug, Default)]
pub struct NullViewer;

impl Viewer for NullViewer {
    fn show(&mut self, _window: &str, _image: &DynamicImage) -> Result<()> {
        Ok(())
    }

    fn close_all(&mut self) {}
}
