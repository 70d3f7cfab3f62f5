//! One-shot detection over a file, a directory, or a synthetic demo image.
use crate::annotate::{AnnotationStyle, annotate};
use crate::detection::{CircleDetector, preprocessing};
use crate::error::{HoughError, Result};
use crate::models::ImageReport;
use crate::params::HoughParams;
use crate::pipeline::Pipeline;
use crate::report;
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_circle_mut;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_PATTERN: &str = "*.bmp";
pub const RESULTS_DIR: &str = "results";
pub const DEMO_FILE_NAME: &str = "test_circles.bmp";

#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Write annotated copies under `results/` when circles were found
    pub save_results: bool,
    /// Also write the Canny edge map of every image under `results/`
    pub save_edges: bool,
    pub verbose: bool,
    pub pattern: String,
    pub style: AnnotationStyle,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            save_results: true,
            save_edges: false,
            verbose: false,
            pattern: DEFAULT_PATTERN.to_string(),
            style: AnnotationStyle::detailed(),
        }
    }
}

fn file_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

fn results_dir(source: &Path) -> PathBuf {
    source.parent().unwrap_or_else(|| Path::new("")).join(RESULTS_DIR)
}

/// `<dir>/results/<stem>_detected.<ext>` for a source image in `<dir>`
pub fn result_path(source: &Path) -> PathBuf {
    let ext = source
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    results_dir(source).join(format!("{}_detected.{}", file_stem(source), ext))
}

/// `<dir>/results/<stem>_edges.png` for a source image in `<dir>`
pub fn edges_path(source: &Path) -> PathBuf {
    results_dir(source).join(format!("{}_edges.png", file_stem(source)))
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Shell-style match supporting `*` (any run) and `?` (one character)
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ni < n.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == '*' {
            backtrack = Some((pi, ni));
            pi += 1;
        } else if let Some((star, matched)) = backtrack {
            pi = star + 1;
            ni = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}

/// Regular files directly inside `dir` whose name matches `pattern`, sorted
pub fn collect_matching(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if wildcard_match(pattern, &name.to_string_lossy()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Black square with white concentric rings
pub fn synthesize_rings(size: u32, center: (i32, i32), radii: &[i32], thickness: i32) -> RgbImage {
    let mut img = RgbImage::new(size, size);
    for &radius in radii {
        for offset in 0..thickness.max(1) {
            draw_hollow_circle_mut(&mut img, center, radius + offset, Rgb([255, 255, 255]));
        }
    }
    img
}

pub struct BatchRunner<'a> {
    detector: &'a dyn CircleDetector,
    pipeline: &'a Pipeline,
    params: HoughParams,
    options: BatchOptions,
}

impl<'a> BatchRunner<'a> {
    pub fn new(detector: &'a dyn CircleDetector, pipeline: &'a Pipeline, params: HoughParams) -> Self {
        Self {
            detector,
            pipeline,
            params,
            options: BatchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Load, preprocess, detect, report and optionally save one image.
    ///
    /// A load failure returns [`HoughError::Load`] before any detection runs.
    pub fn process_image(&self, path: &Path) -> Result<ImageReport> {
        let image = image::open(path).map_err(|source| HoughError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        self.process_loaded(path, &image)
    }

    fn process_loaded(&self, path: &Path, image: &DynamicImage) -> Result<ImageReport> {
        if self.options.verbose {
            println!("Image loaded: {}x{}", image.width(), image.height());
            println!("Detecting circles with {}", self.detector.name());
        }

        let gray = self.pipeline.run_for(image, &file_stem(path))?;
        let circles = self.detector.detect(&gray, &self.params);
        report::print_circles(&circles, true);

        let mut saved_to = None;
        if self.options.save_results && !circles.is_empty() {
            let output_path = result_path(path);
            create_parent(&output_path)?;
            let annotated = annotate(image, &circles, &self.options.style);
            annotated.save(&output_path).map_err(|source| HoughError::Save {
                path: output_path.clone(),
                source,
            })?;
            println!("Result saved to: {}", output_path.display());
            info!(path = %output_path.display(), "annotated copy written");
            saved_to = Some(output_path);
        }

        let mut edges_saved_to = None;
        if self.options.save_edges {
            let edges = preprocessing::detect_edges(&gray, self.params.param1 / 2.0, self.params.param1);
            let output_path = edges_path(path);
            create_parent(&output_path)?;
            edges.save(&output_path).map_err(|source| HoughError::Save {
                path: output_path.clone(),
                source,
            })?;
            println!("Edge map saved to: {}", output_path.display());
            info!(path = %output_path.display(), "edge map written");
            edges_saved_to = Some(output_path);
        }

        Ok(ImageReport {
            path: path.to_path_buf(),
            width: image.width(),
            height: image.height(),
            circles,
            saved_to,
            edges_saved_to,
        })
    }

    /// Process every matching file in `dir`. Unreadable files are reported and skipped.
    pub fn run_directory(&self, dir: &Path) -> Result<Vec<ImageReport>> {
        let files = collect_matching(dir, &self.options.pattern)?;
        if files.is_empty() {
            println!("No {} files found in {}", self.options.pattern, dir.display());
            return Ok(Vec::new());
        }

        println!("Found {} image files", files.len());
        let mut reports = Vec::with_capacity(files.len());
        for file in files {
            println!("\nProcessing image: {}", file.display());
            match self.process_image(&file) {
                Ok(report) => reports.push(report),
                Err(e @ HoughError::Load { .. }) => {
                    println!("Error: {}", e);
                    warn!(path = %file.display(), "skipped unreadable image");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(reports)
    }

    /// Dispatch on what `path` is: a directory, a single file, or neither
    pub fn run_path(&self, path: &Path) -> Result<Vec<ImageReport>> {
        if path.is_dir() {
            self.run_directory(path)
        } else if path.is_file() {
            Ok(vec![self.process_image(path)?])
        } else {
            Err(HoughError::InvalidPath(path.to_path_buf()))
        }
    }

    /// Write a four-ring test image into `out_dir` and detect circles on it
    pub fn run_demo(&self, out_dir: &Path) -> Result<ImageReport> {
        println!("\nCreating test image...");
        let image = synthesize_rings(500, (250, 250), &[50, 100, 150, 200], 2);

        std::fs::create_dir_all(out_dir)?;
        let path = out_dir.join(DEMO_FILE_NAME);
        image.save(&path).map_err(|source| HoughError::Save {
            path: path.clone(),
            source,
        })?;
        println!("Test image saved as: {}", path.display());

        println!("\nDetecting circles in the test image...");
        self.process_image(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("*.bmp", "a.bmp"));
        assert!(wildcard_match("*.bmp", ".bmp"));
        assert!(!wildcard_match("*.bmp", "a.bmp.txt"));
        assert!(wildcard_match("img_??.png", "img_07.png"));
        assert!(!wildcard_match("img_??.png", "img_7.png"));
        assert!(wildcard_match("*", "anything"));
        assert!(wildcard_match("a*b*c", "aXXbYYc"));
        assert!(!wildcard_match("a*b*c", "aXXbYY"));
    }

    #[test]
    fn test_result_path() {
        let p = result_path(Path::new("/data/run1/frame_03.bmp"));
        assert_eq!(p, PathBuf::from("/data/run1/results/frame_03_detected.bmp"));
        let bare = result_path(Path::new("shot.jpg"));
        assert_eq!(bare, PathBuf::from("results/shot_detected.jpg"));
        let edges = edges_path(Path::new("/data/run1/frame_03.bmp"));
        assert_eq!(edges, PathBuf::from("/data/run1/results/frame_03_edges.png"));
    }

    #[test]
    fn test_synthesize_rings_draws_white() {
        let img = synthesize_rings(100, (50, 50), &[20], 2);
        assert_eq!(*img.get_pixel(70, 50), Rgb([255, 255, 255]));
        assert_eq!(*img.get_pixel(71, 50), Rgb([255, 255, 255]));
        assert_eq!(*img.get_pixel(50, 50), Rgb([0, 0, 0]));
    }
}
