use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced to the operator. An empty detection is not an error.
#[derive(Debug, Error)]
pub enum HoughError {
    #[error("failed to load image {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{} is not a valid file or directory", .0.display())]
    InvalidPath(PathBuf),
    #[error("failed to save {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("debug directory is not empty: {}", .0.display())]
    DebugDirNotEmpty(PathBuf),
    #[error("failed to read parameters from {}: {source}", path.display())]
    Params {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),
    #[error("invalid value for {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HoughError>;
