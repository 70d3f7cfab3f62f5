pub mod circles;
pub mod hough;
pub mod preprocessing;
pub mod steps;

use crate::models::Circle;
use crate::params::HoughParams;
use crate::pipeline::Pipeline;
use image::GrayImage;
use std::sync::Arc;

pub use hough::HoughGradientDetector;
pub use preprocessing::Channel;

/// A "find circles in this grayscale image" capability.
///
/// Finding nothing is a normal outcome and yields an empty vector. Duplicate
/// suppression is the detector's job; callers use the result as is.
pub trait CircleDetector {
    fn detect(&self, gray: &GrayImage, params: &HoughParams) -> Vec<Circle>;

    /// Human-readable name (used in verbose output)
    fn name(&self) -> &str;
}

/// Preprocessing used by the interactive tuner: green channel, 5x5 median blur
pub fn build_tuning_pipeline(verbose: bool) -> Pipeline {
    use steps::MedianBlurStep;

    Pipeline::new()
        .with_verbose(verbose)
        .with_channel(Channel::Green)
        .add_step(Arc::new(MedianBlurStep { radius: 2 }))
}

/// Preprocessing used for file and batch detection: luma, 5x5-equivalent Gaussian blur
pub fn build_standard_pipeline(verbose: bool) -> Pipeline {
    use steps::GaussianBlurStep;

    Pipeline::new()
        .with_verbose(verbose)
        .with_channel(Channel::Luma)
        .add_step(Arc::new(GaussianBlurStep { sigma: 1.1 }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(build_tuning_pipeline(false).step_names(), vec!["Median Blur"]);
        assert_eq!(build_standard_pipeline(false).step_names(), vec!["Gaussian Blur"]);
    }
}
