use crate::detection::preprocessing;
use crate::error::Result;
use crate::pipeline::{PipelineContext, PreprocessStep};
use image::GrayImage;

/// Median blur; radius 2 is the usual 5x5 window
pub struct MedianBlurStep {
    pub radius: u32,
}

impl PreprocessStep for MedianBlurStep {
    fn process(&self, image: GrayImage, _context: &PipelineContext) -> Result<GrayImage> {
        Ok(preprocessing::apply_median(&image, self.radius))
    }

    fn name(&self) -> &str {
        "Median Blur"
    }
}

/// Apply Gaussian blur
pub struct GaussianBlurStep {
    pub sigma: f32,
}

impl PreprocessStep for GaussianBlurStep {
    fn process(&self, image: GrayImage, _context: &PipelineContext) -> Result<GrayImage> {
        Ok(preprocessing::apply_blur(&image, self.sigma))
    }

    fn name(&self) -> &str {
        "Gaussian Blur"
    }
}

/// Histogram equalization, useful on low-contrast photographs
pub struct EqualizeStep;

impl PreprocessStep for EqualizeStep {
    fn process(&self, image: GrayImage, context: &PipelineContext) -> Result<GrayImage> {
        let equalized = preprocessing::equalize(&image);
        if context.verbose {
            let (lo, hi) = equalized
                .pixels()
                .fold((u8::MAX, u8::MIN), |(lo, hi), p| (lo.min(p[0]), hi.max(p[0])));
            println!("  Intensity range after equalization: {}..={}", lo, hi);
        }
        Ok(equalized)
    }

    fn name(&self) -> &str {
        "Histogram Equalization"
    }
}
