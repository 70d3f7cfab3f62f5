use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::equalize_histogram;
use imageproc::edges::canny;
use imageproc::filter::{gaussian_blur_f32, median_filter};

/// Which channel of a colour image feeds detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Channel {
    /// Standard luminance conversion
    #[default]
    Luma,
    /// Raw green channel; often the cleanest on Bayer sensors
    Green,
}

/// Reduce an image to a single 8-bit channel
pub fn extract_channel(img: &DynamicImage, channel: Channel) -> GrayImage {
    match channel {
        Channel::Luma => img.to_luma8(),
        Channel::Green => {
            let rgb = img.to_rgb8();
            GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                Luma([rgb.get_pixel(x, y)[1]])
            })
        }
    }
}

/// Apply Gaussian blur to reduce noise
pub fn apply_blur(img: &GrayImage, sigma: f32) -> GrayImage {
    if sigma <= 0.0 {
        return img.clone();
    }
    gaussian_blur_f32(img, sigma)
}

/// Median filter over a (2 * radius + 1) square window
pub fn apply_median(img: &GrayImage, radius: u32) -> GrayImage {
    median_filter(img, radius, radius)
}

/// Stretch contrast by histogram equalization
pub fn equalize(img: &GrayImage) -> GrayImage {
    equalize_histogram(img)
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}
