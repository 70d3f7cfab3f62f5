#![allow(dead_code)]

use houghtune::{Circle, CircleDetector, HoughParams, Viewer};
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_circle_mut;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;

/// Black grayscale canvas with white rings of the given thickness.
/// Each ring covers radii `r - thickness / 2 ..= r + thickness / 2`.
pub fn gray_with_rings(width: u32, height: u32, rings: &[(i32, i32, i32)], thickness: i32) -> GrayImage {
    let mut img = GrayImage::new(width, height);
    for &(x, y, r) in rings {
        for offset in -(thickness / 2)..=(thickness / 2) {
            draw_hollow_circle_mut(&mut img, (x, y), r + offset, Luma([255u8]));
        }
    }
    img
}

/// Writes a small RGB image with one ring to `path`
pub fn write_ring_image(path: &Path) {
    let mut img = RgbImage::new(120, 120);
    for offset in -1..=1 {
        draw_hollow_circle_mut(&mut img, (60, 60), 30 + offset, Rgb([255u8, 255, 255]));
    }
    img.save(path).expect("Failed to save test image");
}

/// Parameters loose enough for clean synthetic images
pub fn permissive_params() -> HoughParams {
    HoughParams {
        dp: 1.0,
        min_dist: 20.0,
        param1: 100.0,
        param2: 15.0,
        min_radius: 10,
        max_radius: 0,
    }
}

/// Detector that replays scripted results and records every call
#[derive(Default)]
pub struct FakeDetector {
    script: RefCell<VecDeque<Vec<Circle>>>,
    calls: RefCell<Vec<HoughParams>>,
}

impl FakeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results handed out one per call; once exhausted, calls return nothing
    pub fn scripted(results: Vec<Vec<Circle>>) -> Self {
        Self {
            script: RefCell::new(results.into()),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls(&self) -> Vec<HoughParams> {
        self.calls.borrow().clone()
    }
}

impl CircleDetector for FakeDetector {
    fn detect(&self, _gray: &GrayImage, params: &HoughParams) -> Vec<Circle> {
        self.calls.borrow_mut().push(*params);
        self.script.borrow_mut().pop_front().unwrap_or_default()
    }

    fn name(&self) -> &str {
        "Fake"
    }
}

/// Viewer that keeps every frame in memory
#[derive(Default)]
pub struct RecordingViewer {
    pub frames: Vec<(String, DynamicImage)>,
    pub closed: bool,
}

impl Viewer for RecordingViewer {
    fn show(&mut self, window: &str, image: &DynamicImage) -> houghtune::Result<()> {
        self.frames.push((window.to_string(), image.clone()));
        Ok(())
    }

    fn close_all(&mut self) {
        self.closed = true;
    }
}
