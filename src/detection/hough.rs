//! Gradient Hough transform for circles.
//!
//! Two stages, as in the classic "HOUGH_GRADIENT" method:
//!
//! 1. Every Canny edge pixel votes along its gradient direction (both signs)
//!    for each radius in the allowed range. Votes land in an accumulator whose
//!    resolution is the image resolution divided by `dp`.
//! 2. Accumulator local maxima above `param2` become centre candidates, which
//!    [`circles::select_circles`](super::circles::select_circles) fits, refines
//!    and filters by how much of each circumference carries edge pixels.
//!
//! `dp` below [`MIN_DP`] is raised to it, so the accumulator is never larger
//! than the image.
//!
//! Complexity: O(E · R / dp) voting for E edge pixels and R radii, plus
//! O(C · E) for radius fitting over C candidates.
use super::circles::{self, Acceptance, CenterCandidate, CircleFitter};
use super::{CircleDetector, preprocessing};
use crate::models::Circle;
use crate::params::HoughParams;
use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use tracing::debug;

/// Finest accumulator resolution: one cell per image pixel
pub const MIN_DP: f32 = 1.0;

/// Edge pixel with its unit gradient direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgePoint {
    pub x: f32,
    pub y: f32,
    pub ux: f32,
    pub uy: f32,
}

/// Collect edge pixels of a Canny map together with Sobel gradient directions
pub fn edge_points(gray: &GrayImage, edges: &GrayImage) -> Vec<EdgePoint> {
    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);

    edges
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] > 0)
        .filter_map(|(x, y, _)| {
            let vx = gx.get_pixel(x, y)[0] as f32;
            let vy = gy.get_pixel(x, y)[0] as f32;
            let mag = (vx * vx + vy * vy).sqrt();
            if mag == 0.0 {
                return None;
            }
            Some(EdgePoint {
                x: x as f32,
                y: y as f32,
                ux: vx / mag,
                uy: vy / mag,
            })
        })
        .collect()
}

/// Vote grid at `1/dp` of the image resolution, with a one-cell border
#[derive(Debug, Clone)]
pub struct Accumulator {
    dp: f32,
    cols: usize,
    rows: usize,
    stride: usize,
    votes: Vec<u32>,
}

impl Accumulator {
    pub fn new(width: u32, height: u32, dp: f32) -> Self {
        let cols = (width as f32 / dp).ceil() as usize + 1;
        let rows = (height as f32 / dp).ceil() as usize + 1;
        let stride = cols + 2;
        Self {
            dp,
            cols,
            rows,
            stride,
            votes: vec![0; stride * (rows + 2)],
        }
    }

    #[inline]
    fn index(&self, col: usize, row: usize) -> usize {
        (row + 1) * self.stride + col + 1
    }

    /// Votes stored for accumulator cell (`col`, `row`)
    pub fn get(&self, col: usize, row: usize) -> u32 {
        self.votes[self.index(col, row)]
    }

    /// Cast the votes of every edge point for radii in `[min_radius, max_radius]`.
    ///
    /// The radius advances in steps of `dp` so each step moves one accumulator
    /// cell along the ray.
    pub fn vote(&mut self, points: &[EdgePoint], width: u32, height: u32, min_radius: u32, max_radius: u32) {
        let (w, h) = (width as f32, height as f32);
        let idp = 1.0 / self.dp;
        let start = min_radius.max(1) as f32;
        let end = max_radius as f32;

        for p in points {
            for sign in [1.0f32, -1.0] {
                let (sx, sy) = (sign * p.ux, sign * p.uy);
                let mut r = start;
                while r <= end {
                    let cx = p.x + sx * r;
                    let cy = p.y + sy * r;
                    // a ray that left the image never comes back
                    if cx < 0.0 || cy < 0.0 || cx >= w || cy >= h {
                        break;
                    }
                    let col = (cx * idp + 0.5) as usize;
                    let row = (cy * idp + 0.5) as usize;
                    let idx = self.index(col, row);
                    self.votes[idx] += 1;
                    r += self.dp;
                }
            }
        }
    }

    /// Local maxima with more than `threshold` votes, strongest first.
    ///
    /// Each peak's centre is refined to the vote-weighted centroid of its 3x3
    /// neighbourhood and expressed in image coordinates.
    pub fn peaks(&self, threshold: f32) -> Vec<CenterCandidate> {
        let mut peaks = Vec::new();
        let s = self.stride;

        for row in 0..self.rows {
            for col in 0..self.cols {
                let idx = self.index(col, row);
                let v = self.votes[idx];
                if (v as f32) <= threshold {
                    continue;
                }
                if v > self.votes[idx - 1]
                    && v >= self.votes[idx + 1]
                    && v > self.votes[idx - s]
                    && v >= self.votes[idx + s]
                {
                    let (x, y) = self.centroid(col, row);
                    peaks.push(CenterCandidate { x, y, votes: v });
                }
            }
        }

        // stable sort keeps raster order among equal vote counts
        peaks.sort_by(|a, b| b.votes.cmp(&a.votes));
        peaks
    }

    fn centroid(&self, col: usize, row: usize) -> (f32, f32) {
        let mut sum = 0.0f32;
        let mut sx = 0.0f32;
        let mut sy = 0.0f32;
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                let c = col as i32 + dx;
                let r = row as i32 + dy;
                // border cells sit at index -1 / cols and always hold zero
                let idx = ((r + 1) as usize) * self.stride + (c + 1) as usize;
                let v = self.votes[idx] as f32;
                sum += v;
                sx += v * c as f32;
                sy += v * r as f32;
            }
        }
        (sx / sum * self.dp, sy / sum * self.dp)
    }
}

/// Gradient Hough circle detector built on `imageproc` edges and gradients
#[derive(Debug, Clone, Copy)]
pub struct HoughGradientDetector {
    /// Lower Canny threshold as a fraction of `param1`
    pub low_threshold_ratio: f32,
    /// Coverage and in-frame limits every reported circle meets
    pub acceptance: Acceptance,
}

impl HoughGradientDetector {
    pub fn new() -> Self {
        Self {
            low_threshold_ratio: 0.5,
            acceptance: Acceptance::default(),
        }
    }
}

impl Default for HoughGradientDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl CircleDetector for HoughGradientDetector {
    fn detect(&self, gray: &GrayImage, params: &HoughParams) -> Vec<Circle> {
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 || params.validate().is_err() {
            return Vec::new();
        }

        let min_radius = params.min_radius;
        let max_radius = params.resolved_max_radius(width, height);
        if max_radius < min_radius {
            return Vec::new();
        }

        let edges = preprocessing::detect_edges(
            gray,
            params.param1 * self.low_threshold_ratio,
            params.param1,
        );
        let points = edge_points(gray, &edges);
        if points.is_empty() {
            debug!("no edge pixels, nothing to vote");
            return Vec::new();
        }

        let dp = params.dp.max(MIN_DP);
        let mut acc = Accumulator::new(width, height, dp);
        acc.vote(&points, width, height, min_radius, max_radius);
        let candidates = acc.peaks(params.param2);

        debug!(
            dp,
            edge_points = points.len(),
            candidates = candidates.len(),
            "accumulator built"
        );

        let fitter = CircleFitter::new(&points, (width, height), min_radius, max_radius, params.param2);
        circles::select_circles(&candidates, &fitter, params.min_dist, &self.acceptance)
    }

    fn name(&self) -> &str {
        "Hough Gradient"
    }
}
