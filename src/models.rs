use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A detected circle in image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Circle {
    pub x: u32,
    pub y: u32,
    pub radius: u32,
}

impl Circle {
    pub fn new(x: u32, y: u32, radius: u32) -> Self {
        Self { x, y, radius }
    }

    /// Round a sub-pixel estimate to integer pixels, clamping at zero
    pub fn from_estimate(x: f32, y: f32, radius: f32) -> Self {
        let round = |v: f32| v.round().max(0.0) as u32;
        Self {
            x: round(x),
            y: round(y),
            radius: round(radius),
        }
    }

    /// True when centre and radius are each within `tolerance` pixels of `other`
    pub fn approx_eq(&self, other: &Circle, tolerance: u32) -> bool {
        self.x.abs_diff(other.x) <= tolerance
            && self.y.abs_diff(other.y) <= tolerance
            && self.radius.abs_diff(other.radius) <= tolerance
    }

    /// Short label drawn next to the circle, e.g. `(120,88),r=40`
    pub fn label(&self) -> String {
        format!("({},{}),r={}", self.x, self.y, self.radius)
    }
}

/// Circles found in one detection cycle. Strongest first, but order carries no meaning.
pub type DetectionResult = Vec<Circle>;

/// Outcome of processing one image file
#[derive(Debug, Clone, Serialize)]
pub struct ImageReport {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub circles: DetectionResult,
    pub saved_to: Option<PathBuf>,
    /// Canny edge map written next to the annotated copy
    pub edges_saved_to: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_estimate_rounds_and_clamps() {
        let c = Circle::from_estimate(10.6, -2.0, 39.4);
        assert_eq!(c, Circle::new(11, 0, 39));
    }

    #[test]
    fn test_approx_eq_tolerance() {
        let a = Circle::new(100, 80, 40);
        assert!(a.approx_eq(&Circle::new(102, 77, 43), 3));
        assert!(!a.approx_eq(&Circle::new(104, 80, 40), 3));
    }

    #[test]
    fn test_label_format() {
        assert_eq!(Circle::new(5, 6, 7).label(), "(5,6),r=7");
    }
}
