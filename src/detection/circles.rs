//! Radius fitting and candidate selection.
//!
//! Accumulator peaks only say "many gradient rays pass here". Each peak is
//! turned into a circle by finding the edge-distance window with the densest
//! support per unit of circumference, then moving the centre to the
//! least-squares centre of that window's edge pixels while the fit improves.
//! Fits are ranked by how much of the circumference carries edge pixels, so a
//! strong but lopsided peak cannot hide the real centre behind `min_dist`.
use super::hough::EdgePoint;
use crate::models::Circle;
use std::f32::consts::TAU;

const MAX_REFINE_ROUNDS: usize = 8;
const MAX_ARC_BINS: usize = 360;

/// Accumulator peak in image coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterCandidate {
    pub x: f32,
    pub y: f32,
    pub votes: u32,
}

/// Distance band around a centre holding the best-supported radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusWindow {
    /// Mean edge distance inside the band
    pub radius: f32,
    pub support: u32,
    pub inner: f32,
    pub outer: f32,
}

impl RadiusWindow {
    fn contains(&self, distance: f32) -> bool {
        distance >= self.inner && distance < self.outer
    }
}

/// Radius with the densest edge support around `center`.
///
/// Distances of edge pixels are binned at one pixel; each bin is scored with
/// its two neighbours so a ring a few pixels thick counts as one radius. Only
/// windows with more than `min_support` pixels qualify, and among those the
/// one with the most pixels per unit of circumference wins. Ties go to the
/// smaller radius.
pub fn estimate_radius(
    center: (f32, f32),
    points: &[EdgePoint],
    min_radius: u32,
    max_radius: u32,
    min_support: f32,
) -> Option<RadiusWindow> {
    if max_radius < min_radius {
        return None;
    }
    let bins = (max_radius - min_radius) as usize + 1;
    let mut counts = vec![0u32; bins];
    let mut sums = vec![0f32; bins];
    let lo = min_radius as f32 - 0.5;
    let hi = max_radius as f32 + 0.5;

    for p in points {
        let d = (p.x - center.0).hypot(p.y - center.1);
        if d < lo || d >= hi {
            continue;
        }
        let bin = ((d - lo) as usize).min(bins - 1);
        counts[bin] += 1;
        sums[bin] += d;
    }

    let mut best: Option<(usize, u32, f32)> = None;
    for bin in 0..bins {
        let window = bin.saturating_sub(1)..=(bin + 1).min(bins - 1);
        let support: u32 = counts[window].iter().sum();
        if support == 0 || support as f32 <= min_support {
            continue;
        }
        let nominal = (min_radius as f32 + bin as f32).max(1.0);
        let density = support as f32 / (TAU * nominal);
        if best.is_none_or(|(_, _, d)| density > d) {
            best = Some((bin, support, density));
        }
    }

    best.map(|(bin, support, _)| {
        let first = bin.saturating_sub(1);
        let last = (bin + 1).min(bins - 1);
        let sum: f32 = sums[first..=last].iter().sum();
        RadiusWindow {
            radius: sum / support as f32,
            support,
            inner: lo + first as f32,
            outer: lo + (last + 1) as f32,
        }
    })
}

/// Least-squares circle centre through `points` (Bullock's linearised fit).
///
/// Returns `None` for fewer than three points or a degenerate (collinear) set.
pub fn fit_center(points: &[(f32, f32)]) -> Option<(f32, f32)> {
    if points.len() < 3 {
        return None;
    }
    let n = points.len() as f64;
    let mx = points.iter().map(|p| p.0 as f64).sum::<f64>() / n;
    let my = points.iter().map(|p| p.1 as f64).sum::<f64>() / n;

    let (mut suu, mut svv, mut suv) = (0.0f64, 0.0f64, 0.0f64);
    let (mut suuu, mut svvv, mut suvv, mut svuu) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
    for &(x, y) in points {
        let u = x as f64 - mx;
        let v = y as f64 - my;
        suu += u * u;
        svv += v * v;
        suv += u * v;
        suuu += u * u * u;
        svvv += v * v * v;
        suvv += u * v * v;
        svuu += v * u * u;
    }

    let det = suu * svv - suv * suv;
    let scale = suu.max(svv);
    if !(det.abs() > 1e-9 * scale * scale) {
        return None;
    }
    let b1 = 0.5 * (suuu + suvv);
    let b2 = 0.5 * (svvv + svuu);
    let uc = (b1 * svv - b2 * suv) / det;
    let vc = (b2 * suu - b1 * suv) / det;

    let (cx, cy) = ((mx + uc) as f32, (my + vc) as f32);
    (cx.is_finite() && cy.is_finite()).then_some((cx, cy))
}

/// A centre, its radius band and how well edge pixels back it up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleFit {
    pub x: f32,
    pub y: f32,
    pub window: RadiusWindow,
    /// Share of the in-frame circumference that carries at least one edge pixel
    pub coverage: f32,
    /// Share of the circumference that lies inside the image
    pub visible: f32,
}

impl CircleFit {
    /// Higher coverage wins; equal coverage falls back to raw support
    pub fn better_than(&self, other: &CircleFit) -> bool {
        if (self.coverage - other.coverage).abs() > 1e-4 {
            self.coverage > other.coverage
        } else {
            self.window.support > other.window.support
        }
    }

    pub fn to_circle(&self) -> Circle {
        Circle::from_estimate(self.x, self.y, self.window.radius)
    }
}

/// Thresholds a fit must meet to become a circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Acceptance {
    pub min_coverage: f32,
    pub min_visible: f32,
}

impl Default for Acceptance {
    fn default() -> Self {
        Self {
            min_coverage: 0.6,
            min_visible: 0.5,
        }
    }
}

/// Fits circles to the edge pixels of one image
#[derive(Debug, Clone, Copy)]
pub struct CircleFitter<'a> {
    points: &'a [EdgePoint],
    width: f32,
    height: f32,
    min_radius: u32,
    max_radius: u32,
    min_support: f32,
}

impl<'a> CircleFitter<'a> {
    pub fn new(
        points: &'a [EdgePoint],
        frame: (u32, u32),
        min_radius: u32,
        max_radius: u32,
        min_support: f32,
    ) -> Self {
        Self {
            points,
            width: frame.0 as f32,
            height: frame.1 as f32,
            min_radius,
            max_radius,
            min_support,
        }
    }

    /// Score `center` as is
    pub fn fit(&self, center: (f32, f32)) -> Option<CircleFit> {
        let window = estimate_radius(
            center,
            self.points,
            self.min_radius,
            self.max_radius,
            self.min_support,
        )?;
        let (coverage, visible) = self.arc_coverage(center, &window);
        Some(CircleFit {
            x: center.0,
            y: center.1,
            window,
            coverage,
            visible,
        })
    }

    /// Move `start` to the least-squares centre of its band until the fit stops improving
    pub fn refine(&self, start: CircleFit) -> CircleFit {
        let mut best = start;
        for _ in 0..MAX_REFINE_ROUNDS {
            let band = self.band_points((best.x, best.y), &best.window);
            let Some(center) = fit_center(&band) else {
                break;
            };
            if (center.0 - best.x).hypot(center.1 - best.y) < 0.05 {
                break;
            }
            match self.fit(center) {
                Some(next) if next.better_than(&best) => best = next,
                _ => break,
            }
        }
        best
    }

    fn band_points(&self, center: (f32, f32), window: &RadiusWindow) -> Vec<(f32, f32)> {
        self.points
            .iter()
            .filter(|p| window.contains((p.x - center.0).hypot(p.y - center.1)))
            .map(|p| (p.x, p.y))
            .collect()
    }

    /// (covered share of visible arcs, visible share of all arcs).
    ///
    /// The circle is cut into arcs roughly two pixels long.
    fn arc_coverage(&self, center: (f32, f32), window: &RadiusWindow) -> (f32, f32) {
        let radius = window.radius;
        let arcs = ((TAU * radius / 2.0).round() as usize).clamp(8, MAX_ARC_BINS);

        let visible: Vec<bool> = (0..arcs)
            .map(|i| {
                let a = (i as f32 + 0.5) / arcs as f32 * TAU;
                let x = center.0 + radius * a.cos();
                let y = center.1 + radius * a.sin();
                x >= 0.0 && y >= 0.0 && x < self.width && y < self.height
            })
            .collect();
        let visible_count = visible.iter().filter(|v| **v).count();
        if visible_count == 0 {
            return (0.0, 0.0);
        }

        let mut hit = vec![false; arcs];
        for p in self.points {
            let dx = p.x - center.0;
            let dy = p.y - center.1;
            if !window.contains(dx.hypot(dy)) {
                continue;
            }
            let angle = dy.atan2(dx).rem_euclid(TAU);
            let arc = ((angle / TAU * arcs as f32) as usize).min(arcs - 1);
            hit[arc] = true;
        }

        let covered = hit.iter().zip(&visible).filter(|(h, v)| **h && **v).count();
        (
            covered as f32 / visible_count as f32,
            visible_count as f32 / arcs as f32,
        )
    }
}

/// Turn centre candidates into circles.
///
/// Every candidate is fitted and refined. Fits that are mostly outside the
/// image or whose edge pixels cover too little of the circumference are
/// dropped. The rest are visited best-covered first, and one closer than
/// `min_dist` to an already accepted centre is discarded.
pub fn select_circles(
    candidates: &[CenterCandidate],
    fitter: &CircleFitter<'_>,
    min_dist: f32,
    acceptance: &Acceptance,
) -> Vec<Circle> {
    let mut fits: Vec<CircleFit> = candidates
        .iter()
        .filter_map(|c| fitter.fit((c.x, c.y)))
        .map(|fit| {
            // far too sparse to ever reach the bar; not worth refining
            if fit.coverage < acceptance.min_coverage / 4.0 {
                fit
            } else {
                fitter.refine(fit)
            }
        })
        .filter(|fit| fit.visible >= acceptance.min_visible && fit.coverage >= acceptance.min_coverage)
        .collect();

    // stable sort keeps vote order among equal fits
    fits.sort_by(|a, b| {
        b.coverage
            .total_cmp(&a.coverage)
            .then(b.window.support.cmp(&a.window.support))
    });

    let min_dist_sq = min_dist * min_dist;
    let mut accepted: Vec<CircleFit> = Vec::new();
    for fit in fits {
        let too_close = accepted.iter().any(|a| {
            let dx = fit.x - a.x;
            let dy = fit.y - a.y;
            dx * dx + dy * dy < min_dist_sq
        });
        if !too_close {
            accepted.push(fit);
        }
    }

    accepted.iter().map(CircleFit::to_circle).collect()
}
