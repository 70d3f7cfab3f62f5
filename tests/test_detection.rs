//! Behaviour of the gradient Hough detector on synthetic images.

mod common;

use common::*;
use image::GrayImage;

#[test]
fn test_detects_drawn_circle_within_tolerance() {
    let gray = gray_with_rings(200, 200, &[(100, 80, 40)], 3);
    let detector = HoughGradientDetector::new();

    let circles = detector.detect(&gray, &permissive_params());

    let expected = Circle::new(100, 80, 40);
    assert!(
        circles.iter().any(|c| c.approx_eq(&expected, 3)),
        "expected a circle near {:?}, got {:?}",
        expected,
        circles
    );
}

#[test]
fn test_large_circles_within_tolerance() {
    let detector = HoughGradientDetector::new();

    for radius in [80, 100, 120, 150] {
        let gray = gray_with_rings(400, 400, &[(200, 200, radius)], 3);
        let circles = detector.detect(&gray, &permissive_params());

        let expected = Circle::new(200, 200, radius as u32);
        assert!(!circles.is_empty(), "r={}: nothing found", radius);
        assert!(
            circles.iter().all(|c| c.approx_eq(&expected, 3)),
            "r={}: expected only {:?}, got {:?}",
            radius,
            expected,
            circles
        );
    }
}

#[test]
fn test_concentric_demo_rings_yield_only_the_shared_centre() {
    let gray = gray_with_rings(500, 500, &[(250, 250, 50), (250, 250, 100), (250, 250, 150), (250, 250, 200)], 2);
    let detector = HoughGradientDetector::new();

    let circles = detector.detect(&gray, &HoughParams::default());

    assert!(!circles.is_empty());
    assert!(
        circles.iter().all(|c| c.x.abs_diff(250) <= 3 && c.y.abs_diff(250) <= 3),
        "{:?}",
        circles
    );
}

#[test]
fn test_tiny_dp_matches_unit_dp() {
    let gray = gray_with_rings(160, 160, &[(80, 80, 40)], 3);
    let detector = HoughGradientDetector::new();
    let unit = permissive_params();

    let circles = detector.detect(&gray, &HoughParams { dp: 0.00001, ..unit });
    assert_eq!(circles, detector.detect(&gray, &unit));
}

#[test]
fn test_coarse_accumulator_still_finds_circle() {
    let gray = gray_with_rings(200, 200, &[(90, 110, 50)], 3);
    let detector = HoughGradientDetector::new();
    let params = HoughParams {
        dp: 2.0,
        param2: 10.0,
        ..permissive_params()
    };

    let circles = detector.detect(&gray, &params);

    let expected = Circle::new(90, 110, 50);
    assert!(
        circles.iter().any(|c| c.approx_eq(&expected, 4)),
        "expected a circle near {:?}, got {:?}",
        expected,
        circles
    );
}

#[test]
fn test_black_image_has_no_circles() {
    let gray = GrayImage::new(160, 120);
    let detector = HoughGradientDetector::new();

    let configs = [
        permissive_params(),
        HoughParams::default(),
        HoughParams {
            dp: 3.0,
            min_dist: 1.0,
            param1: 1.0,
            param2: 1.0,
            min_radius: 0,
            max_radius: 0,
        },
        HoughParams {
            dp: 0.1,
            min_dist: 200.0,
            param1: 300.0,
            param2: 100.0,
            min_radius: 300,
            max_radius: 400,
        },
    ];

    for params in configs {
        assert!(detector.detect(&gray, &params).is_empty(), "{:?}", params);
    }
}

#[test]
fn test_bounding_max_radius_keeps_smaller_circles() {
    let gray = gray_with_rings(220, 200, &[(60, 60, 20), (150, 130, 45)], 3);
    let detector = HoughGradientDetector::new();
    let unbounded = permissive_params();
    assert_eq!(unbounded.max_radius, 0);

    let before = detector.detect(&gray, &unbounded);
    assert!(
        before.iter().any(|c| c.approx_eq(&Circle::new(60, 60, 20), 3)),
        "small circle missing without a bound: {:?}",
        before
    );

    let bound = 30;
    let after = detector.detect(
        &gray,
        &HoughParams {
            max_radius: bound,
            ..unbounded
        },
    );

    for kept in before.iter().filter(|c| c.radius < bound) {
        assert!(
            after.iter().any(|c| c.approx_eq(kept, 3)),
            "{:?} lost after bounding maxRadius to {}: {:?}",
            kept,
            bound,
            after
        );
    }
}

#[test]
fn test_min_dist_merges_concentric_rings() {
    let gray = gray_with_rings(300, 300, &[(150, 150, 60), (150, 150, 100)], 3);
    let detector = HoughGradientDetector::new();

    let circles = detector.detect(&gray, &permissive_params());

    let at_center: Vec<_> = circles
        .iter()
        .filter(|c| c.x.abs_diff(150) <= 3 && c.y.abs_diff(150) <= 3)
        .collect();
    assert_eq!(at_center.len(), 1, "{:?}", circles);
}
