//! File, directory and demo processing.

mod common;

use common::*;
use houghtune::batch::{self, BatchOptions, BatchRunner};
use houghtune::detection::build_standard_pipeline;
use houghtune::{HoughError, Pipeline};
use std::fs;

fn quiet_options() -> BatchOptions {
    BatchOptions {
        verbose: false,
        ..BatchOptions::default()
    }
}

#[test]
fn test_directory_only_processes_matching_files() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    for name in ["a.bmp", "b.bmp", "c.bmp"] {
        write_ring_image(&dir.path().join(name));
    }
    write_ring_image(&dir.path().join("skip.png"));
    fs::write(dir.path().join("notes.txt"), "leave me alone")?;
    fs::write(dir.path().join("bmp.txt"), "me too")?;

    let detector = FakeDetector::scripted(vec![vec![Circle::new(60, 60, 30)]]);
    let pipeline = Pipeline::new();
    let runner = BatchRunner::new(&detector, &pipeline, permissive_params()).with_options(quiet_options());

    let reports = runner.run_directory(dir.path())?;

    assert_eq!(detector.call_count(), 3);
    assert_eq!(reports.len(), 3);
    let names: Vec<_> = reports
        .iter()
        .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.bmp", "b.bmp", "c.bmp"]);

    // only the image with a detection gets an annotated copy
    let results: Vec<_> = fs::read_dir(dir.path().join(batch::RESULTS_DIR))?
        .map(|e| e.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<_>>()?;
    assert_eq!(results, vec!["a_detected.bmp"]);
    assert_eq!(reports[0].saved_to, Some(dir.path().join("results").join("a_detected.bmp")));

    assert_eq!(fs::read_to_string(dir.path().join("notes.txt"))?, "leave me alone");
    assert_eq!(fs::read_to_string(dir.path().join("bmp.txt"))?, "me too");
    Ok(())
}

#[test]
fn test_edge_map_written_even_without_detections() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let source = dir.path().join("ring.bmp");
    write_ring_image(&source);

    let detector = FakeDetector::new();
    let pipeline = Pipeline::new();
    let options = BatchOptions {
        save_edges: true,
        ..quiet_options()
    };
    let runner = BatchRunner::new(&detector, &pipeline, permissive_params()).with_options(options);

    let report = runner.process_image(&source)?;

    assert_eq!(report.saved_to, None);
    let edges_file = report.edges_saved_to.expect("edge map should be written");
    assert_eq!(edges_file, dir.path().join("results").join("ring_edges.png"));
    let edges = image::open(&edges_file)?.to_luma8();
    assert!(edges.pixels().any(|p| p[0] == 255));
    assert_eq!(edges.get_pixel(60, 60)[0], 0);
    Ok(())
}

#[test]
fn test_custom_pattern() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    write_ring_image(&dir.path().join("a.bmp"));
    write_ring_image(&dir.path().join("b.png"));

    let detector = FakeDetector::new();
    let pipeline = Pipeline::new();
    let options = BatchOptions {
        pattern: "*.png".to_string(),
        ..quiet_options()
    };
    let runner = BatchRunner::new(&detector, &pipeline, permissive_params()).with_options(options);

    let reports = runner.run_directory(dir.path())?;
    assert_eq!(detector.call_count(), 1);
    assert!(reports[0].path.ends_with("b.png"));
    // nothing found, nothing saved
    assert!(!dir.path().join("results").exists());
    Ok(())
}

#[test]
fn test_empty_directory_is_not_an_error() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let detector = FakeDetector::new();
    let pipeline = Pipeline::new();
    let runner = BatchRunner::new(&detector, &pipeline, permissive_params());

    assert!(runner.run_directory(dir.path())?.is_empty());
    assert_eq!(detector.call_count(), 0);
    Ok(())
}

#[test]
fn test_unreadable_file_never_reaches_detector() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let broken = dir.path().join("broken.bmp");
    fs::write(&broken, b"definitely not a bitmap")?;

    let detector = FakeDetector::new();
    let pipeline = Pipeline::new();
    let runner = BatchRunner::new(&detector, &pipeline, permissive_params());

    let err = runner.run_path(&broken).unwrap_err();
    assert!(matches!(err, HoughError::Load { .. }));
    assert!(err.to_string().contains("failed to load image"));
    assert_eq!(detector.call_count(), 0);
    Ok(())
}

#[test]
fn test_directory_skips_unreadable_files() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    fs::write(dir.path().join("broken.bmp"), b"junk")?;
    write_ring_image(&dir.path().join("good.bmp"));

    let detector = FakeDetector::new();
    let pipeline = Pipeline::new();
    let runner = BatchRunner::new(&detector, &pipeline, permissive_params()).with_options(quiet_options());

    let reports = runner.run_directory(dir.path())?;
    assert_eq!(reports.len(), 1);
    assert_eq!(detector.call_count(), 1);
    Ok(())
}

#[test]
fn test_missing_path_is_invalid() {
    let detector = FakeDetector::new();
    let pipeline = Pipeline::new();
    let runner = BatchRunner::new(&detector, &pipeline, permissive_params());

    let result = runner.run_path(std::path::Path::new("/definitely/not/here"));
    assert!(matches!(result, Err(HoughError::InvalidPath(_))));
    assert_eq!(detector.call_count(), 0);
}

#[test]
fn test_demo_finds_rings_center() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let detector = HoughGradientDetector::new();
    let pipeline = build_standard_pipeline(false);
    let runner = BatchRunner::new(&detector, &pipeline, HoughParams::default());

    let report = runner.run_demo(dir.path())?;

    assert!(dir.path().join(batch::DEMO_FILE_NAME).exists());
    assert_eq!((report.width, report.height), (500, 500));
    // every reported circle belongs to the shared centre; nothing else survives
    assert!(!report.circles.is_empty());
    assert!(
        report
            .circles
            .iter()
            .all(|c| c.x.abs_diff(250) <= 3 && c.y.abs_diff(250) <= 3),
        "{:?}",
        report.circles
    );
    let saved = report.saved_to.expect("annotated copy should be written");
    assert!(saved.ends_with("results/test_circles_detected.bmp"));
    assert!(saved.exists());
    Ok(())
}
