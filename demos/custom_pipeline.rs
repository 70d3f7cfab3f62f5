use houghtune::detection::steps::{EqualizeStep, GaussianBlurStep, MedianBlurStep};
use houghtune::detection::Channel;
use houghtune::{annotate, AnnotationStyle, CircleDetector, HoughGradientDetector, HoughParams, Pipeline};

fn main() -> anyhow::Result<()> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "test_circles.bmp".to_string());
    let img = image::open(&path)?;

    println!("Testing composable preprocessing on {}...\n", path);

    // Photographs: green channel, median blur, then stretch contrast
    let pipeline = Pipeline::new()
        .with_verbose(true)
        .with_channel(Channel::Green)
        .add_step_boxed(Box::new(MedianBlurStep { radius: 2 }))
        .add_step_boxed(Box::new(EqualizeStep));

    let gray = pipeline.run(&img)?;
    let detector = HoughGradientDetector::new();
    let params = HoughParams {
        param2: 25.0,
        max_radius: 0,
        ..HoughParams::default()
    };

    let circles = detector.detect(&gray, &params);
    println!("\nMedian + equalize: {} circles", circles.len());
    for c in circles.iter().take(5) {
        println!("  {}", c.label());
    }

    // Same image with a softer Gaussian chain and a coarser accumulator
    let soft = Pipeline::new().add_step_boxed(Box::new(GaussianBlurStep { sigma: 2.0 }));
    let coarse = HoughParams { dp: 2.0, ..params };
    let soft_circles = detector.detect(&soft.run(&img)?, &coarse);
    println!("Gaussian, dp=2: {} circles", soft_circles.len());

    annotate(&img, &circles, &AnnotationStyle::detailed()).save("custom_pipeline_out.png")?;
    println!("\nAnnotated result written to custom_pipeline_out.png");
    Ok(())
}
