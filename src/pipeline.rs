use crate::detection::preprocessing::{self, Channel};
use crate::error::{HoughError, Result};
use image::{DynamicImage, GrayImage};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Directory receiving one PNG per step
    pub output_dir: PathBuf,
}

/// Context available to all preprocessing steps
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

/// A single grayscale-to-grayscale transformation run before detection
pub trait PreprocessStep: Send + Sync {
    fn process(&self, image: GrayImage, context: &PipelineContext) -> Result<GrayImage>;

    /// Human-readable name for this step (used in verbose output)
    fn name(&self) -> &str;
}

/// Composable preprocessing pipeline builder
///
/// The input is reduced to a single channel first, then every step runs in
/// order on the grayscale buffer.
#[derive(Clone)]
pub struct Pipeline {
    channel: Channel,
    steps: Vec<Arc<dyn PreprocessStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            channel: Channel::Luma,
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(HoughError::DebugDirNotEmpty(output_dir));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PreprocessStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn PreprocessStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Reduce `input` to grayscale and run every step on it
    pub fn run(&self, input: &DynamicImage) -> Result<GrayImage> {
        self.run_labeled(input, None)
    }

    /// Like [`run`](Self::run), with debug images named `<label>_NN_<step>.png`
    /// so several inputs can share one debug directory
    pub fn run_for(&self, input: &DynamicImage, label: &str) -> Result<GrayImage> {
        self.run_labeled(input, Some(label))
    }

    fn run_labeled(&self, input: &DynamicImage, label: Option<&str>) -> Result<GrayImage> {
        let debug_name = |stage: String| match label {
            Some(label) => format!("{}_{}.png", label, stage),
            None => format!("{}.png", stage),
        };

        let mut image = preprocessing::extract_channel(input, self.channel);
        self.save_debug(&image, &debug_name("00_input".to_string()))?;

        for (step_idx, step) in self.steps.iter().enumerate() {
            if self.context.verbose {
                println!("Running step: {}", step.name());
            }
            debug!(step = step.name(), "preprocessing");

            image = step.process(image, &self.context)?;

            let stage = format!(
                "{:02}_{}",
                step_idx + 1,
                step.name().to_lowercase().replace(' ', "_")
            );
            self.save_debug(&image, &debug_name(stage))?;
        }

        Ok(image)
    }

    fn save_debug(&self, image: &GrayImage, filename: &str) -> Result<()> {
        let Some(debug_config) = &self.context.debug else {
            return Ok(());
        };

        let output_path = debug_config.output_dir.join(filename);
        image.save(&output_path).map_err(|source| HoughError::Save {
            path: output_path.clone(),
            source,
        })?;

        if self.context.verbose {
            println!("  Debug: saved {}", filename);
        }
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
