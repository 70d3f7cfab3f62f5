pub mod annotate;
pub mod batch;
pub mod console;
pub mod detection;
pub mod error;
pub mod models;
pub mod params;
pub mod pipeline;
pub mod report;
pub mod tuner;
pub mod viewer;

pub use annotate::{AnnotationStyle, annotate};
pub use batch::{BatchOptions, BatchRunner};
pub use detection::{CircleDetector, HoughGradientDetector};
pub use error::{HoughError, Result};
pub use models::{Circle, DetectionResult, ImageReport};
pub use params::{HoughParams, ParamName, ParameterSet, ParameterSource, SliderBank};
pub use pipeline::{Pipeline, PipelineContext, PreprocessStep};
pub use tuner::{Trigger, Tuner, TunerEvent, TunerState, TuningSummary};
pub use viewer::{NullViewer, PreviewFile, Viewer};
