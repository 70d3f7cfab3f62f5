mod fixtures;
#[allow(unused_imports)]
pub use fixtures::*;

// Re-export commonly used types from houghtune for tests
#[allow(unused_imports)]
pub use houghtune::{
    Circle, CircleDetector, HoughGradientDetector, HoughParams, ParamName, ParameterSet, Viewer,
};
