//! Slider-backed detection parameters.
//!
//! Sliders hold raw integer positions (`dp` is stored ×10). Detection never
//! reads sliders directly; it receives an immutable [`HoughParams`] snapshot
//! taken at the start of each cycle.
use crate::error::{HoughError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The six tunable parameters of the circle detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamName {
    Dp,
    MinDist,
    Param1,
    Param2,
    MinRadius,
    MaxRadius,
}

/// Integer range and starting position of one slider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderSpec {
    pub min: i32,
    pub max: i32,
    pub default: i32,
}

impl SliderSpec {
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}

impl ParamName {
    pub const ALL: [ParamName; 6] = [
        ParamName::Dp,
        ParamName::MinDist,
        ParamName::Param1,
        ParamName::Param2,
        ParamName::MinRadius,
        ParamName::MaxRadius,
    ];

    /// Slider caption
    pub fn label(self) -> &'static str {
        match self {
            ParamName::Dp => "dp x10",
            ParamName::MinDist => "minDist",
            ParamName::Param1 => "param1",
            ParamName::Param2 => "param2",
            ParamName::MinRadius => "minRadius",
            ParamName::MaxRadius => "maxRadius",
        }
    }

    pub fn slider(self) -> SliderSpec {
        // dp and minDist start at 1: the detector requires both to be positive
        match self {
            ParamName::Dp => SliderSpec { min: 1, max: 30, default: 10 },
            ParamName::MinDist => SliderSpec { min: 1, max: 200, default: 50 },
            ParamName::Param1 => SliderSpec { min: 1, max: 300, default: 50 },
            ParamName::Param2 => SliderSpec { min: 1, max: 100, default: 30 },
            ParamName::MinRadius => SliderSpec { min: 0, max: 300, default: 10 },
            ParamName::MaxRadius => SliderSpec { min: 0, max: 400, default: 300 },
        }
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ParamName {
    type Err = HoughError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(*c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "dp" | "dpx10" => Ok(ParamName::Dp),
            "mindist" | "md" => Ok(ParamName::MinDist),
            "param1" | "p1" => Ok(ParamName::Param1),
            "param2" | "p2" => Ok(ParamName::Param2),
            "minradius" | "minr" => Ok(ParamName::MinRadius),
            "maxradius" | "maxr" => Ok(ParamName::MaxRadius),
            _ => Err(HoughError::UnknownParameter(s.to_string())),
        }
    }
}

/// Raw slider positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParameterSet {
    pub dp_x10: i32,
    pub min_dist: i32,
    pub param1: i32,
    pub param2: i32,
    pub min_radius: i32,
    pub max_radius: i32,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            dp_x10: ParamName::Dp.slider().default,
            min_dist: ParamName::MinDist.slider().default,
            param1: ParamName::Param1.slider().default,
            param2: ParamName::Param2.slider().default,
            min_radius: ParamName::MinRadius.slider().default,
            max_radius: ParamName::MaxRadius.slider().default,
        }
    }
}

impl ParameterSet {
    pub fn get(&self, name: ParamName) -> i32 {
        match name {
            ParamName::Dp => self.dp_x10,
            ParamName::MinDist => self.min_dist,
            ParamName::Param1 => self.param1,
            ParamName::Param2 => self.param2,
            ParamName::MinRadius => self.min_radius,
            ParamName::MaxRadius => self.max_radius,
        }
    }

    fn slot_mut(&mut self, name: ParamName) -> &mut i32 {
        match name {
            ParamName::Dp => &mut self.dp_x10,
            ParamName::MinDist => &mut self.min_dist,
            ParamName::Param1 => &mut self.param1,
            ParamName::Param2 => &mut self.param2,
            ParamName::MinRadius => &mut self.min_radius,
            ParamName::MaxRadius => &mut self.max_radius,
        }
    }

    /// Store `value` clamped to the slider range. Returns whether anything changed.
    pub fn set(&mut self, name: ParamName, value: i32) -> bool {
        let clamped = name.slider().clamp(value);
        let slot = self.slot_mut(name);
        let changed = *slot != clamped;
        *slot = clamped;
        changed
    }

    /// Copy with every value forced into its slider range
    pub fn clamped(mut self) -> Self {
        for name in ParamName::ALL {
            let value = self.get(name);
            self.set(name, value);
        }
        self
    }

    pub fn snapshot(&self) -> HoughParams {
        HoughParams::from_source(self)
    }

    /// Read a parameter set from JSON. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let set: ParameterSet = serde_json::from_str(&text).map_err(|source| HoughError::Params {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(set.clamped())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|source| HoughError::Params {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = ParamName::ALL
            .iter()
            .map(|name| format!("{}={}", name, self.get(*name)))
            .collect();
        f.write_str(&parts.join(" "))
    }
}

/// Anything that can answer "what is slider X set to"
pub trait ParameterSource {
    fn get(&self, name: ParamName) -> i32;
}

impl ParameterSource for ParameterSet {
    fn get(&self, name: ParamName) -> i32 {
        ParameterSet::get(self, name)
    }
}

/// The operator's slider panel
#[derive(Debug, Clone, Default)]
pub struct SliderBank {
    values: ParameterSet,
}

impl SliderBank {
    pub fn new(initial: ParameterSet) -> Self {
        Self {
            values: initial.clamped(),
        }
    }

    pub fn set(&mut self, name: ParamName, value: i32) -> bool {
        self.values.set(name, value)
    }

    pub fn values(&self) -> ParameterSet {
        self.values
    }

    pub fn snapshot(&self) -> HoughParams {
        HoughParams::from_source(self)
    }
}

impl ParameterSource for SliderBank {
    fn get(&self, name: ParamName) -> i32 {
        self.values.get(name)
    }
}

/// Immutable parameters for one detection call
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoughParams {
    /// Image-to-accumulator resolution ratio
    pub dp: f32,
    /// Minimum distance between detected centres
    pub min_dist: f32,
    /// Upper Canny threshold; the lower one is half of it
    pub param1: f32,
    /// Accumulator vote threshold for centre candidates
    pub param2: f32,
    pub min_radius: u32,
    /// 0 means no upper bound
    pub max_radius: u32,
}

impl HoughParams {
    pub fn from_source(source: &dyn ParameterSource) -> Self {
        Self {
            dp: source.get(ParamName::Dp) as f32 / 10.0,
            min_dist: source.get(ParamName::MinDist) as f32,
            param1: source.get(ParamName::Param1) as f32,
            param2: source.get(ParamName::Param2) as f32,
            min_radius: source.get(ParamName::MinRadius).max(0) as u32,
            max_radius: source.get(ParamName::MaxRadius).max(0) as u32,
        }
    }

    /// Upper radius bound for an image of the given size
    pub fn resolved_max_radius(&self, width: u32, height: u32) -> u32 {
        if self.max_radius == 0 {
            width.max(height)
        } else {
            self.max_radius
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.dp > 0.0) {
            return Err(HoughError::InvalidParameter {
                name: "dp",
                reason: format!("must be positive, got {}", self.dp),
            });
        }
        if !(self.min_dist > 0.0) {
            return Err(HoughError::InvalidParameter {
                name: "minDist",
                reason: format!("must be positive, got {}", self.min_dist),
            });
        }
        Ok(())
    }
}

impl Default for HoughParams {
    fn default() -> Self {
        ParameterSet::default().snapshot()
    }
}
