//! Validated parameter structs for analysis and processing requests.
//!
//! Every tunable the external interface exposes (§6) is collected here and
//! validated once at construction, so downstream stages can assume their
//! inputs are already in range.

use serde::{Deserialize, Serialize};

use crate::error::{RestoreError, RestoreResult};

/// Selects which analyzer produced (or will produce) an intensity matrix,
/// and which fill/gain semantics apply downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Vocal,
    Mix,
}

impl Mode {
    /// Out-of-range interpolation fill value for this mode (§4.4).
    pub fn fill_value(self) -> f32 {
        match self {
            Mode::Vocal => 0.0,
            Mode::Mix => 1.0,
        }
    }

    /// Valid post-interpolation clip range for this mode's intensity values.
    pub fn valid_range(self) -> (f32, f32) {
        match self {
            Mode::Vocal => (0.0, 1.0),
            Mode::Mix => (1.0, crate::constants::MAX_GAIN),
        }
    }

    /// As the lowercase token persisted as the mode marker (§6).
    pub fn as_token(self) -> &'static str {
        match self {
            Mode::Vocal => "vocal",
            Mode::Mix => "mix",
        }
    }

    pub fn from_token(token: &str) -> RestoreResult<Self> {
        match token {
            "vocal" => Ok(Mode::Vocal),
            "mix" => Ok(Mode::Mix),
            other => Err(RestoreError::InvalidParameter {
                name: "mode",
                value: other.to_string(),
                reason: "expected \"vocal\" or \"mix\"".to_string(),
            }),
        }
    }
}

/// Output normalization mode (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Normalization {
    None,
    Peak,
    Loudness,
}

/// Parameters for the Vocal or Mix Analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub mode: Mode,
    /// Vocal-mode only; ignored (but still range-checked if present) for mix mode.
    pub sensitivity: u8,
    pub band_count: u16,
}

impl AnalysisConfig {
    pub fn validate(self) -> RestoreResult<Self> {
        if !(1..=10).contains(&self.sensitivity) {
            return Err(RestoreError::InvalidParameter {
                name: "sensitivity",
                value: self.sensitivity.to_string(),
                reason: "must be in [1, 10]".to_string(),
            });
        }
        let band_range = match self.mode {
            Mode::Vocal => 6..=24,
            Mode::Mix => 6..=32,
        };
        if !band_range.contains(&self.band_count) {
            return Err(RestoreError::InvalidParameter {
                name: "band_count",
                value: self.band_count.to_string(),
                reason: format!("must be in [{}, {}]", band_range.start(), band_range.end()),
            });
        }
        Ok(self)
    }
}

/// Parameters for the Spectral Processor + Post Conditioner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessConfig {
    pub mode: Mode,
    pub eq_level: u8,
    pub band_count: u16,
    pub stereo_widen: bool,
    pub normalization: Normalization,
}

impl ProcessConfig {
    pub fn validate(self) -> RestoreResult<Self> {
        if self.eq_level > 10 {
            return Err(RestoreError::InvalidParameter {
                name: "eq_level",
                value: self.eq_level.to_string(),
                reason: "must be in [0, 10]".to_string(),
            });
        }
        let band_range = match self.mode {
            Mode::Vocal => 6..=24,
            Mode::Mix => 6..=32,
        };
        if !band_range.contains(&self.band_count) {
            return Err(RestoreError::InvalidParameter {
                name: "band_count",
                value: self.band_count.to_string(),
                reason: format!("must be in [{}, {}]", band_range.start(), band_range.end()),
            });
        }
        Ok(self)
    }
}
