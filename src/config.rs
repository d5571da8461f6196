//! Manager configuration.
//!
//! Thresholds and the connect-detection strategy can be set in code or loaded from TOML:
//!
//! ```toml
//! axis_threshold = 0.6
//! button_threshold = 0.25
//! mode = "poll"   # "auto" | "poll" | "push"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_AXIS_THRESHOLD: f32 = 0.75;
pub const DEFAULT_BUTTON_THRESHOLD: f32 = 0.5;

/// Cutoffs above which a control counts as pushed. Shared by every device of a manager.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub axis: f32,
    pub button: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            axis: DEFAULT_AXIS_THRESHOLD,
            button: DEFAULT_BUTTON_THRESHOLD,
        }
    }
}

pub(crate) fn check_threshold(which: &'static str, value: f32) -> Result<f32> {
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(Error::InvalidThreshold { which, value })
    }
}

/// How connects and disconnects are detected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectMode {
    /// Use push notifications when the source offers them, otherwise poll.
    #[default]
    Auto,
    /// Diff slot presence every tick.
    Poll,
    /// Rely on the source's notifications only.
    Push,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub axis_threshold: f32,
    pub button_threshold: f32,
    pub mode: DetectMode,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            axis_threshold: DEFAULT_AXIS_THRESHOLD,
            button_threshold: DEFAULT_BUTTON_THRESHOLD,
            mode: DetectMode::Auto,
        }
    }
}

impl ManagerConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        check_threshold("axis", self.axis_threshold)?;
        check_threshold("button", self.button_threshold)?;
        Ok(())
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            axis: self.axis_threshold,
            button: self.button_threshold,
        }
    }
}
