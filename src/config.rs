//! Runtime configuration for a calculator instance.

#[cfg(feature = "serde_json")]
use thiserror::Error;

/// Startup mode and presentation timings.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct CalculatorConfig {
    /// The widget ships in wrong mode.
    pub start_in_wrong_mode: bool,
    /// How long the emoji reaction stays visible.
    pub feedback_ms: u32,
    /// How long the mode banner replaces the subtitle.
    pub banner_ms: u32,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self { start_in_wrong_mode: true, feedback_ms: 600, banner_ms: 2000 }
    }
}

#[cfg(feature = "serde_json")]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid calculator config: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "serde_json")]
impl CalculatorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
