//! Threshold configuration passed into every classification call.
//!
//! The recognizer carries no defaults of its own: whoever calibrates the
//! camera setup decides the pixel thresholds.

use lexpr::Value;

use crate::error::ConfigError;
use crate::sexp;

/// Pixel-space thresholds for one classification call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    /// Pinch distance (pixels) below which thumb-to-fingertip is a click.
    pub click_distance_threshold: f32,
    /// MCP-to-tip length (pixels) above which a finger counts as pointing.
    pub gesture_extension_threshold: f32,
}

const CLICK_KEY: &str = "click-distance-threshold";
const EXTENSION_KEY: &str = "gesture-extension-threshold";

impl ThresholdConfig {
    pub fn new(
        click_distance_threshold: f32,
        gesture_extension_threshold: f32,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            click_distance_threshold,
            gesture_extension_threshold,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that both thresholds are finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(CLICK_KEY, self.click_distance_threshold)?;
        check(EXTENSION_KEY, self.gesture_extension_threshold)
    }

    /// Parse `(:click-distance-threshold N :gesture-extension-threshold N)`.
    pub fn from_sexp(text: &str) -> Result<Self, ConfigError> {
        let value = lexpr::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        let click = read_key(&value, CLICK_KEY)?.ok_or(ConfigError::MissingKey { key: CLICK_KEY })?;
        let extension = read_key(&value, EXTENSION_KEY)?
            .ok_or(ConfigError::MissingKey { key: EXTENSION_KEY })?;
        Self::new(click, extension)
    }

    /// Partial override: read whichever keys are present on top of `self`.
    pub fn merge_sexp(&self, text: &str) -> Result<Self, ConfigError> {
        let value = lexpr::from_str(text).map_err(|e| ConfigError::Malformed(e.to_string()))?;
        let mut merged = *self;
        if let Some(click) = read_key(&value, CLICK_KEY)? {
            merged.click_distance_threshold = click;
        }
        if let Some(extension) = read_key(&value, EXTENSION_KEY)? {
            merged.gesture_extension_threshold = extension;
        }
        merged.validate()?;
        Ok(merged)
    }

    /// Generate s-expression for the config.
    pub fn config_sexp(&self) -> String {
        format!(
            "(:{} {:?} :{} {:?})",
            CLICK_KEY, self.click_distance_threshold, EXTENSION_KEY, self.gesture_extension_threshold,
        )
    }
}

/// `None` when the key is absent, an error when it is not a number.
fn read_key(value: &Value, key: &'static str) -> Result<Option<f32>, ConfigError> {
    match sexp::get_value(value, key) {
        None => Ok(None),
        Some(v) => sexp::as_number(v)
            .map(|n| Some(n as f32))
            .ok_or_else(|| ConfigError::Malformed(format!(":{} is not a number", key))),
    }
}

fn check(key: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { key, value });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { key, value });
    }
    Ok(())
}
