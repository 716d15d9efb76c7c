//! Preview configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TplviewError};
use crate::layout::{RULER_HEIGHT, ZOOM};

/// Tunables for a [`crate::viewer::Preview`]. Every field has a default, so a
/// partial JSON object is a valid config.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviewConfig {
    /// Pixels per millimeter
    pub zoom: f64,
    /// Ruler height above each page, in pixels
    pub ruler_height: f64,
    /// Tab order of the first field on a page
    pub tab_index_base: usize,
    /// CSS border drawn around fields when edits are accepted
    pub editable_border: String,
    /// CSS border drawn around fields in a read-only preview
    pub readonly_border: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            zoom: ZOOM,
            ruler_height: RULER_HEIGHT,
            tab_index_base: 100,
            editable_border: "1px dashed #4af".to_string(),
            readonly_border: "transparent".to_string(),
        }
    }
}

impl PreviewConfig {
    /// Decode a (possibly partial) config from JSON.
    ///
    /// # Errors
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the page geometry built from this config is well formed.
    ///
    /// # Errors
    /// Returns [`TplviewError::Config`] for a non-finite or non-positive zoom,
    /// or a non-finite or negative ruler height.
    pub fn validate(&self) -> Result<()> {
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(TplviewError::Config(format!("zoom must be positive, got {}", self.zoom)));
        }
        if !(self.ruler_height.is_finite() && self.ruler_height >= 0.0) {
            return Err(TplviewError::Config(format!(
                "ruler height must be non-negative, got {}",
                self.ruler_height
            )));
        }
        Ok(())
    }
}
