//! Session configuration.

use crate::capture::PenSettings;
use crate::model::{BoardTemplate, clamp_sticky_size, default_template, template_by_id};
use crate::viewport::ZOOM_STEP;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Defaults used by a [`Session`](crate::Session).
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Initial pen settings.
    pub pen: PenSettings,
    /// Color of newly placed sticky notes.
    pub sticky_color: String,
    /// Size of newly placed sticky notes.
    pub sticky_size: Size,
    pub text_font_size: f64,
    pub text_font_family: String,
    pub text_fill: String,
    /// Multiplicative step for zoom in/out and wheel notches.
    pub zoom_step: f64,
    /// Template id given to new boards.
    pub default_template: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pen: PenSettings::default(),
            sticky_color: "#fef08a".to_string(),
            sticky_size: Size::new(200.0, 200.0),
            text_font_size: 16.0,
            text_font_family: "Arial".to_string(),
            text_fill: "#1f2937".to_string(),
            zoom_step: ZOOM_STEP,
            default_template: default_template().id,
        }
    }
}

impl SessionConfig {
    /// Parse a JSON document, filling missing keys with defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded session config from {}", path.display());
        Ok(config)
    }

    /// Template for new boards. Unknown ids fall back to the default template.
    pub fn template(&self) -> BoardTemplate {
        template_by_id(&self.default_template).unwrap_or_else(|| {
            log::warn!("Unknown template '{}', using default", self.default_template);
            default_template()
        })
    }

    /// Clamp out-of-range values instead of rejecting them.
    fn sanitized(mut self) -> Self {
        self.pen.set_width(self.pen.width);
        self.sticky_size = clamp_sticky_size(self.sticky_size);
        if !(self.zoom_step.is_finite() && self.zoom_step > 1.0) {
            self.zoom_step = ZOOM_STEP;
        }
        if !(self.text_font_size.is_finite() && self.text_font_size > 0.0) {
            self.text_font_size = 16.0;
        }
        self
    }
}
