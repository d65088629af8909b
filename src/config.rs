//! Editor configuration: starting grid, fog, brush, and zoom settings.
//!
//! Every field has a default, so a config file only needs to name what it
//! overrides. Out-of-range values are clamped when the config is applied,
//! never rejected.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::clamp_finite;
use crate::consts::{DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH, WHEEL_ZOOM_STEP};
use crate::draw::BrushSettings;
use crate::grid::GridConfig;

/// Error loading an [`EditorConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Starting state for a new editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Project name used until one is loaded.
    pub project_name: String,
    pub grid: GridConfig,
    /// Fog layer opacity in [0, 1].
    pub fog_opacity: f64,
    pub brush: BrushSettings,
    /// Scale change per wheel notch.
    pub wheel_step: f64,
    /// World width until a base map is loaded.
    pub world_width: f64,
    /// World height until a base map is loaded.
    pub world_height: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            project_name: "New Project".to_owned(),
            grid: GridConfig::default(),
            fog_opacity: 1.0,
            brush: BrushSettings::default(),
            wheel_step: WHEEL_ZOOM_STEP,
            world_width: DEFAULT_WORLD_WIDTH,
            world_height: DEFAULT_WORLD_HEIGHT,
        }
    }
}

impl EditorConfig {
    /// Parse a JSON config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed JSON or mistyped fields.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str::<Self>(raw)?.sanitized())
    }

    /// Read and parse a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is not a valid config.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        Self::from_json(&raw)
    }

    /// Copy with every numeric field forced into its valid range.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let world_width = if self.world_width.is_finite() && self.world_width >= 1.0 {
            self.world_width.round()
        } else {
            defaults.world_width
        };
        let world_height = if self.world_height.is_finite() && self.world_height >= 1.0 {
            self.world_height.round()
        } else {
            defaults.world_height
        };
        Self {
            project_name: self.project_name,
            grid: self.grid.sanitized(),
            fog_opacity: clamp_finite(self.fog_opacity, defaults.fog_opacity, 0.0, 1.0),
            brush: self.brush.sanitized(),
            wheel_step: clamp_finite(self.wheel_step, defaults.wheel_step, 0.01, 0.9),
            world_width,
            world_height,
        }
    }
}
