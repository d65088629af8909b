//! Persisted project state exchanged with the persistence layer.
//!
//! The JSON shape matches the `data.json` entry of a saved project:
//!
//! ```json
//! { "name": "Crypt", "grid": { "type": "pointy", "size": 30, "ratio": 1, "x": 0, "y": 0, "opacity": 0.5 },
//!   "revealed": ["0,0", "1,0"] }
//! ```
//!
//! Base map and fog images travel alongside as separate blobs and are not
//! part of this type.

#[cfg(test)]
#[path = "project_test.rs"]
mod project_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::grid::GridConfig;

/// Error decoding or encoding a project.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("invalid project JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serializable project state.
///
/// Decoding is lenient: a field of the wrong type takes its default, and
/// revealed entries that are not strings are dropped and counted in
/// [`ProjectData::dropped`]. Malformed JSON still fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawProject")]
pub struct ProjectData {
    pub name: String,
    pub grid: GridConfig,
    /// Revealed cells as `"col,row"` strings.
    pub revealed: Vec<String>,
    /// Revealed entries discarded while decoding because they were not strings.
    #[serde(skip)]
    pub dropped: usize,
}

impl Default for ProjectData {
    fn default() -> Self {
        Self { name: "New Project".to_owned(), grid: GridConfig::default(), revealed: Vec::new(), dropped: 0 }
    }
}

/// Wire shape before per-field fallbacks.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawProject {
    name: Value,
    grid: Value,
    revealed: Value,
}

impl From<RawProject> for ProjectData {
    fn from(raw: RawProject) -> Self {
        let defaults = Self::default();
        let name = match raw.name {
            Value::String(name) => name,
            Value::Null => defaults.name,
            other => {
                tracing::warn!(value = %other, "project name is not a string; using default");
                defaults.name
            }
        };
        let grid = match raw.grid {
            Value::Null => defaults.grid,
            value => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "grid is not an object; using default");
                defaults.grid
            }),
        };
        let (revealed, dropped) = match raw.revealed {
            Value::Array(entries) => {
                let total = entries.len();
                let keys: Vec<String> = entries
                    .into_iter()
                    .filter_map(|entry| match entry {
                        Value::String(key) => Some(key),
                        _ => None,
                    })
                    .collect();
                let dropped = total - keys.len();
                (keys, dropped)
            }
            Value::Null => (Vec::new(), 0),
            _ => (Vec::new(), 1),
        };
        if dropped > 0 {
            tracing::warn!(dropped, "dropping revealed entries that are not strings");
        }
        Self { name, grid, revealed, dropped }
    }
}

impl ProjectData {
    /// Parse project JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Json`] if the input is not a valid project.
    pub fn from_json(raw: &str) -> Result<Self, ProjectError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Encode as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ProjectError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Outcome of restoring a project into an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestoreReport {
    /// Number of revealed cells loaded.
    pub revealed: usize,
    /// Number of malformed cell keys dropped.
    pub skipped: usize,
}
