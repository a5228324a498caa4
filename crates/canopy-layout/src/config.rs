//! Layout configuration loaded from TOML.
//!
//! ```toml
//! [canvas]
//! width = 160.0
//! height = 90.0
//!
//! [colors]
//! floor = 0.4
//! positive = { r = 0.1, g = 0.8, b = 0.3 }
//!
//! [projection]
//! max_height = 30.0
//! ```
//!
//! Every table and field is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::color_map::ColorScheme;
use crate::engine::Canvas;
use crate::projection::ProjectionConfig;

/// Errors loading a [`LayoutConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The document is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value parsed but is out of range.
    #[error("invalid value for '{field}': {message}")]
    InvalidValue {
        /// Dotted field path.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Canvas, colors and projection settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Canvas the treemap is laid out on.
    pub canvas: Canvas,
    /// Cell color scheme.
    pub colors: ColorScheme,
    /// Block extrusion settings.
    pub projection: ProjectionConfig,
}

impl LayoutConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.validate().is_err() {
            return Err(ConfigError::InvalidValue {
                field: "canvas",
                message: format!(
                    "width and height must be positive, got {} x {}",
                    self.canvas.width, self.canvas.height
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.colors.floor) {
            return Err(ConfigError::InvalidValue {
                field: "colors.floor",
                message: format!("must be within [0, 1], got {}", self.colors.floor),
            });
        }
        let ProjectionConfig {
            min_height,
            max_height,
            gap,
        } = self.projection;
        if min_height > max_height {
            return Err(ConfigError::InvalidValue {
                field: "projection.min_height",
                message: format!("{min_height} exceeds max_height {max_height}"),
            });
        }
        if gap < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "projection.gap",
                message: format!("must not be negative, got {gap}"),
            });
        }
        Ok(())
    }
}
