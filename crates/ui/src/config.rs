//! Canvas configuration
//!
//! `CanvasConfig` collects the tunables of a canvas: how connector endpoints
//! are rounded, where a freshly started connector's loose end is parked, and
//! how lines look. It is read from TOML; every field has a default.
//!
//! ```toml
//! clip_precision = "pixel"
//! allow_self_loops = false
//! hit_tolerance = 4.0
//!
//! [placeholder_offset]
//! x = 10.0
//! y = 10.0
//!
//! [line]
//! width = 6.0
//! color = "blue"
//! active_color = "#6060ff"
//! arrow = true
//! ```

use crate::components::connection::LineStyle;
use cardmap_core::{ClipPrecision, MapError, MapResult, Position, Validatable};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings shared by every connector on a canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Rounding applied to clipped endpoints
    pub clip_precision: ClipPrecision,

    /// Whether a connector may start and end on the same card
    pub allow_self_loops: bool,

    /// Extra distance around a line that still counts as a hit
    pub hit_tolerance: f32,

    /// Offset of a new connector's loose end from its anchor card's center
    pub placeholder_offset: Position,

    /// Line appearance
    pub line: LineStyle,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            clip_precision: ClipPrecision::Pixel,
            allow_self_loops: false,
            hit_tolerance: 4.0,
            placeholder_offset: Position::new(10.0, 10.0),
            line: LineStyle::default(),
        }
    }
}

impl CanvasConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(text: &str) -> MapResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| MapError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> MapResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MapError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "Loaded canvas configuration");
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> MapResult<String> {
        toml::to_string_pretty(self).map_err(|e| MapError::invalid_config(e.to_string()))
    }

    /// The subset of settings each connector keeps
    pub fn connector_options(&self) -> ConnectorOptions {
        ConnectorOptions {
            precision: self.clip_precision,
            placeholder_offset: self.placeholder_offset,
            allow_self_loops: self.allow_self_loops,
        }
    }
}

impl Validatable for CanvasConfig {
    fn validate(&self) -> MapResult<()> {
        if !self.placeholder_offset.x.is_finite() || !self.placeholder_offset.y.is_finite() {
            return Err(MapError::invalid_config("placeholder_offset must be finite"));
        }
        if !self.hit_tolerance.is_finite() || self.hit_tolerance < 0.0 {
            return Err(MapError::invalid_config("hit_tolerance must be a non-negative number"));
        }
        self.line.validate()
    }
}

/// Per-connector settings, copied out of [`CanvasConfig`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectorOptions {
    pub precision: ClipPrecision,
    pub placeholder_offset: Position,
    pub allow_self_loops: bool,
}

impl Default for ConnectorOptions {
    fn default() -> Self {
        CanvasConfig::default().connector_options()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = CanvasConfig::default();
        assert_eq!(config.clip_precision, ClipPrecision::Pixel);
        assert_eq!(config.placeholder_offset, Position::new(10.0, 10.0));
        assert!(!config.allow_self_loops);
        assert_eq!(config.line.width, 6.0);
        assert!(config.is_valid());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = CanvasConfig::from_toml_str(
            r#"
            clip_precision = "float"

            [line]
            color = "red"
            "#,
        )
        .unwrap();
        assert_eq!(config.clip_precision, ClipPrecision::Float);
        assert_eq!(config.line.color, "red");
        assert_eq!(config.line.active_color, "#6060ff");
        assert_eq!(config.placeholder_offset, Position::new(10.0, 10.0));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = CanvasConfig::from_toml_str("hit_tolerance = -1.0").unwrap_err();
        assert!(matches!(err, MapError::InvalidConfig(_)));

        let err = CanvasConfig::from_toml_str("[line]\nwidth = 0.0").unwrap_err();
        assert!(matches!(err, MapError::InvalidConfig(_)));

        let err = CanvasConfig::from_toml_str("clip_precision = \"subpixel\"").unwrap_err();
        assert!(matches!(err, MapError::InvalidConfig(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = CanvasConfig::default();
        config.allow_self_loops = true;
        let text = config.to_toml_string().unwrap();
        assert_eq!(CanvasConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canvas.toml");
        std::fs::write(&path, "allow_self_loops = true\n").unwrap();
        let config = CanvasConfig::load(&path).unwrap();
        assert!(config.allow_self_loops);

        let err = CanvasConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_connector_options() {
        let options = CanvasConfig::default().connector_options();
        assert_eq!(options, ConnectorOptions::default());
        assert_eq!(options.precision, ClipPrecision::Pixel);
    }
}
