//! Compiler-wide settings
//!
//! These are the fallbacks used when a marker does not set an option itself. They deserialize
//! straight from the `[render]` and `[images]` tables of the configuration file.

use crate::recipe::options::{check_precision, check_scale_factor};
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// A render default that no marker could have set.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid setting `render.{key}` = {value}: {reason}")]
pub struct SettingsError {
    pub key: &'static str,
    pub value: f64,
    pub reason: &'static str,
}

/// Everything the standard pipeline needs to know up front.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompilerSettings {
    pub render: RenderDefaults,
    pub images: ImageSettings,
}

/// Defaults for ingredient tables and standalone scale controls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    /// Unit label shown next to the scale input.
    pub scale_label: String,
    /// Initial multiplier.
    pub default_scale: f64,
    /// Rounding granularity of every computed field.
    pub precision: f64,
    /// Whether ingredient names are wrapped in checkbox labels.
    pub checkbox: bool,
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            scale_label: "batches".to_string(),
            default_scale: 1.0,
            precision: 0.001,
            checkbox: true,
        }
    }
}

/// Settings for the inline image pass.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Column at which base64 payloads are hard-wrapped.
    pub wrap_width: usize,
    /// Attribute token that requests inlining.
    pub inline_token: String,
    /// Directory that relative image paths resolve against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            wrap_width: 80,
            inline_token: ".inline".to_string(),
            base_dir: PathBuf::new(),
        }
    }
}

fn invalid(key: &'static str, value: f64) -> impl FnOnce(&'static str) -> SettingsError {
    move |reason| SettingsError { key, value, reason }
}

impl RenderDefaults {
    /// Applies the checks marker options get to the configured fallbacks.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_scale_factor(self.default_scale)
            .map_err(invalid("default_scale", self.default_scale))?;
        check_precision(self.precision).map_err(invalid("precision", self.precision))?;
        Ok(())
    }
}

impl CompilerSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.render.validate()
    }
}

impl ImageSettings {
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_defaults() {
        let defaults = RenderDefaults::default();
        assert_eq!(defaults.scale_label, "batches");
        assert_eq!(defaults.default_scale, 1.0);
        assert_eq!(defaults.precision, 0.001);
        assert!(defaults.checkbox);
    }

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(CompilerSettings::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_unusable_precision() {
        for precision in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let defaults = RenderDefaults {
                precision,
                ..RenderDefaults::default()
            };
            let err = defaults.validate().unwrap_err();
            assert_eq!(err.key, "precision");
        }
    }

    #[test]
    fn test_rejects_negative_scale() {
        let defaults = RenderDefaults {
            default_scale: -2.0,
            ..RenderDefaults::default()
        };
        assert_eq!(
            defaults.validate(),
            Err(SettingsError {
                key: "default_scale",
                value: -2.0,
                reason: "must not be negative",
            })
        );
        assert_eq!(
            defaults.validate().unwrap_err().to_string(),
            "invalid setting `render.default_scale` = -2: must not be negative"
        );
    }

    #[test]
    fn test_image_base_dir() {
        let settings = ImageSettings::default().with_base_dir("docs");
        assert_eq!(settings.base_dir, PathBuf::from("docs"));
        assert_eq!(settings.wrap_width, 80);
    }
}
