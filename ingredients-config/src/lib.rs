//! Shared configuration loader for the ingredients compiler.
//!
//! `defaults/ingredients.default.toml` is embedded into every binary so the documented
//! defaults and the runtime behavior cannot drift apart. Applications layer user files and
//! key overrides on top of those defaults via [`Loader`] before deserializing into
//! [`IngredientsConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use ingredients_compiler::{CompilerSettings, ImageSettings, RenderDefaults};
use serde::Deserialize;
use std::path::Path;

pub use config::ConfigError;

const DEFAULT_TOML: &str = include_str!("../defaults/ingredients.default.toml");

/// Top-level configuration consumed by ingredients applications.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientsConfig {
    pub render: RenderDefaults,
    pub images: ImageSettings,
}

impl IngredientsConfig {
    /// The compiler settings this configuration describes.
    pub fn into_settings(self) -> CompilerSettings {
        CompilerSettings {
            render: self.render,
            images: self.images,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (e.g. `render.precision`).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Apply a `key=value` assignment as given on the command line.
    pub fn set_assignment(self, assignment: &str) -> Result<Self, ConfigError> {
        let (key, value) = assignment.split_once('=').ok_or_else(|| {
            ConfigError::Message(format!(
                "invalid override `{}`: expected key=value",
                assignment
            ))
        })?;
        self.set_override(key.trim(), value.trim())
    }

    /// Finalize the builder, deserialize the resulting configuration and reject render
    /// defaults the compiler could not use.
    pub fn build(self) -> Result<IngredientsConfig, ConfigError> {
        let config: IngredientsConfig = self.builder.build()?.try_deserialize()?;
        config
            .render
            .validate()
            .map_err(|err| ConfigError::Message(err.to_string()))?;
        Ok(config)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<IngredientsConfig, ConfigError> {
    Loader::new().build()
}
