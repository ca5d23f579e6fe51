//! Document loading utilities
//!
//! `DocumentLoader` reads a recipe document from a file or a string and runs a pipeline on
//! it. A document loaded from a file remembers its directory, so inline images referenced
//! with relative paths resolve next to the document.
//!
//! ```rust,ignore
//! use ingredients_compiler::DocumentLoader;
//!
//! let html = DocumentLoader::from_path("pizza.md")?.compile(&settings)?;
//! ```

use crate::recipe::settings::CompilerSettings;
use crate::recipe::transforms::standard::pipeline;
use crate::recipe::transforms::{Transform, TransformError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error that can occur when loading documents
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("failed to read `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown pipeline `{0}`")]
    UnknownPipeline(String),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Document loader with transform shortcuts
#[derive(Debug)]
pub struct DocumentLoader {
    source: String,
    base_dir: Option<PathBuf>,
}

impl DocumentLoader {
    /// Load from a file path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoaderError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(DocumentLoader {
            source,
            base_dir: path.parent().map(Path::to_path_buf),
        })
    }

    /// Load from a string
    pub fn from_string<S: Into<String>>(source: S) -> Self {
        DocumentLoader {
            source: source.into(),
            base_dir: None,
        }
    }

    /// Run a custom transform on the source
    pub fn with<O: 'static>(&self, transform: &Transform<String, O>) -> Result<O, LoaderError> {
        Ok(transform.run(self.source.clone())?)
    }

    /// Run the named pipeline. Unless `settings` already names an image directory, images
    /// resolve against the document's own directory.
    pub fn run_pipeline(
        &self,
        name: &str,
        settings: &CompilerSettings,
    ) -> Result<String, LoaderError> {
        let settings = self.settings_for(settings);
        let transform =
            pipeline(name, &settings).ok_or_else(|| LoaderError::UnknownPipeline(name.to_string()))?;
        self.with(&transform)
    }

    /// Run the full recipe pipeline.
    ///
    /// This is a shortcut for `.run_pipeline("recipe", settings)`.
    pub fn compile(&self, settings: &CompilerSettings) -> Result<String, LoaderError> {
        self.run_pipeline("recipe", settings)
    }

    /// Get the raw source string
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Directory of the file this document was loaded from
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    fn settings_for(&self, settings: &CompilerSettings) -> CompilerSettings {
        let mut settings = settings.clone();
        if settings.images.base_dir.as_os_str().is_empty() {
            if let Some(dir) = &self.base_dir {
                settings.images.base_dir = dir.clone();
            }
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::error::CompileError;
    use crate::recipe::transforms::standard::RECIPE;

    #[test]
    fn test_from_string() {
        let loader = DocumentLoader::from_string("* [ ] Knead\n");
        assert_eq!(loader.source(), "* [ ] Knead\n");
        assert!(loader.base_dir().is_none());
    }

    #[test]
    fn test_with_static_transform() {
        let html = DocumentLoader::from_string("* [ ] Knead\n")
            .with(&*RECIPE)
            .unwrap();
        assert!(html.contains("<label><input type=\"checkbox\">Knead</label>"));
    }

    #[test]
    fn test_from_path_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = DocumentLoader::from_path(dir.path().join("nope.md")).unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
    }

    #[test]
    fn test_images_resolve_next_to_document() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dot.svg"), "<svg><g/></svg>").unwrap();
        fs::write(dir.path().join("recipe.md"), "Logo: ![d](dot.svg){.inline}\n").unwrap();

        let html = DocumentLoader::from_path(dir.path().join("recipe.md"))
            .unwrap()
            .run_pipeline("inline-images", &CompilerSettings::default())
            .unwrap();
        assert_eq!(html, "Logo: <svg><g/></svg>\n");
    }

    #[test]
    fn test_unknown_pipeline() {
        let err = DocumentLoader::from_string("")
            .run_pipeline("markdown", &CompilerSettings::default())
            .unwrap_err();
        assert!(matches!(err, LoaderError::UnknownPipeline(ref name) if name == "markdown"));
    }

    #[test]
    fn test_compile_error_surfaces() {
        let err = DocumentLoader::from_string("</ingredients>\n")
            .compile(&CompilerSettings::default())
            .unwrap_err();
        assert!(matches!(
            err,
            LoaderError::Transform(TransformError::StageFailed {
                source: CompileError::UnexpectedClose { line: 1, .. },
                ..
            })
        ));
    }
}
