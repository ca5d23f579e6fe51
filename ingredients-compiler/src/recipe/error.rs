//! Error and warning types for recipe compilation
//!
//! Every fatal condition aborts the whole document: there is no best-effort rendering mode.
//! Line numbers are 1-based positions in the input line sequence of the failing stage.

use crate::recipe::settings::SettingsError;
use std::path::PathBuf;
use thiserror::Error;

/// A fatal problem with the document being compiled.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("line {line}: ingredient row `{text}` is missing the `|` delimiter")]
    MissingDelimiter { line: usize, text: String },

    #[error("line {line}: ingredient row `{text}` has no amount")]
    MissingAmount { line: usize, text: String },

    #[error("line {line}: `{amount}` is not a numeric amount")]
    InvalidAmount { line: usize, amount: String },

    #[error("line {line}: `{open}` is never closed by `{close}`")]
    UnterminatedBlock {
        line: usize,
        open: &'static str,
        close: &'static str,
    },

    #[error("line {line}: `{marker}` cannot appear inside another `{open}` block")]
    NestedBlock {
        line: usize,
        marker: String,
        open: &'static str,
    },

    #[error("line {line}: `{close}` has no matching opening marker")]
    UnexpectedClose { line: usize, close: &'static str },

    #[error("line {line}: malformed option list `{text}`: {reason}")]
    MalformedOptions {
        line: usize,
        text: String,
        reason: &'static str,
    },

    #[error("line {line}: unknown option `{key}` for `{marker}`")]
    UnknownOption {
        line: usize,
        key: String,
        marker: &'static str,
    },

    #[error("line {line}: option `{key}` is given more than once")]
    DuplicateOption { line: usize, key: String },

    #[error("line {line}: `{marker}` requires the `{key}` option")]
    MissingOption {
        line: usize,
        key: &'static str,
        marker: &'static str,
    },

    #[error("line {line}: invalid value `{value}` for option `{key}`: {reason}")]
    InvalidOption {
        line: usize,
        key: String,
        value: String,
        reason: &'static str,
    },

    #[error("line {line}: form name `{name}` is already used in this document")]
    DuplicateFormName { line: usize, name: String },

    #[error("line {line}: failed to read image `{}`: {source}", path.display())]
    ImageRead {
        line: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: SVG fragment in `{}` is not valid UTF-8", path.display())]
    InvalidSvg {
        line: usize,
        path: PathBuf,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error(transparent)]
    InvalidSettings(#[from] SettingsError),
}

impl CompileError {
    /// The input line the error points at; `None` when the settings themselves are unusable.
    pub fn line(&self) -> Option<usize> {
        match self {
            CompileError::MissingDelimiter { line, .. }
            | CompileError::MissingAmount { line, .. }
            | CompileError::InvalidAmount { line, .. }
            | CompileError::UnterminatedBlock { line, .. }
            | CompileError::NestedBlock { line, .. }
            | CompileError::UnexpectedClose { line, .. }
            | CompileError::MalformedOptions { line, .. }
            | CompileError::UnknownOption { line, .. }
            | CompileError::DuplicateOption { line, .. }
            | CompileError::MissingOption { line, .. }
            | CompileError::InvalidOption { line, .. }
            | CompileError::DuplicateFormName { line, .. }
            | CompileError::ImageRead { line, .. }
            | CompileError::InvalidSvg { line, .. } => Some(*line),
            CompileError::InvalidSettings(_) => None,
        }
    }
}

/// A recoverable problem. Compilation continues with the documented fallback.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileWarning {
    #[error(
        "line {line}: table `{table}` belongs to scale group `{group}`; its own scale control is suppressed"
    )]
    ScaleControlSuppressed {
        line: usize,
        table: String,
        group: String,
    },

    #[error("line {line}: scale group `{group}` has no ingredient tables; the control is inert")]
    EmptyScaleGroup { line: usize, group: String },

    #[error("line {line}: no `<scale name = {group}>` marker drives table `{table}`")]
    UndrivenTable {
        line: usize,
        table: String,
        group: String,
    },
}
