//! Typed option decoding
//!
//! Markers carry their options as text. Decoding is strict: unknown keys, non-numeric numbers
//! and non-identifier names are configuration errors, never silently truncated.

use crate::recipe::error::CompileError;
use crate::recipe::markup::{is_identifier, RawOption};

const TABLE_MARKER: &str = "<ingredients>";
const SCALE_MARKER: &str = "<scale>";

/// Options of an ingredient block. `None` means "not given on the marker".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableOptions {
    pub title: Option<String>,
    pub form_name: Option<String>,
    /// External scale group this table belongs to.
    pub scale: Option<String>,
    pub scale_label: Option<String>,
    pub default_scale: Option<f64>,
    pub precision: Option<f64>,
    pub checkbox: Option<bool>,
}

impl TableOptions {
    pub fn decode(raw: &[RawOption], line: usize) -> Result<Self, CompileError> {
        let mut options = TableOptions::default();
        for RawOption { key, value } in raw {
            match key.as_str() {
                "title" => options.title = Some(value.clone()),
                "form_name" => options.form_name = Some(identifier(key, value, line)?),
                "scale" => options.scale = Some(identifier(key, value, line)?),
                "scale_label" => options.scale_label = Some(value.clone()),
                "default_scale" => options.default_scale = Some(scale_factor(key, value, line)?),
                "precision" => options.precision = Some(precision(key, value, line)?),
                "checkbox" => options.checkbox = Some(boolean(key, value, line)?),
                _ => {
                    return Err(CompileError::UnknownOption {
                        line,
                        key: key.clone(),
                        marker: TABLE_MARKER,
                    })
                }
            }
        }
        Ok(options)
    }

    /// A grouped table that also sets options only its own control would use is asking for
    /// a control it cannot have.
    pub fn requests_own_control(&self) -> bool {
        self.scale_label.is_some() || self.default_scale.is_some()
    }
}

/// Options of a standalone `<scale>` marker.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleOptions {
    /// The scale group this control drives.
    pub name: String,
    pub title: Option<String>,
    pub form_name: Option<String>,
    pub scale_label: Option<String>,
    pub default_scale: Option<f64>,
    pub precision: Option<f64>,
}

impl ScaleOptions {
    pub fn decode(raw: &[RawOption], line: usize) -> Result<Self, CompileError> {
        let mut name = None;
        let mut title = None;
        let mut form_name = None;
        let mut scale_label = None;
        let mut default_scale = None;
        let mut precision_value = None;
        for RawOption { key, value } in raw {
            match key.as_str() {
                "name" => name = Some(identifier(key, value, line)?),
                "title" => title = Some(value.clone()),
                "form_name" => form_name = Some(identifier(key, value, line)?),
                "scale_label" => scale_label = Some(value.clone()),
                "default_scale" => default_scale = Some(scale_factor(key, value, line)?),
                "precision" => precision_value = Some(precision(key, value, line)?),
                _ => {
                    return Err(CompileError::UnknownOption {
                        line,
                        key: key.clone(),
                        marker: SCALE_MARKER,
                    })
                }
            }
        }
        let name = name.ok_or(CompileError::MissingOption {
            line,
            key: "name",
            marker: SCALE_MARKER,
        })?;
        Ok(ScaleOptions {
            name,
            title,
            form_name,
            scale_label,
            default_scale,
            precision: precision_value,
        })
    }
}

fn invalid(key: &str, value: &str, line: usize, reason: &'static str) -> CompileError {
    CompileError::InvalidOption {
        line,
        key: key.to_string(),
        value: value.to_string(),
        reason,
    }
}

fn identifier(key: &str, value: &str, line: usize) -> Result<String, CompileError> {
    if is_identifier(value) {
        Ok(value.to_string())
    } else {
        Err(invalid(key, value, line, "expected an identifier"))
    }
}

fn number(key: &str, value: &str, line: usize) -> Result<f64, CompileError> {
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(invalid(key, value, line, "expected a number")),
    }
}

/// A usable initial multiplier: finite and not negative.
pub(crate) fn check_scale_factor(factor: f64) -> Result<f64, &'static str> {
    if !factor.is_finite() {
        Err("expected a number")
    } else if factor < 0.0 {
        Err("must not be negative")
    } else {
        Ok(factor)
    }
}

/// A usable rounding granularity: finite and greater than zero.
pub(crate) fn check_precision(precision: f64) -> Result<f64, &'static str> {
    if !precision.is_finite() {
        Err("expected a number")
    } else if precision <= 0.0 {
        Err("must be greater than zero")
    } else {
        Ok(precision)
    }
}

fn scale_factor(key: &str, value: &str, line: usize) -> Result<f64, CompileError> {
    check_scale_factor(number(key, value, line)?).map_err(|reason| invalid(key, value, line, reason))
}

fn precision(key: &str, value: &str, line: usize) -> Result<f64, CompileError> {
    check_precision(number(key, value, line)?).map_err(|reason| invalid(key, value, line, reason))
}

fn boolean(key: &str, value: &str, line: usize) -> Result<bool, CompileError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(invalid(key, value, line, "expected `true` or `false`")),
    }
}
