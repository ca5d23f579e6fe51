//! Ingredient rows and tables
//!
//! A row is `name | amount unit`. The name is everything before the first `|`; the amount is
//! the first whitespace-separated token after it and the unit is the rest (it may contain
//! spaces).
//!
//! A table carries a total only while every row shares one unit. The first mismatch disables
//! totaling for good, even if later rows return to the first unit.

use crate::recipe::error::CompileError;
use crate::recipe::markup::BodyLine;

#[derive(Debug, Clone, PartialEq)]
pub struct IngredientRow {
    pub name: String,
    /// The amount exactly as written; this is what the unscaled default shows.
    pub amount: String,
    pub unit: String,
    /// `amount` as a number.
    pub quantity: f64,
}

impl IngredientRow {
    /// Parses one body line. `line` is only used for error reporting.
    pub fn parse(text: &str, line: usize) -> Result<Self, CompileError> {
        let (name, rest) = text
            .split_once('|')
            .ok_or_else(|| CompileError::MissingDelimiter {
                line,
                text: text.trim().to_string(),
            })?;

        let rest = rest.trim();
        let (amount, unit) = match rest.split_once(char::is_whitespace) {
            Some((amount, unit)) => (amount, unit.trim()),
            None => (rest, ""),
        };
        if amount.is_empty() {
            return Err(CompileError::MissingAmount {
                line,
                text: text.trim().to_string(),
            });
        }

        let quantity = match amount.parse::<f64>() {
            Ok(quantity) if quantity.is_finite() => quantity,
            _ => {
                return Err(CompileError::InvalidAmount {
                    line,
                    amount: amount.to_string(),
                })
            }
        };

        Ok(IngredientRow {
            name: name.trim().to_string(),
            amount: amount.to_string(),
            unit: unit.to_string(),
            quantity,
        })
    }
}

/// Running state of the automatic total.
#[derive(Debug, Clone, PartialEq)]
enum Totaling {
    Empty,
    Consistent { unit: String, sum: f64 },
    Disabled,
}

impl Totaling {
    fn add(self, row: &IngredientRow) -> Self {
        match self {
            Totaling::Empty => Totaling::Consistent {
                unit: row.unit.clone(),
                sum: row.quantity,
            },
            Totaling::Consistent { unit, sum } if unit == row.unit => Totaling::Consistent {
                unit,
                sum: sum + row.quantity,
            },
            Totaling::Consistent { .. } | Totaling::Disabled => Totaling::Disabled,
        }
    }
}

/// The rows of one ingredient block, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientTable {
    rows: Vec<IngredientRow>,
    total: Option<f64>,
    total_unit: Option<String>,
}

impl IngredientTable {
    pub fn from_rows(rows: Vec<IngredientRow>) -> Self {
        let totaling = rows.iter().fold(Totaling::Empty, Totaling::add);
        let (total, total_unit) = match totaling {
            Totaling::Consistent { unit, sum } => (Some(sum), Some(unit)),
            Totaling::Empty | Totaling::Disabled => (None, None),
        };
        IngredientTable {
            rows,
            total,
            total_unit,
        }
    }

    /// Parses a block body, skipping blank lines. The first malformed row aborts the table.
    pub fn parse(body: &[BodyLine<'_>]) -> Result<Self, CompileError> {
        let rows = body
            .iter()
            .filter(|body_line| !body_line.text.trim().is_empty())
            .map(|body_line| IngredientRow::parse(body_line.text, body_line.line))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_rows(rows))
    }

    pub fn rows(&self) -> &[IngredientRow] {
        &self.rows
    }

    /// Sum of all amounts, present only when every row shares one unit.
    pub fn total(&self) -> Option<f64> {
        self.total
    }

    /// The shared unit of the total.
    pub fn total_unit(&self) -> Option<&str> {
        self.total_unit.as_deref()
    }

    pub fn has_total(&self) -> bool {
        self.total.is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
