//! Table ids and scale-group bindings
//!
//! Tables are registered with their group while they are discovered; standalone scale markers
//! resolve against the registry afterwards. Bindings within a group keep discovery order so the
//! generated recompute and reset statements are reproducible.

use std::collections::HashMap;
use std::fmt;

/// Name that correlates a table's form with formulas emitted elsewhere in the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableId(String);

impl TableId {
    /// The `n`-th generated id of a document (1-based).
    pub fn generated(n: usize) -> Self {
        TableId(format!("ingredients{}", n))
    }

    /// An id taken from an explicit `form_name`.
    pub fn named(name: impl Into<String>) -> Self {
        TableId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a scale control needs to know about one table it drives.
#[derive(Debug, Clone, PartialEq)]
pub struct TableBinding {
    pub table_id: TableId,
    pub row_count: usize,
    pub has_total: bool,
    /// The table's own rounding precision, overriding the group's.
    pub precision: Option<f64>,
}

/// Scale group name → bound tables, in discovery order.
#[derive(Debug, Default)]
pub struct ScaleRegistry {
    groups: HashMap<String, Vec<TableBinding>>,
}

impl ScaleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a table to `group`.
    pub fn register(&mut self, group: &str, binding: TableBinding) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .push(binding);
    }

    /// Tables bound to `group`. Unknown groups resolve to no tables.
    pub fn resolve(&self, group: &str) -> &[TableBinding] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of bindings across all groups.
    pub fn binding_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}
