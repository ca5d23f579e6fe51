//! The ingredient pass
//!
//! Compilation runs in two phases over one document:
//!
//! 1. Discovery: fold `<ingredients>` blocks and `<scale>` markers into segments, parse every
//!    table, assign table ids and register grouped tables with their scale group.
//! 2. Emission: build a new line sequence, rendering each table and each scale control. Scale
//!    controls only resolve here, once every table of the document is known, so a marker may
//!    appear before or after the tables it drives.
//!
//! All counters and registries live in [`CompileState`], created fresh per call.

use crate::recipe::error::{CompileError, CompileWarning};
use crate::recipe::markup::{
    parse_options, scan_blocks, split_scale_markers, Block, BlockKind, LinePiece, Piece,
};
use crate::recipe::options::{ScaleOptions, TableOptions};
use crate::recipe::render::{
    render_scale_control, render_table, ScaleView, TableView, DOCUMENT_HEADER,
};
use crate::recipe::scale::{ScaleRegistry, TableBinding, TableId};
use crate::recipe::settings::RenderDefaults;
use crate::recipe::table::IngredientTable;
use std::collections::{HashMap, HashSet};

/// Result of compiling one document.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOutput {
    pub lines: Vec<String>,
    pub warnings: Vec<CompileWarning>,
}

/// Compiles every ingredient block and scale marker in `lines`.
///
/// The document header is prepended exactly once. Any fatal error aborts the whole document,
/// and unusable `defaults` are rejected before the first line is read.
pub fn compile_ingredients(
    lines: &[String],
    defaults: &RenderDefaults,
) -> Result<CompileOutput, CompileError> {
    defaults.validate()?;
    let mut state = CompileState::new(defaults);
    let segments = state.discover(lines)?;
    let lines = state.emit(&segments);
    log::debug!(
        "compiled {} ingredient table(s), {} grouped",
        state.table_count,
        state.registry.binding_count()
    );
    Ok(CompileOutput {
        lines,
        warnings: state.warnings,
    })
}

struct DiscoveredTable {
    id: TableId,
    line: usize,
    options: TableOptions,
    table: IngredientTable,
}

struct DiscoveredScale {
    line: usize,
    form: String,
    options: ScaleOptions,
}

enum Segment<'a> {
    Text(&'a str),
    Table(DiscoveredTable),
    Scale(DiscoveredScale),
}

/// Settings a group's first scale marker imposes on the tables it drives.
#[derive(Debug, Clone, Copy)]
struct GroupControl {
    default_scale: f64,
    precision: f64,
}

/// Per-document accumulator.
struct CompileState<'d> {
    defaults: &'d RenderDefaults,
    table_count: usize,
    registry: ScaleRegistry,
    controls: HashMap<String, GroupControl>,
    form_names: HashSet<String>,
    warnings: Vec<CompileWarning>,
}

impl<'d> CompileState<'d> {
    fn new(defaults: &'d RenderDefaults) -> Self {
        Self {
            defaults,
            table_count: 0,
            registry: ScaleRegistry::new(),
            controls: HashMap::new(),
            form_names: HashSet::new(),
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, warning: CompileWarning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn claim_form_name(&mut self, name: &str, line: usize) -> Result<(), CompileError> {
        if self.form_names.insert(name.to_string()) {
            Ok(())
        } else {
            Err(CompileError::DuplicateFormName {
                line,
                name: name.to_string(),
            })
        }
    }

    fn discover<'a>(&mut self, lines: &'a [String]) -> Result<Vec<Segment<'a>>, CompileError> {
        let mut segments = Vec::new();
        for piece in scan_blocks(lines, BlockKind::Ingredients)? {
            match piece {
                Piece::Block(block) => segments.push(Segment::Table(self.discover_table(&block)?)),
                Piece::Text(text) => match split_scale_markers(text.text) {
                    None => segments.push(Segment::Text(text.text)),
                    Some(parts) => {
                        for part in parts {
                            match part {
                                LinePiece::Text(t) if t.trim().is_empty() => {}
                                LinePiece::Text(t) => segments.push(Segment::Text(t)),
                                LinePiece::ScaleMarker(source) => segments
                                    .push(Segment::Scale(self.discover_scale(source, text.line)?)),
                            }
                        }
                    }
                },
            }
        }
        Ok(segments)
    }

    fn discover_table(&mut self, block: &Block<'_>) -> Result<DiscoveredTable, CompileError> {
        let options = TableOptions::decode(&block.options, block.line)?;
        let table = IngredientTable::parse(&block.body)?;

        self.table_count += 1;
        let id = match &options.form_name {
            Some(name) => TableId::named(name.clone()),
            None => TableId::generated(self.table_count),
        };
        self.claim_form_name(id.as_str(), block.line)?;

        if let Some(group) = &options.scale {
            if options.requests_own_control() {
                self.warn(CompileWarning::ScaleControlSuppressed {
                    line: block.line,
                    table: id.to_string(),
                    group: group.clone(),
                });
            }
            self.registry.register(
                group,
                TableBinding {
                    table_id: id.clone(),
                    row_count: table.len(),
                    has_total: table.has_total(),
                    precision: options.precision,
                },
            );
        }

        Ok(DiscoveredTable {
            id,
            line: block.line,
            options,
            table,
        })
    }

    fn discover_scale(&mut self, source: &str, line: usize) -> Result<DiscoveredScale, CompileError> {
        let options = ScaleOptions::decode(&parse_options(source, line)?, line)?;
        let form = options
            .form_name
            .clone()
            .unwrap_or_else(|| format!("scale_{}", options.name));
        self.claim_form_name(&form, line)?;

        let control = GroupControl {
            default_scale: options.default_scale.unwrap_or(self.defaults.default_scale),
            precision: options.precision.unwrap_or(self.defaults.precision),
        };
        self.controls.entry(options.name.clone()).or_insert(control);

        Ok(DiscoveredScale {
            line,
            form,
            options,
        })
    }

    fn emit(&mut self, segments: &[Segment<'_>]) -> Vec<String> {
        let mut lines: Vec<String> = DOCUMENT_HEADER.iter().map(|l| l.to_string()).collect();
        let mut emitted_tables = 0;
        for segment in segments {
            match segment {
                Segment::Text(text) => lines.push(text.to_string()),
                Segment::Table(discovered) => {
                    lines.extend(self.emit_table(discovered));
                    emitted_tables += 1;
                }
                Segment::Scale(discovered) => lines.extend(self.emit_scale(discovered)),
            }
        }
        debug_assert_eq!(emitted_tables, self.table_count);
        lines
    }

    fn emit_table(&mut self, discovered: &DiscoveredTable) -> Vec<String> {
        let defaults = self.defaults;
        let options = &discovered.options;
        let checkbox = options.checkbox.unwrap_or(defaults.checkbox);

        let view = match &options.scale {
            Some(group) => {
                let control = self.controls.get(group).copied();
                if control.is_none() {
                    self.warn(CompileWarning::UndrivenTable {
                        line: discovered.line,
                        table: discovered.id.to_string(),
                        group: group.clone(),
                    });
                }
                TableView {
                    id: &discovered.id,
                    title: options.title.as_deref(),
                    checkbox,
                    default_scale: control.map_or(defaults.default_scale, |c| c.default_scale),
                    precision: options
                        .precision
                        .or(control.map(|c| c.precision))
                        .unwrap_or(defaults.precision),
                    own_scale_label: None,
                }
            }
            None => TableView {
                id: &discovered.id,
                title: options.title.as_deref(),
                checkbox,
                default_scale: options.default_scale.unwrap_or(defaults.default_scale),
                precision: options.precision.unwrap_or(defaults.precision),
                own_scale_label: Some(
                    options
                        .scale_label
                        .as_deref()
                        .unwrap_or(&defaults.scale_label),
                ),
            },
        };
        render_table(&discovered.table, &view)
    }

    fn emit_scale(&mut self, discovered: &DiscoveredScale) -> Vec<String> {
        let defaults = self.defaults;
        let options = &discovered.options;
        if self.registry.resolve(&options.name).is_empty() {
            self.warn(CompileWarning::EmptyScaleGroup {
                line: discovered.line,
                group: options.name.clone(),
            });
        }

        let view = ScaleView {
            form: &discovered.form,
            title: options.title.as_deref(),
            label: options
                .scale_label
                .as_deref()
                .unwrap_or(&defaults.scale_label),
            default_scale: options.default_scale.unwrap_or(defaults.default_scale),
            precision: options.precision.unwrap_or(defaults.precision),
        };
        render_scale_control(&view, self.registry.resolve(&options.name))
    }
}
