//! Markup scanning
//!
//! Block detection is a small line-by-line state machine rather than a regex over the whole
//! document: each line either stays outside, opens a block, extends the open block, or closes
//! it. A stage scans for the one block kind it owns; markers of other kinds are plain text to
//! it.
//!
//! Marker grammar:
//!
//! ```text
//! <ingredients title = "Pizza dough", scale = dough>
//! Flour | 500 g
//! </ingredients>
//!
//! Makes <scale name = dough, scale_label = pizzas> pizzas.
//! ```
//!
//! Open and close markers must be the only thing on their line. Scale markers may sit anywhere
//! on a line outside of a block.

use crate::recipe::error::CompileError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Inline standalone scale marker.
static SCALE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"<scale(?:\s+([^>]*))?>").unwrap());

/// The block kinds a stage can own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Ingredients,
    Directions,
}

impl BlockKind {
    pub fn tag(self) -> &'static str {
        match self {
            BlockKind::Ingredients => "ingredients",
            BlockKind::Directions => "directions",
        }
    }

    pub fn open_marker(self) -> &'static str {
        match self {
            BlockKind::Ingredients => "<ingredients>",
            BlockKind::Directions => "<directions>",
        }
    }

    pub fn close_marker(self) -> &'static str {
        match self {
            BlockKind::Ingredients => "</ingredients>",
            BlockKind::Directions => "</directions>",
        }
    }

    /// Returns the raw option text if `text` is an open marker of this kind.
    fn match_open(self, text: &str) -> Option<&str> {
        let inner = text
            .trim()
            .strip_prefix('<')?
            .strip_prefix(self.tag())?
            .strip_suffix('>')?;
        if inner.is_empty() {
            Some(inner)
        } else if inner.starts_with(char::is_whitespace) {
            Some(inner.trim())
        } else {
            None
        }
    }

    fn match_close(self, text: &str) -> bool {
        text.trim() == self.close_marker()
    }
}

/// One `key = value` pair exactly as written in a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOption {
    pub key: String,
    pub value: String,
}

/// A body line together with its 1-based position in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLine<'a> {
    pub line: usize,
    pub text: &'a str,
}

/// A complete, closed block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block<'a> {
    pub kind: BlockKind,
    /// Line of the open marker.
    pub line: usize,
    pub options: Vec<RawOption>,
    pub body: Vec<BodyLine<'a>>,
}

/// Output of [`scan_blocks`]: the input with every block of one kind folded into a [`Block`].
#[derive(Debug, Clone, PartialEq)]
pub enum Piece<'a> {
    Text(BodyLine<'a>),
    Block(Block<'a>),
}

enum ScanState<'a> {
    Outside,
    InBlock(Block<'a>),
}

/// Folds every `kind` block in `lines` into a [`Piece::Block`].
///
/// Fails on a nested open marker, a stray close marker, or an open marker that reaches the end
/// of input, so a caller never sees a partially scanned document.
pub fn scan_blocks(lines: &[String], kind: BlockKind) -> Result<Vec<Piece<'_>>, CompileError> {
    let mut pieces = Vec::new();
    let mut state = ScanState::Outside;

    for (index, text) in lines.iter().enumerate() {
        let line = index + 1;
        state = match state {
            ScanState::Outside => {
                if let Some(options) = kind.match_open(text) {
                    ScanState::InBlock(Block {
                        kind,
                        line,
                        options: parse_options(options, line)?,
                        body: Vec::new(),
                    })
                } else if kind.match_close(text) {
                    return Err(CompileError::UnexpectedClose {
                        line,
                        close: kind.close_marker(),
                    });
                } else {
                    pieces.push(Piece::Text(BodyLine { line, text }));
                    ScanState::Outside
                }
            }
            ScanState::InBlock(mut block) => {
                if kind.match_close(text) {
                    pieces.push(Piece::Block(block));
                    ScanState::Outside
                } else if kind.match_open(text).is_some() {
                    return Err(CompileError::NestedBlock {
                        line,
                        marker: text.trim().to_string(),
                        open: kind.open_marker(),
                    });
                } else {
                    block.body.push(BodyLine { line, text });
                    ScanState::InBlock(block)
                }
            }
        };
    }

    match state {
        ScanState::Outside => Ok(pieces),
        ScanState::InBlock(block) => Err(CompileError::UnterminatedBlock {
            line: block.line,
            open: kind.open_marker(),
            close: kind.close_marker(),
        }),
    }
}

/// Parses a comma-separated `key = value` list. Values are bare (trimmed) or double-quoted.
pub fn parse_options(source: &str, line: usize) -> Result<Vec<RawOption>, CompileError> {
    let malformed = |reason| CompileError::MalformedOptions {
        line,
        text: source.to_string(),
        reason,
    };

    let mut options: Vec<RawOption> = Vec::new();
    let mut rest = source.trim();
    while !rest.is_empty() {
        let eq = rest
            .find('=')
            .ok_or_else(|| malformed("expected `key = value`"))?;
        let key = rest[..eq].trim();
        if !is_identifier(key) {
            return Err(malformed("option keys must be identifiers"));
        }

        let after = rest[eq + 1..].trim_start();
        let (value, remainder) = match after.strip_prefix('"') {
            Some(quoted) => {
                let end = quoted
                    .find('"')
                    .ok_or_else(|| malformed("unterminated quoted value"))?;
                (&quoted[..end], quoted[end + 1..].trim_start())
            }
            None => {
                let end = after.find(',').unwrap_or(after.len());
                let value = after[..end].trim();
                if value.is_empty() {
                    return Err(malformed("missing value"));
                }
                (value, &after[end..])
            }
        };

        rest = if remainder.is_empty() {
            remainder
        } else {
            let next = remainder
                .strip_prefix(',')
                .ok_or_else(|| malformed("expected `,` between options"))?
                .trim_start();
            if next.is_empty() {
                return Err(malformed("trailing comma"));
            }
            next
        };

        if options.iter().any(|option| option.key == key) {
            return Err(CompileError::DuplicateOption {
                line,
                key: key.to_string(),
            });
        }
        options.push(RawOption {
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    Ok(options)
}

/// Part of a line that carries standalone scale markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinePiece<'a> {
    Text(&'a str),
    /// Raw option text of a `<scale ...>` marker.
    ScaleMarker(&'a str),
}

/// Splits a line around its scale markers. Returns `None` when the line has none.
pub fn split_scale_markers(text: &str) -> Option<Vec<LinePiece<'_>>> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for captures in SCALE_MARKER.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        pieces.push(LinePiece::Text(&text[last..whole.start()]));
        let options = captures.get(1).map_or("", |m| m.as_str().trim());
        pieces.push(LinePiece::ScaleMarker(options));
        last = whole.end();
    }
    if pieces.is_empty() {
        return None;
    }
    pieces.push(LinePiece::Text(&text[last..]));
    Some(pieces)
}

/// `[A-Za-z_][A-Za-z0-9_]*`: names that end up inside client-side expressions.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
