//! Directions: checklist lines and `<directions>` blocks
//!
//! A GitHub-style task line `* [ ] Preheat oven` becomes a checkbox label. The label is followed
//! by an empty line so the host renders each step as its own paragraph.
//!
//! The block form wraps a run of steps in a list container:
//!
//! ```text
//! <directions>
//! Preheat oven
//! Knead dough
//! </directions>
//! ```

use crate::recipe::error::CompileError;
use crate::recipe::markup::{scan_blocks, BlockKind, Piece};
use once_cell::sync::Lazy;
use regex::Regex;

/// `* [ ] text`, ignoring whitespace around the text.
static CHECKLIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\* \[ \]\s*(.*?)\s*$").unwrap());

const BLOCK_HEADER: &str = "<dl>";
const BLOCK_FOOTER: &str = "</dl>";

fn checkbox_label(text: &str) -> String {
    format!("<label><input type=\"checkbox\">{}</label>", text)
}

/// The step text of a checklist line, if `line` is one.
pub fn checklist_item(line: &str) -> Option<&str> {
    CHECKLIST_ITEM
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Rewrites checklist lines and `<directions>` blocks. Everything else passes through.
pub fn convert_directions(lines: &[String]) -> Result<Vec<String>, CompileError> {
    let mut output = Vec::with_capacity(lines.len());
    for piece in scan_blocks(lines, BlockKind::Directions)? {
        match piece {
            Piece::Text(text) => match checklist_item(text.text) {
                Some(step) => {
                    output.push(checkbox_label(step));
                    output.push(String::new());
                }
                None => output.push(text.text.to_string()),
            },
            Piece::Block(block) => {
                if let Some(option) = block.options.first() {
                    return Err(CompileError::UnknownOption {
                        line: block.line,
                        key: option.key.clone(),
                        marker: BlockKind::Directions.open_marker(),
                    });
                }
                output.push(BLOCK_HEADER.to_string());
                for step in block.body {
                    let text = step.text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    let text = checklist_item(text).unwrap_or(text);
                    output.push(format!("{}<p>", checkbox_label(text)));
                }
                output.push(BLOCK_FOOTER.to_string());
            }
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(source: &str) -> Result<Vec<String>, CompileError> {
        let lines: Vec<String> = source.lines().map(str::to_string).collect();
        convert_directions(&lines)
    }

    #[test]
    fn test_checklist_item() {
        assert_eq!(checklist_item("* [ ] Preheat oven  "), Some("Preheat oven"));
        assert_eq!(checklist_item("* [ ]"), Some(""));
        assert_eq!(checklist_item("* [x] Done"), None);
        assert_eq!(checklist_item(" * [ ] indented"), None);
    }

    #[test]
    fn test_checklist_line() {
        let output = convert("* [ ] Preheat oven").unwrap();
        assert_eq!(
            output,
            vec![
                "<label><input type=\"checkbox\">Preheat oven</label>".to_string(),
                String::new()
            ]
        );
    }

    #[test]
    fn test_other_lines_pass_through() {
        let output = convert("# Pizza\n\nSome prose.").unwrap();
        assert_eq!(output, vec!["# Pizza", "", "Some prose."]);
    }

    #[test]
    fn test_block() {
        let output = convert("<directions>\nPreheat oven\n\n* [ ] Knead\n</directions>").unwrap();
        insta::assert_snapshot!(output.join("\n"), @r###"
        <dl>
        <label><input type="checkbox">Preheat oven</label><p>
        <label><input type="checkbox">Knead</label><p>
        </dl>
        "###);
    }

    #[test]
    fn test_unterminated_block() {
        let err = convert("<directions>\nPreheat oven").unwrap_err();
        assert!(matches!(err, CompileError::UnterminatedBlock { line: 1, .. }));
    }

    #[test]
    fn test_block_rejects_options() {
        let err = convert("<directions style = numbered>\n</directions>").unwrap_err();
        assert!(matches!(err, CompileError::UnknownOption { .. }));
    }
}
