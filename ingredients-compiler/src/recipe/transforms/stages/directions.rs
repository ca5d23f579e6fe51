//! Directions stage

use crate::recipe::directions::convert_directions;
use crate::recipe::transforms::{Lines, Runnable, TransformError};

/// Turns checklist lines and `<directions>` blocks into checkbox labels.
pub struct ConvertDirections;

impl ConvertDirections {
    pub const NAME: &'static str = "directions";

    pub fn new() -> Self {
        ConvertDirections
    }
}

impl Default for ConvertDirections {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<Lines, Lines> for ConvertDirections {
    fn run(&self, input: Lines) -> Result<Lines, TransformError> {
        let output = convert_directions(&input).map_err(TransformError::stage(Self::NAME))?;
        log::debug!("directions: {} line(s) in, {} out", input.len(), output.len());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_checklist() {
        let output = ConvertDirections::new()
            .run(vec!["* [ ] Knead".to_string()])
            .unwrap();
        assert_eq!(output[0], "<label><input type=\"checkbox\">Knead</label>");
    }

    #[test]
    fn test_unterminated_block_fails() {
        let err = ConvertDirections::new()
            .run(vec!["<directions>".to_string()])
            .unwrap_err();
        assert!(matches!(
            err,
            TransformError::StageFailed {
                stage: "directions",
                ..
            }
        ));
    }
}
