//! Line adapters
//!
//! The compiler passes work on line sequences; documents arrive and leave as text.

use crate::recipe::transforms::{Lines, Runnable, TransformError};

/// `String` → `Vec<String>`, splitting on `\n` (a trailing `\r` is dropped).
pub struct SplitLines;

impl SplitLines {
    pub fn new() -> Self {
        SplitLines
    }
}

impl Default for SplitLines {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<String, Lines> for SplitLines {
    fn run(&self, input: String) -> Result<Lines, TransformError> {
        Ok(input.lines().map(str::to_string).collect())
    }
}

impl Runnable<&str, Lines> for SplitLines {
    fn run(&self, input: &str) -> Result<Lines, TransformError> {
        Ok(input.lines().map(str::to_string).collect())
    }
}

/// `Vec<String>` → `String`, newline-terminating every line.
pub struct JoinLines;

impl JoinLines {
    pub fn new() -> Self {
        JoinLines
    }
}

impl Default for JoinLines {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<Lines, String> for JoinLines {
    fn run(&self, input: Lines) -> Result<String, TransformError> {
        let mut text = String::with_capacity(input.iter().map(|l| l.len() + 1).sum());
        for line in input {
            text.push_str(&line);
            text.push('\n');
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines() {
        let lines = SplitLines::new().run("a\r\nb\n\nc").unwrap();
        assert_eq!(lines, vec!["a", "b", "", "c"]);
    }

    #[test]
    fn test_split_empty() {
        assert!(SplitLines::new().run(String::new()).unwrap().is_empty());
    }

    #[test]
    fn test_join_lines() {
        let text = JoinLines::new()
            .run(vec!["a".to_string(), String::new(), "b".to_string()])
            .unwrap();
        assert_eq!(text, "a\n\nb\n");
        assert_eq!(JoinLines::new().run(Vec::new()).unwrap(), "");
    }
}
