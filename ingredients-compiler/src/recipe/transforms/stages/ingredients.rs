//! Ingredient stage
//!
//! Compiles `<ingredients>` blocks and `<scale>` markers into interactive forms.

use crate::recipe::compile::compile_ingredients;
use crate::recipe::settings::RenderDefaults;
use crate::recipe::transforms::{Lines, Runnable, TransformError};

/// Ingredient stage
///
/// Warnings are logged and dropped here; callers that need them call
/// [`compile_ingredients`] directly.
///
/// # Input
/// - `Vec<String>` - document lines
///
/// # Output
/// - `Vec<String>` - the header, then the document with every block rendered
pub struct CompileIngredients {
    defaults: RenderDefaults,
}

impl CompileIngredients {
    pub const NAME: &'static str = "ingredients";

    pub fn new() -> Self {
        Self::with_defaults(RenderDefaults::default())
    }

    pub fn with_defaults(defaults: RenderDefaults) -> Self {
        CompileIngredients { defaults }
    }
}

impl Default for CompileIngredients {
    fn default() -> Self {
        Self::new()
    }
}

impl Runnable<Lines, Lines> for CompileIngredients {
    fn run(&self, input: Lines) -> Result<Lines, TransformError> {
        let output =
            compile_ingredients(&input, &self.defaults).map_err(TransformError::stage(Self::NAME))?;
        Ok(output.lines)
    }
}
