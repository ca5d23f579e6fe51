//! Standard transform definitions
//!
//! Pre-built pipelines for the common cases. The statics use the built-in defaults
//! (images resolve against the working directory); [`pipeline`] builds the same
//! pipelines from caller-supplied settings.

use crate::recipe::settings::CompilerSettings;
use crate::recipe::transforms::stages::{
    CompileIngredients, ConvertDirections, EmbedImages, JoinLines, SplitLines,
};
use crate::recipe::transforms::{Lines, Transform};
use once_cell::sync::Lazy;

/// Type alias for a line-sequence pass
pub type LinesTransform = Transform<Lines, Lines>;

/// Type alias for a whole-document pipeline
pub type DocumentTransform = Transform<String, String>;

/// Pipeline names accepted by [`pipeline`], with a one-line description each.
pub const AVAILABLE_PIPELINES: &[(&str, &str)] = &[
    (
        "recipe",
        "ingredient tables, scale controls, directions and inline images",
    ),
    ("ingredients", "ingredient tables and scale controls only"),
    ("directions", "checklist lines and <directions> blocks only"),
    ("inline-images", "inline image embedding only"),
];

/// Ingredient pass: Vec<String> → Vec<String>
pub static INGREDIENTS: Lazy<LinesTransform> =
    Lazy::new(|| Transform::from_fn(Ok).then(CompileIngredients::new()));

/// Directions pass: Vec<String> → Vec<String>
pub static DIRECTIONS: Lazy<LinesTransform> =
    Lazy::new(|| Transform::from_fn(Ok).then(ConvertDirections::new()));

/// Inline image pass: Vec<String> → Vec<String>
pub static INLINE_IMAGES: Lazy<LinesTransform> =
    Lazy::new(|| Transform::from_fn(Ok).then(EmbedImages::new()));

/// Full recipe pipeline: String → String
///
/// 1. Split into lines
/// 2. Ingredient tables and scale controls
/// 3. Directions
/// 4. Inline images
/// 5. Join lines
///
/// # Example
///
/// ```rust,ignore
/// use ingredients_compiler::recipe::transforms::standard::RECIPE;
///
/// let html = RECIPE.run("* [ ] Preheat oven\n".to_string()).unwrap();
/// ```
pub static RECIPE: Lazy<DocumentTransform> = Lazy::new(|| {
    Transform::<String, String>::from_fn(Ok)
        .then(SplitLines::new())
        .then_transform(&*INGREDIENTS)
        .then_transform(&*DIRECTIONS)
        .then_transform(&*INLINE_IMAGES)
        .then(JoinLines::new())
});

/// Builds the named pipeline from `settings`, or `None` for an unknown name.
pub fn pipeline(name: &str, settings: &CompilerSettings) -> Option<DocumentTransform> {
    let ingredients = || CompileIngredients::with_defaults(settings.render.clone());
    let images = || EmbedImages::with_settings(settings.images.clone());
    let split: Transform<String, Lines> = Transform::from_fn(Ok).then(SplitLines::new());

    let lines = match name {
        "recipe" => split
            .then(ingredients())
            .then(ConvertDirections::new())
            .then(images()),
        "ingredients" => split.then(ingredients()),
        "directions" => split.then(ConvertDirections::new()),
        "inline-images" => split.then(images()),
        _ => return None,
    };
    Some(lines.then(JoinLines::new()))
}
