//! Individual transformation stages
//!
//! This module contains the individual stages that can be composed into pipelines.
//! Each stage implements the `Runnable` trait.

pub mod directions;
pub mod ingredients;
pub mod inline_images;
pub mod lines;

pub use directions::ConvertDirections;
pub use ingredients::CompileIngredients;
pub use inline_images::EmbedImages;
pub use lines::{JoinLines, SplitLines};
