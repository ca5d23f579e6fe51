//! Main module for recipe compilation

pub mod compile;
pub mod directions;
pub mod error;
pub mod images;
pub mod loader;
pub mod markup;
pub mod options;
pub mod render;
pub mod scale;
pub mod settings;
pub mod table;
pub mod transforms;
