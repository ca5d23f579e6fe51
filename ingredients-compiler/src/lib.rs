//! # ingredients
//!
//! Compiles recipe markup embedded in a larger text document into self-contained, interactive
//! HTML fragments.
//!
//! The host rendering pipeline hands us the document as a sequence of lines and takes a
//! transformed sequence back. Everything between is a handful of independent passes:
//!
//! ```text
//! recipe
//!   ├── markup        Block scanner (outside / in-block state machine) and option lists
//!   ├── options       Typed option decoding
//!   ├── table         Ingredient rows and unit-consistent totals
//!   ├── scale         Table ids and scale-group bindings
//!   ├── render        HTML forms with embedded recompute handlers
//!   ├── compile       The ingredient pass: discovery, then emission
//!   ├── directions    Checklist lines and `<directions>` blocks
//!   ├── images        Inline image embedding (base64 rasters, literal SVG)
//!   ├── transforms    Runnable stages and the standard pipelines
//!   └── loader        Reads a document and runs a pipeline over it
//! ```
//!
//! All per-document state (the table counter, the scale-group registry) lives in an
//! accumulator that is created per compilation call, so compiling is reentrant.

pub mod recipe;

pub use recipe::compile::{compile_ingredients, CompileOutput};
pub use recipe::error::{CompileError, CompileWarning};
pub use recipe::loader::{DocumentLoader, LoaderError};
pub use recipe::settings::{CompilerSettings, ImageSettings, RenderDefaults, SettingsError};
pub use recipe::transforms::{Runnable, Transform, TransformError};
