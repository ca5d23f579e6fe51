//! Transform pipeline infrastructure
//!
//! Every pass of the compiler is a stage that turns one line sequence into another. Stages
//! implement [`Runnable`] and are chained into a [`Transform`] with `.then()`; the compiler
//! checks at each link that the output type of one stage is the input type of the next.
//!
//! ```rust,ignore
//! let pipeline = Transform::from_fn(Ok)
//!     .then(SplitLines::new())           // String     → Vec<String>
//!     .then(CompileIngredients::new())   // Vec<String> → Vec<String>
//!     .then(JoinLines::new());           // Vec<String> → String
//! ```
//!
//! The pipelines the CLI exposes by name are pre-built in [`standard`].
//!
//! # Module Organization
//!
//! - [`stages`]: individual stages (ingredients, directions, inline images, line adapters)
//! - [`standard`]: pre-built pipelines and the name lookup

pub mod stages;
pub mod standard;

use crate::recipe::error::CompileError;
use thiserror::Error;

/// The unit every compiler pass consumes and produces.
pub type Lines = Vec<String>;

/// Error raised by a pipeline stage
#[derive(Error, Debug)]
pub enum TransformError {
    /// A compiler stage rejected the document
    #[error("stage '{stage}' failed: {source}")]
    StageFailed {
        stage: &'static str,
        #[source]
        source: CompileError,
    },
}

impl TransformError {
    /// Wraps a compiler error with the name of the stage that raised it.
    pub fn stage(stage: &'static str) -> impl FnOnce(CompileError) -> TransformError {
        move |source| TransformError::StageFailed { stage, source }
    }
}

/// Trait for anything that can transform an input to an output
///
/// This is implemented by individual transformation stages.
/// The `Transform` struct composes multiple `Runnable` implementations.
pub trait Runnable<I, O> {
    /// Execute this transformation on the input
    fn run(&self, input: I) -> Result<O, TransformError>;
}

/// A composable transformation pipeline
///
/// `Transform<I, O>` represents a transformation from type `I` to type `O`.
/// It is `Send + Sync`, so pre-built pipelines can live in statics.
pub struct Transform<I, O> {
    run_fn: Box<dyn Fn(I) -> Result<O, TransformError> + Send + Sync>,
}

impl<I, O> Transform<I, O> {
    /// Create a transform from a function
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(I) -> Result<O, TransformError> + Send + Sync + 'static,
    {
        Transform {
            run_fn: Box::new(f),
        }
    }

    /// Add a stage to this transform, returning a new transform with extended output type
    pub fn then<O2, S>(self, stage: S) -> Transform<I, O2>
    where
        S: Runnable<O, O2> + Send + Sync + 'static,
        I: 'static,
        O: 'static,
        O2: 'static,
    {
        let prev_run = self.run_fn;
        Transform {
            run_fn: Box::new(move |input| {
                let intermediate = prev_run(input)?;
                stage.run(intermediate)
            }),
        }
    }

    /// Chain a pre-built (static) transform to this transform
    pub fn then_transform<O2>(self, next: &'static Transform<O, O2>) -> Transform<I, O2>
    where
        I: 'static,
        O: 'static,
        O2: 'static,
    {
        let prev_run = self.run_fn;
        Transform {
            run_fn: Box::new(move |input| {
                let intermediate = prev_run(input)?;
                next.run(intermediate)
            }),
        }
    }

    /// Execute this transform on the given input
    pub fn run(&self, input: I) -> Result<O, TransformError> {
        (self.run_fn)(input)
    }
}

// Transforms can be used as stages of other transforms
impl<I, O> Runnable<I, O> for Transform<I, O>
where
    I: 'static,
    O: 'static,
{
    fn run(&self, input: I) -> Result<O, TransformError> {
        Transform::run(self, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Uppercase;
    impl Runnable<Lines, Lines> for Uppercase {
        fn run(&self, input: Lines) -> Result<Lines, TransformError> {
            Ok(input.into_iter().map(|l| l.to_uppercase()).collect())
        }
    }

    struct CountLines;
    impl Runnable<Lines, usize> for CountLines {
        fn run(&self, input: Lines) -> Result<usize, TransformError> {
            Ok(input.len())
        }
    }

    struct FailingStage;
    impl Runnable<Lines, Lines> for FailingStage {
        fn run(&self, _input: Lines) -> Result<Lines, TransformError> {
            Err(TransformError::stage("failing")(CompileError::UnexpectedClose {
                line: 3,
                close: "</ingredients>",
            }))
        }
    }

    fn lines(source: &str) -> Lines {
        source.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_transform_from_fn() {
        let transform = Transform::from_fn(|x: Lines| Ok(x.len()));
        assert_eq!(transform.run(lines("a\nb")).unwrap(), 2);
    }

    #[test]
    fn test_chained_stages() {
        let transform = Transform::from_fn(Ok).then(Uppercase).then(CountLines);
        assert_eq!(transform.run(lines("a\nb\nc")).unwrap(), 3);

        let upper = Transform::from_fn(Ok).then(Uppercase);
        assert_eq!(upper.run(lines("salt")).unwrap(), vec!["SALT".to_string()]);
    }

    #[test]
    fn test_error_propagation() {
        let transform = Transform::from_fn(Ok)
            .then(Uppercase)
            .then(FailingStage)
            .then(CountLines);

        let err = transform.run(lines("a")).unwrap_err();
        assert!(matches!(
            err,
            TransformError::StageFailed {
                stage: "failing",
                source: CompileError::UnexpectedClose { line: 3, .. }
            }
        ));
    }

    #[test]
    fn test_error_display() {
        let stage_err = TransformError::stage("ingredients")(CompileError::UnexpectedClose {
            line: 7,
            close: "</ingredients>",
        });
        assert_eq!(
            format!("{}", stage_err),
            "stage 'ingredients' failed: line 7: `</ingredients>` has no matching opening marker"
        );
        assert!(std::error::Error::source(&stage_err).is_some());
    }
}
