//! Error types.

use thiserror::Error;

pub use crate::path_parser::ParseError;

/// Used for the [`crate::transform::ValidTransform`] type.
///
/// This generally represents an error from [`crate::transform::ValidTransform::try_from`],
/// which is what we use to check affine transforms for validity before inverting them.
#[derive(Debug, PartialEq)]
pub struct InvalidTransform;

impl std::fmt::Display for InvalidTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "transform is not invertible")
    }
}

impl std::error::Error for InvalidTransform {}

/// Errors from appending raw command data to a [`crate::path_builder::PathStream`].
///
/// These indicate a bug in the caller that produced the command buffer, not bad
/// input data; the stream is left unchanged when they are returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StreamError {
    /// A command was given the wrong number of operands.
    #[error("command {command:?} takes {expected} operands, got {got}")]
    OperandCount {
        command: char,
        expected: usize,
        got: usize,
    },

    /// A raw tag does not correspond to any command.
    #[error("unknown command tag {0}")]
    UnexpectedTag(u8),

    /// Arc operands that would not replay as the same arc.
    #[error("invalid arc: {0}")]
    InvalidArc(&'static str),
}

/// Errors from producing frames of a [`crate::morph::Morph`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MorphError {
    /// The morph was aborted; it has to be planned again before producing frames.
    #[error("morph was aborted")]
    Aborted,

    /// The time parameter is NaN.
    #[error("invalid morph time {0}")]
    InvalidTime(f64),
}
