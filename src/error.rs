//! Error types.

use std::io;

/// Errors returned at the library boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two matrix operands have incompatible shapes for `op`.
    #[error("dimension mismatch in {op}: {}x{} vs {}x{}", .left.0, .left.1, .right.0, .right.1)]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("invalid learning rate: {0}")]
    InvalidLearningRate(f64),

    #[error("input has {actual} values, input layer has {expected} units")]
    InputSize { expected: usize, actual: usize },

    #[error("target has {actual} values, output layer has {expected} units")]
    TargetSize { expected: usize, actual: usize },

    #[error("target is not set")]
    TargetNotSet,

    #[error(transparent)]
    Io(#[from] io::Error),

    /// A persisted model could not be parsed.
    #[error("malformed model ({section}): {reason}")]
    MalformedModel { section: String, reason: String },
}

impl Error {
    pub(crate) fn malformed<S, R>(section: S, reason: R) -> Self
    where
        S: Into<String>,
        R: Into<String>,
    {
        Error::MalformedModel {
            section: section.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
