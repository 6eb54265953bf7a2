//! Error types for the subdiv-petite crate.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;

/// Main error type for subdiv-petite operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed face/vertex data.
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    /// A coarse vertex buffer disagrees with the topology it is set on.
    #[error("Coarse buffer size mismatch: expected {expected} floats, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// An operation was invoked out of the required order.
    #[error("Not ready: {0}")]
    NotReady(String),

    /// Subdivision produced degenerate output or could not allocate its
    /// resources.
    #[error("Refinement failed: {0}")]
    RefinementFailure(String),

    /// An argument is outside its valid range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid buffer size.
    #[error("Invalid buffer size: expected {expected}, got {actual}")]
    InvalidBufferSize { expected: usize, actual: usize },

    /// Index out of bounds.
    #[error("Index {index} out of bounds (max: {max})")]
    IndexOutOfBounds { index: usize, max: usize },

    /// IO error for file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Format error for export operations.
    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Result type alias using our Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse classification of an [`Error`].
///
/// This is what gets handed to an
/// [`ErrorSink`](crate::osdutil::ErrorSink) together with the message. The
/// integer codes are stable.
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
pub enum ErrorKind {
    InvalidTopology = 1,
    SizeMismatch,
    NotReady,
    RefinementFailure,
    InvalidArgument,
    Io,
}

impl Error {
    /// Returns the [`ErrorKind`] this error is reported as.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidTopology(_) => ErrorKind::InvalidTopology,
            Error::SizeMismatch { .. } | Error::InvalidBufferSize { .. } => {
                ErrorKind::SizeMismatch
            }
            Error::NotReady(_) => ErrorKind::NotReady,
            Error::RefinementFailure(_) => ErrorKind::RefinementFailure,
            Error::InvalidArgument(_) | Error::IndexOutOfBounds { .. } => {
                ErrorKind::InvalidArgument
            }
            Error::Io(_) | Error::Format(_) => ErrorKind::Io,
        }
    }
}
