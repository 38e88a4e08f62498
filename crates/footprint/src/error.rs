//! Error types for footprint extraction.

use thiserror::Error;

/// Failure reported by a pixel-to-world collaborator.
pub type MappingError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Geometry-construction failures. Refinement non-convergence is not an error;
/// it is reported on `refine::Refinement`.
#[derive(Error, Debug)]
pub enum FootprintError {
    #[error("insufficient data: {found} finite samples, need at least 3")]
    InsufficientData { found: usize },

    #[error("degenerate input: {reason}")]
    DegenerateInput { reason: String },

    #[error("pixel-to-world mapping failed: {0}")]
    Mapping(#[source] MappingError),

    #[error("pixel-to-world mapping returned {got} points, expected {expected}")]
    MappingLength { expected: usize, got: usize },
}

impl FootprintError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        FootprintError::DegenerateInput {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FootprintError>;
