//! Error types for engine operations and external collaborators.

use thiserror::Error;

use crate::model::{AnnotationId, PatchError};

/// Errors a host can act on. Expected gesture outcomes (degenerate shapes,
/// empty text, stray pointer events) are not errors and never show up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// No annotation with this ID exists in the current session
    #[error("Annotation not found: {0}")]
    AnnotationNotFound(AnnotationId),

    /// The operation needs a loaded image
    #[error("No image loaded")]
    NoImageLoaded,

    /// Image descriptor with unusable dimensions
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidImage {
        /// Reported width
        width: u32,
        /// Reported height
        height: u32,
    },

    /// Annotation patch does not fit the annotation's type or is invalid
    #[error(transparent)]
    Patch(#[from] PatchError),
}

/// Failure reported by the detection inference service.
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The service could not be reached
    #[error("Request failed: {0}")]
    Transport(String),

    /// The service answered with an error status or message
    #[error("Service error: {0}")]
    Service(String),

    /// The response body could not be decoded
    #[error("Malformed response: {0}")]
    Response(#[from] serde_json::Error),
}
