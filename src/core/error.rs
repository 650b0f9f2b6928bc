//! Error types for the Arbor tree generator

use thiserror::Error;

/// Main error type for the crate
///
/// Topology errors (`PreconditionViolation`, `InvalidIndex`) mean a generator
/// issued a broken call sequence. They abort the whole tree; nothing is
/// committed to the sink.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{operation} needs {required} vertices in the buffer, found {available}")]
    PreconditionViolation {
        operation: &'static str,
        required: usize,
        available: usize,
    },

    #[error("index {index} is out of range for {vertex_count} vertices")]
    InvalidIndex { index: u32, vertex_count: usize },

    #[error("unsupported foliage style: {0}")]
    UnsupportedFoliageStyle(String),

    #[error("invalid tree parameter: {0}")]
    InvalidParameter(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
