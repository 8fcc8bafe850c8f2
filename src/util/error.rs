//! Error types for detpipe.

use thiserror::Error;

/// Result alias for detpipe operations.
pub type DetPipeResult<T> = std::result::Result<T, DetPipeError>;

/// Errors that can occur while post-processing detector output.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DetPipeError {
    /// A buffer or sequence does not have the length the layout requires.
    #[error("invalid shape for {context}: expected {expected}, got {got}")]
    InvalidShape {
        expected: usize,
        got: usize,
        context: &'static str,
    },
    /// The tensor shape has an unsupported number of axes.
    #[error("unsupported tensor rank {rank} (expected 2 or 3)")]
    InvalidTensorRank { rank: usize },
    /// The tensor carries more than one batch entry.
    #[error("unsupported batch size {batch} (expected 1)")]
    UnsupportedBatch { batch: usize },
    /// A configuration value is out of range.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Image dimensions must be non-zero.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// A class id escaped the filter; indicates a bug, not bad input.
    #[error("invariant violated: class id {class_id} >= {num_classes}")]
    InvariantViolation { class_id: usize, num_classes: usize },
    /// The class name table length disagrees with the configured class count.
    #[error("class table has {got} names, expected {expected}")]
    ClassTableMismatch { expected: usize, got: usize },
    /// Image decoding or I/O failed.
    #[error("image I/O error: {reason}")]
    ImageIo { reason: String },
    /// The inference backend reported a failure.
    #[error("backend error: {reason}")]
    Backend { reason: String },
}
