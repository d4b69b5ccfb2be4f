//! Error taxonomy shared by the traceline workspace.

use thiserror::Error;

/// Errors raised by buffer operations, backend kernels, and the conversion
/// and aggregation engines.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TimelineError {
    /// Aligned allocation failed.
    #[error("aligned allocation of {size} bytes (align {align}) failed")]
    AllocFailed {
        /// Requested size in bytes.
        size: usize,
        /// Requested alignment in bytes.
        align: usize,
    },

    /// A typed accessor was used on a buffer with a different bit width.
    #[error("accessor expects {requested}-bit samples, buffer holds {actual}-bit samples")]
    TypeMismatch {
        /// Bit width the accessor decodes.
        requested: u8,
        /// Bit width of the buffer.
        actual: u8,
    },

    /// A sample or channel index is beyond the declared counts.
    #[error("sample {sample} channel {channel} out of bounds ({samples} samples, {channels} channels)")]
    OutOfBounds {
        /// Requested sample index.
        sample: u32,
        /// Requested channel index.
        channel: u8,
        /// Number of valid samples.
        samples: u32,
        /// Number of channels per sample.
        channels: u8,
    },

    /// A kernel or engine was invoked on a shape it does not support.
    #[error("unsupported shape: {0}")]
    BadShape(&'static str),

    /// `set_backend` was called with an unknown index.
    #[error("backend index {0} is out of range")]
    InvalidBackend(u8),

    /// Interpolation needs at least two input samples.
    #[error("input holds {0} samples, interpolation needs at least 2")]
    EmptyInput(u32),
}

/// Convenience alias used across the workspace.
pub type Result<T> = core::result::Result<T, TimelineError>;
