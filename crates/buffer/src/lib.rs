#![warn(missing_docs)]
#![warn(clippy::all)]

//! # Traceline Buffer
//!
//! Core in-memory types for multi-channel, fixed-rate, uniformly-sampled
//! numeric signals (audio, oscilloscope traces, instrumentation streams):
//!
//! - [`TimelineBuffer`] - an interleaved sample buffer with aligned storage
//!   and an engineering-unit time base
//! - [`SampleLayout`] - the closed set of supported sample layouts, including
//!   the SIMD-friendly 8-lane variants
//! - [`TimeBase`] - integer (step, decimal-exponent) time arithmetic
//! - [`PlanEntry`] / [`RateInfo`] - precomputed sample-rate-conversion state
//!   carried by a prepared output buffer
//! - [`TimelineError`] - the error taxonomy shared by the whole workspace
//!
//! This crate owns allocation and metadata invariants only; the conversion
//! and aggregation engines live in `traceline-dsp` and dispatch through
//! `traceline-simd-dispatch`.

mod buffer;
mod error;
mod layout;
mod plan;
mod storage;
mod timebase;

pub use buffer::TimelineBuffer;
pub use error::{Result, TimelineError};
pub use layout::SampleLayout;
pub use plan::{PlanEntry, RateInfo, Q16_ONE};
pub use storage::AlignedBytes;
pub use timebase::TimeBase;

/// Lane count of the SIMD sample layouts (one 128-bit register of `i16`).
pub const SIMD_LANES: usize = 8;
