//! Kernel signatures and the per-backend function table.

use traceline_buffer::{PlanEntry, Result};

/// Sample-rate conversion over the 8-lane `i16` layout.
///
/// `src` and `dst` are flat lane slices (8 lanes per sample); `plan` is the
/// precomputed interpolation plan of the output buffer. Plan-driven kernels
/// require `plan.len()` to equal the output sample count; the Bresenham
/// reference kernel derives its positions from the slice lengths and ignores
/// the plan.
pub type ConvertI16x8Fn = fn(src: &[i16], dst: &mut [i16], channels: u8, plan: &[PlanEntry]) -> Result<()>;

/// Min/max reduction of one bin over interleaved `i8` samples.
///
/// Reduces samples `start..end` of `src` per channel and writes the extremes
/// to slot `bin` of `out_min` / `out_max`.
pub type AggregateMinMaxI8Fn = fn(
    src: &[i8],
    out_min: &mut [i8],
    out_max: &mut [i8],
    channels: u8,
    bin: usize,
    start: usize,
    end: usize,
) -> Result<()>;

/// Min/max reduction of one bin over 8-lane `i16` samples.
pub type AggregateMinMaxI16x8Fn = fn(
    src: &[i16],
    out_min: &mut [i16],
    out_max: &mut [i16],
    channels: u8,
    bin: usize,
    start: usize,
    end: usize,
) -> Result<()>;

/// One backend's kernels, typed per sample layout.
///
/// Tables are `'static`; the registry hands out references and the engines
/// dispatch through the function pointers.
#[derive(Debug, Clone, Copy)]
pub struct KernelTable {
    /// Human-readable backend name.
    pub name: &'static str,
    /// SRC kernel for [`traceline_buffer::SampleLayout::SimdI16x8`].
    pub convert_i16x8: ConvertI16x8Fn,
    /// Min/max kernel for [`traceline_buffer::SampleLayout::AnalogI8`].
    pub aggregate_minmax_i8: AggregateMinMaxI8Fn,
    /// Min/max kernel for [`traceline_buffer::SampleLayout::SimdI16x8`].
    pub aggregate_minmax_i16x8: AggregateMinMaxI16x8Fn,
}
