//! Scalar reference kernels.
//!
//! These back the `"C Backend"` table and double as the `"Fallback C
//! Backend"` body of the SIMD table on targets without a vector ISA. They are
//! the semantic reference: every SIMD kernel must agree with them bit-exactly
//! for min/max and within ±1 LSB for sample-rate conversion.

use traceline_buffer::{PlanEntry, Result, TimelineError, SIMD_LANES};

use crate::kernel::KernelTable;

/// Scalar reference backend, selected by index 0.
pub static TABLE: KernelTable = KernelTable {
    name: "C Backend",
    convert_i16x8: convert_i16x8_bresenham,
    aggregate_minmax_i8: aggregate_minmax_i8,
    aggregate_minmax_i16x8: aggregate_minmax_i16x8,
};

/// The SIMD-table body used when no vector ISA is available.
pub static FALLBACK_TABLE: KernelTable = KernelTable {
    name: "Fallback C Backend",
    convert_i16x8: convert_i16x8_bresenham,
    aggregate_minmax_i8: aggregate_minmax_i8,
    aggregate_minmax_i16x8: aggregate_minmax_i16x8,
};

/// Bresenham-style sample-rate conversion for the 8-lane `i16` layout.
///
/// An integer accumulator advances the source index without per-sample
/// division; the accumulator is drained completely each step so the fraction
/// stays in `[0, 1]` for any ratio, and it saturates once the source index
/// reaches the final segment so trailing outputs replicate the last sample.
pub fn convert_i16x8_bresenham(
    src: &[i16],
    dst: &mut [i16],
    channels: u8,
    _plan: &[PlanEntry],
) -> Result<()> {
    if channels as usize != SIMD_LANES {
        return Err(TimelineError::BadShape("SIMD i16x8 kernels need 8 channels"));
    }
    let in_samples = src.len() / SIMD_LANES;
    let out_samples = dst.len() / SIMD_LANES;
    if in_samples < 2 {
        return Err(TimelineError::BadShape("interpolation needs 2 input samples"));
    }

    let step = in_samples as u64;
    let scale = out_samples as u64;
    let mut acc: u64 = 0;
    let mut idx0: usize = 0;

    for i in 0..out_samples {
        let idx1 = (idx0 + 1).min(in_samples - 1);
        let frac = acc as f64 / scale as f64;
        for lane in 0..SIMD_LANES {
            let v0 = src[idx0 * SIMD_LANES + lane] as f64;
            let v1 = src[idx1 * SIMD_LANES + lane] as f64;
            dst[i * SIMD_LANES + lane] = ((1.0 - frac) * v0 + frac * v1).round() as i16;
        }
        acc += step;
        while acc >= scale && idx0 < in_samples - 2 {
            idx0 += 1;
            acc -= scale;
        }
        if acc > scale {
            // Final segment: saturate so frac tops out at 1.0.
            acc = scale;
        }
    }
    Ok(())
}

/// Per-channel min/max reduction of one bin over interleaved `i8` samples.
pub fn aggregate_minmax_i8(
    src: &[i8],
    out_min: &mut [i8],
    out_max: &mut [i8],
    channels: u8,
    bin: usize,
    start: usize,
    end: usize,
) -> Result<()> {
    if channels == 0 {
        return Err(TimelineError::BadShape("channel count must be at least 1"));
    }
    let ch = channels as usize;
    if end * ch > src.len() || (bin + 1) * ch > out_min.len() || (bin + 1) * ch > out_max.len() {
        return Err(TimelineError::BadShape("bin range exceeds buffer bounds"));
    }
    for c in 0..ch {
        let mut min = i8::MAX;
        let mut max = i8::MIN;
        for j in start..end {
            let v = src[j * ch + c];
            min = min.min(v);
            max = max.max(v);
        }
        out_min[bin * ch + c] = min;
        out_max[bin * ch + c] = max;
    }
    Ok(())
}

/// Min/max reduction of one bin over 8-lane `i16` samples.
///
/// All 8 lanes are reduced and written, including inactive zero lanes.
pub fn aggregate_minmax_i16x8(
    src: &[i16],
    out_min: &mut [i16],
    out_max: &mut [i16],
    channels: u8,
    bin: usize,
    start: usize,
    end: usize,
) -> Result<()> {
    if channels as usize != SIMD_LANES {
        return Err(TimelineError::BadShape("SIMD i16x8 kernels need 8 channels"));
    }
    if end * SIMD_LANES > src.len()
        || (bin + 1) * SIMD_LANES > out_min.len()
        || (bin + 1) * SIMD_LANES > out_max.len()
    {
        return Err(TimelineError::BadShape("bin range exceeds buffer bounds"));
    }
    for lane in 0..SIMD_LANES {
        let mut min = i16::MAX;
        let mut max = i16::MIN;
        for j in start..end {
            let v = src[j * SIMD_LANES + lane];
            min = min.min(v);
            max = max.max(v);
        }
        out_min[bin * SIMD_LANES + lane] = min;
        out_max[bin * SIMD_LANES + lane] = max;
    }
    Ok(())
}
