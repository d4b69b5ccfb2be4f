//! NEON kernel bodies (aarch64).
//!
//! One 128-bit register covers all 8 `i16` lanes of a sample, so every kernel
//! does exactly one load per input sample. NEON is baseline on aarch64; the
//! intrinsics need no runtime probe.

#![allow(clippy::missing_safety_doc)]

use core::arch::aarch64::*;

use traceline_buffer::{PlanEntry, Result, TimelineError, SIMD_LANES};

use crate::kernel::KernelTable;
use crate::scalar;

pub(crate) static TABLE: KernelTable = KernelTable {
    name: "Neon SIMD Backend",
    convert_i16x8: convert_i16x8_plan,
    aggregate_minmax_i8: aggregate_minmax_i8_neon,
    aggregate_minmax_i16x8: aggregate_minmax_i16x8_neon,
};

/// Plan-driven Q16 linear interpolation over 8-lane `i16` samples.
///
/// For each output sample: load the two bracketing input vectors, widen to
/// 32 bits, blend with the precomputed Q16 weights, shift back down with
/// rounding, narrow, store.
fn convert_i16x8_plan(src: &[i16], dst: &mut [i16], channels: u8, plan: &[PlanEntry]) -> Result<()> {
    if channels as usize != SIMD_LANES {
        return Err(TimelineError::BadShape("SIMD i16x8 kernels need 8 channels"));
    }
    let in_samples = src.len() / SIMD_LANES;
    let out_samples = dst.len() / SIMD_LANES;
    if in_samples < 2 {
        return Err(TimelineError::BadShape("interpolation needs 2 input samples"));
    }
    if plan.len() != out_samples {
        return Err(TimelineError::BadShape("plan length does not match output"));
    }
    if plan
        .iter()
        .any(|e| e.idx1 as usize >= in_samples || e.idx0 > e.idx1)
    {
        return Err(TimelineError::BadShape("plan references samples out of range"));
    }
    debug_assert_eq!(src.as_ptr() as usize % 16, 0);
    debug_assert_eq!(dst.as_ptr() as usize % 16, 0);

    unsafe {
        for (i, e) in plan.iter().enumerate() {
            let v0 = vld1q_s16(src.as_ptr().add(e.idx0 as usize * SIMD_LANES));
            let v1 = vld1q_s16(src.as_ptr().add(e.idx1 as usize * SIMD_LANES));
            let inv = e.inv_frac_q16 as i32;
            let frac = e.frac_q16 as i32;

            let lo = vmlaq_n_s32(
                vmulq_n_s32(vmovl_s16(vget_low_s16(v0)), inv),
                vmovl_s16(vget_low_s16(v1)),
                frac,
            );
            let hi = vmlaq_n_s32(
                vmulq_n_s32(vmovl_s16(vget_high_s16(v0)), inv),
                vmovl_s16(vget_high_s16(v1)),
                frac,
            );
            // Q16 -> Q0 with rounding, then narrow back to 16 bits.
            let out = vcombine_s16(
                vmovn_s32(vrshrq_n_s32::<16>(lo)),
                vmovn_s32(vrshrq_n_s32::<16>(hi)),
            );
            vst1q_s16(dst.as_mut_ptr().add(i * SIMD_LANES), out);
        }
    }
    Ok(())
}

/// Min/max reduction of one bin over interleaved `i8` samples.
///
/// Only the single-channel case is vectorized: with interleaved channels a
/// contiguous 16-byte load would mix channels, so multi-channel buffers take
/// the scalar per-channel strips.
fn aggregate_minmax_i8_neon(
    src: &[i8],
    out_min: &mut [i8],
    out_max: &mut [i8],
    channels: u8,
    bin: usize,
    start: usize,
    end: usize,
) -> Result<()> {
    if channels != 1 {
        return scalar::aggregate_minmax_i8(src, out_min, out_max, channels, bin, start, end);
    }
    if end > src.len() || bin >= out_min.len() || bin >= out_max.len() {
        return Err(TimelineError::BadShape("bin range exceeds buffer bounds"));
    }

    let mut min = i8::MAX;
    let mut max = i8::MIN;
    let mut j = start;
    unsafe {
        let mut vmin = vdupq_n_s8(i8::MAX);
        let mut vmax = vdupq_n_s8(i8::MIN);
        while j + 16 <= end {
            let v = vld1q_s8(src.as_ptr().add(j));
            vmin = vminq_s8(vmin, v);
            vmax = vmaxq_s8(vmax, v);
            j += 16;
        }
        min = min.min(vminvq_s8(vmin));
        max = max.max(vmaxvq_s8(vmax));
    }
    // Scalar tail.
    while j < end {
        let v = src[j];
        min = min.min(v);
        max = max.max(v);
        j += 1;
    }
    out_min[bin] = min;
    out_max[bin] = max;
    Ok(())
}

/// Min/max reduction of one bin over 8-lane `i16` samples: one vector
/// min/max per sample, one store per bin.
fn aggregate_minmax_i16x8_neon(
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
    debug_assert_eq!(src.as_ptr() as usize % 16, 0);

    unsafe {
        let mut vmin = vdupq_n_s16(i16::MAX);
        let mut vmax = vdupq_n_s16(i16::MIN);
        for j in start..end {
            let v = vld1q_s16(src.as_ptr().add(j * SIMD_LANES));
            vmin = vminq_s16(vmin, v);
            vmax = vmaxq_s16(vmax, v);
        }
        vst1q_s16(out_min.as_mut_ptr().add(bin * SIMD_LANES), vmin);
        vst1q_s16(out_max.as_mut_ptr().add(bin * SIMD_LANES), vmax);
    }
    Ok(())
}
