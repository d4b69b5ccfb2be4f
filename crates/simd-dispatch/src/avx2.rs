//! AVX2 kernel bodies (x86_64).
//!
//! Samples stay in 128-bit registers (8 x i16); interpolation widens to a
//! 256-bit register of eight 32-bit lanes. The table below is only handed
//! out after a runtime AVX2 probe, which is what makes the safe wrappers
//! around the `#[target_feature]` bodies sound.

#![allow(clippy::missing_safety_doc)]

use core::arch::x86_64::*;

use traceline_buffer::{PlanEntry, Result, TimelineError, SIMD_LANES};

use crate::dispatcher::CpuFeatures;
use crate::kernel::KernelTable;
use crate::scalar;

pub(crate) static TABLE: KernelTable = KernelTable {
    name: "Intel AVX2 SIMD Backend",
    convert_i16x8: convert_i16x8_plan,
    aggregate_minmax_i8: aggregate_minmax_i8_avx2,
    aggregate_minmax_i16x8: aggregate_minmax_i16x8_avx2,
};

/// Plan-driven Q16 linear interpolation over 8-lane `i16` samples.
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
    debug_assert!(CpuFeatures::detect().has_avx2);
    debug_assert_eq!(src.as_ptr() as usize % 16, 0);
    debug_assert_eq!(dst.as_ptr() as usize % 16, 0);

    unsafe { convert_i16x8_plan_body(src, dst, plan) }
    Ok(())
}

#[target_feature(enable = "avx2")]
unsafe fn convert_i16x8_plan_body(src: &[i16], dst: &mut [i16], plan: &[PlanEntry]) {
    let round = _mm256_set1_epi32(1 << 15);
    for (i, e) in plan.iter().enumerate() {
        let v0 = _mm_loadu_si128(src.as_ptr().add(e.idx0 as usize * SIMD_LANES) as *const __m128i);
        let v1 = _mm_loadu_si128(src.as_ptr().add(e.idx1 as usize * SIMD_LANES) as *const __m128i);
        let v0w = _mm256_cvtepi16_epi32(v0);
        let v1w = _mm256_cvtepi16_epi32(v1);
        let inv = _mm256_set1_epi32(e.inv_frac_q16 as i32);
        let frac = _mm256_set1_epi32(e.frac_q16 as i32);

        // (v0 * inv + v1 * frac + 0x8000) >> 16
        let blend = _mm256_add_epi32(
            _mm256_mullo_epi32(v0w, inv),
            _mm256_mullo_epi32(v1w, frac),
        );
        let shifted = _mm256_srai_epi32::<16>(_mm256_add_epi32(blend, round));

        let lo = _mm256_castsi256_si128(shifted);
        let hi = _mm256_extracti128_si256::<1>(shifted);
        let packed = _mm_packs_epi32(lo, hi);
        _mm_storeu_si128(dst.as_mut_ptr().add(i * SIMD_LANES) as *mut __m128i, packed);
    }
}

/// Min/max reduction of one bin over interleaved `i8` samples.
///
/// Vectorized for the single-channel case only; interleaved multi-channel
/// buffers take the scalar per-channel strips.
fn aggregate_minmax_i8_avx2(
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
    debug_assert!(CpuFeatures::detect().has_avx2);

    let (min, max) = unsafe { minmax_i8_body(src, start, end) };
    out_min[bin] = min;
    out_max[bin] = max;
    Ok(())
}

#[target_feature(enable = "avx2")]
unsafe fn minmax_i8_body(src: &[i8], start: usize, end: usize) -> (i8, i8) {
    let mut min = i8::MAX;
    let mut max = i8::MIN;
    let mut j = start;

    let mut vmin = _mm_set1_epi8(i8::MAX);
    let mut vmax = _mm_set1_epi8(i8::MIN);
    while j + 16 <= end {
        let v = _mm_loadu_si128(src.as_ptr().add(j) as *const __m128i);
        vmin = _mm_min_epi8(vmin, v);
        vmax = _mm_max_epi8(vmax, v);
        j += 16;
    }
    let mut lanes_min = [0i8; 16];
    let mut lanes_max = [0i8; 16];
    _mm_storeu_si128(lanes_min.as_mut_ptr() as *mut __m128i, vmin);
    _mm_storeu_si128(lanes_max.as_mut_ptr() as *mut __m128i, vmax);
    for k in 0..16 {
        min = min.min(lanes_min[k]);
        max = max.max(lanes_max[k]);
    }
    // Scalar tail.
    while j < end {
        let v = src[j];
        min = min.min(v);
        max = max.max(v);
        j += 1;
    }
    (min, max)
}

/// Min/max reduction of one bin over 8-lane `i16` samples.
fn aggregate_minmax_i16x8_avx2(
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
    debug_assert!(CpuFeatures::detect().has_avx2);
    debug_assert_eq!(src.as_ptr() as usize % 16, 0);

    unsafe { minmax_i16x8_body(src, out_min, out_max, bin, start, end) }
    Ok(())
}

#[target_feature(enable = "avx2")]
unsafe fn minmax_i16x8_body(
    src: &[i16],
    out_min: &mut [i16],
    out_max: &mut [i16],
    bin: usize,
    start: usize,
    end: usize,
) {
    let mut vmin = _mm_set1_epi16(i16::MAX);
    let mut vmax = _mm_set1_epi16(i16::MIN);
    for j in start..end {
        let v = _mm_loadu_si128(src.as_ptr().add(j * SIMD_LANES) as *const __m128i);
        vmin = _mm_min_epi16(vmin, v);
        vmax = _mm_max_epi16(vmax, v);
    }
    _mm_storeu_si128(out_min.as_mut_ptr().add(bin * SIMD_LANES) as *mut __m128i, vmin);
    _mm_storeu_si128(out_max.as_mut_ptr().add(bin * SIMD_LANES) as *mut __m128i, vmax);
}
