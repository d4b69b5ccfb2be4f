//! Conversion between scalar `i8` buffers and the 8-lane `i16` SIMD layout.
//!
//! Widening copies one source channel into one lane per sample,
//! sign-extending the analog value; narrowing truncates lane 0 back to `i8`.
//! Clipping on the narrow path is the caller's responsibility.

use traceline_buffer::{Result, SampleLayout, TimelineBuffer, TimelineError, SIMD_LANES};

/// Allocate a [`SampleLayout::SimdI16x8`] destination matching `src`.
///
/// The destination has the full 8 lanes, a 16-byte stride, 16-byte
/// alignment, the source's sample count and time base, and zeroed lanes.
pub fn prepare_i16x8_from_i8(src: &TimelineBuffer) -> Result<TimelineBuffer> {
    if src.layout() != SampleLayout::AnalogI8 {
        return Err(TimelineError::BadShape("widening expects an AnalogI8 source"));
    }
    let mut dst = TimelineBuffer::new();
    dst.allocate(
        src.sample_count(),
        SIMD_LANES as u8,
        16,
        16,
        SampleLayout::SimdI16x8,
    )?;
    dst.set_time_base(src.time_base());
    Ok(dst)
}

/// Copy `src_channel` of every sample into lane `dst_channel` of `dst`,
/// sign-extending `i8` to `i16`.
pub fn widen_channel(
    src: &TimelineBuffer,
    dst: &mut TimelineBuffer,
    src_channel: u8,
    dst_channel: u8,
) -> Result<()> {
    if src.layout() != SampleLayout::AnalogI8 || dst.layout() != SampleLayout::SimdI16x8 {
        return Err(TimelineError::BadShape(
            "widening goes from AnalogI8 to SimdI16x8",
        ));
    }
    if dst.sample_count() != src.sample_count() {
        return Err(TimelineError::BadShape("sample counts differ"));
    }
    if src_channel >= src.channel_count() {
        return Err(TimelineError::OutOfBounds {
            sample: 0,
            channel: src_channel,
            samples: src.sample_count(),
            channels: src.channel_count(),
        });
    }
    if dst_channel as usize >= SIMD_LANES {
        return Err(TimelineError::OutOfBounds {
            sample: 0,
            channel: dst_channel,
            samples: dst.sample_count(),
            channels: SIMD_LANES as u8,
        });
    }

    let channels = src.channel_count() as usize;
    let samples = src.sample_count() as usize;
    let s = src.i8_samples()?;
    let d = dst.i16_lanes_mut()?;
    for i in 0..samples {
        d[i * SIMD_LANES + dst_channel as usize] = s[i * channels + src_channel as usize] as i16;
    }
    Ok(())
}

/// Truncate lane 0 of every `src` sample into `dst`.
pub fn narrow_to_i8(src: &TimelineBuffer, dst: &mut TimelineBuffer) -> Result<()> {
    if src.layout() != SampleLayout::SimdI16x8 || dst.layout() != SampleLayout::AnalogI8 {
        return Err(TimelineError::BadShape(
            "narrowing goes from SimdI16x8 to AnalogI8",
        ));
    }
    if dst.sample_count() != src.sample_count() {
        return Err(TimelineError::BadShape("sample counts differ"));
    }

    let channels = dst.channel_count() as usize;
    let samples = src.sample_count() as usize;
    let s = src.i16_lanes()?;
    let d = dst.i8_samples_mut()?;
    for i in 0..samples {
        d[i * channels] = s[i * SIMD_LANES] as i8;
    }
    Ok(())
}
