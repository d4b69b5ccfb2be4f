//! Two-phase sample-rate conversion.
//!
//! `prepare` hoists every `f64` derivation out of the hot path: it computes
//! the rational resampling ratio from the input's integer time base, sizes
//! and allocates the output, normalizes the new time base onto the decimal
//! 3-grid, and precomputes the interpolation plan for the SIMD layout.
//! `convert` is then a tight per-sample loop behind a backend function table.

use tracing::debug;

use traceline_buffer::{
    PlanEntry, RateInfo, Result, SampleLayout, TimeBase, TimelineBuffer, TimelineError,
};
use traceline_simd_dispatch::{registry, KernelTable};

/// Derive and allocate a conversion output for `target_rate_hz`.
///
/// The output has the input's layout, channel count, and bit width; its
/// sample count is `floor(input_samples * ratio)` and its time base is the
/// normalized target interval. For [`SampleLayout::SimdI16x8`] inputs the
/// interpolation plan is built here and attached to the output.
///
/// Fails with [`TimelineError::EmptyInput`] when the input holds fewer than
/// two samples (linear interpolation needs a bracket).
pub fn prepare(input: &TimelineBuffer, target_rate_hz: u32) -> Result<TimelineBuffer> {
    if input.sample_count() < 2 {
        return Err(TimelineError::EmptyInput(input.sample_count()));
    }
    if target_rate_hz == 0 {
        return Err(TimelineError::BadShape("target rate must be positive"));
    }

    let ratio = input.time_base().rate_ratio(target_rate_hz);
    let out_samples = (input.sample_count() as f64 * ratio) as u32;

    let mut output = TimelineBuffer::new();
    output.allocate(
        out_samples,
        input.channel_count(),
        input.bit_width(),
        input.layout().required_alignment(),
        input.layout(),
    )?;
    output.set_time_base(TimeBase::from_interval(1.0 / target_rate_hz as f64));
    output.set_rate_info(RateInfo { ratio });

    if input.layout() == SampleLayout::SimdI16x8 {
        output.set_src_plan(build_plan(input.sample_count(), out_samples));
    }

    debug!(
        in_samples = input.sample_count(),
        out_samples,
        ratio,
        layout = ?input.layout(),
        "prepared sample-rate conversion"
    );
    Ok(output)
}

/// Convert `input` into a prepared `output` using the active backend.
pub fn convert(input: &TimelineBuffer, output: &mut TimelineBuffer) -> Result<()> {
    convert_with(registry::current(), input, output)
}

/// Convert `input` into a prepared `output` through an explicit kernel table.
pub fn convert_with(
    table: &KernelTable,
    input: &TimelineBuffer,
    output: &mut TimelineBuffer,
) -> Result<()> {
    match input.layout() {
        SampleLayout::AnalogI8 => convert_analog_i8(input, output),
        SampleLayout::SimdI16x8 => {
            let src = input.i16_lanes()?;
            let channels = input.channel_count();
            let out_samples = output.sample_count() as usize;
            let (dst, plan) = output.i16_lanes_with_plan_mut()?;
            if plan.len() != out_samples {
                return Err(TimelineError::BadShape(
                    "output carries no interpolation plan; run prepare first",
                ));
            }
            (table.convert_i16x8)(src, dst, channels, plan)
        }
        _ => Err(TimelineError::BadShape(
            "layout does not support sample-rate conversion",
        )),
    }
}

/// Build the per-output-sample interpolation plan.
///
/// Positions advance by the integer-derived `in/out` ratio. The source index
/// clamps to the last sample, so the final bracket may be degenerate
/// (`idx0 == idx1`) and identity conversion gets `frac_q16 = 0` on every
/// entry. A fraction that rounds to 1.0 saturates at `0xFFFF`, keeping
/// `inv_frac` in `[1, 0x10000]`.
pub fn build_plan(in_samples: u32, out_samples: u32) -> Box<[PlanEntry]> {
    debug_assert!(in_samples >= 2);
    let step = in_samples as f64 / out_samples as f64;
    (0..out_samples)
        .map(|i| {
            let pos = i as f64 * step;
            let idx0 = (pos as u32).min(in_samples - 1);
            let idx1 = (idx0 + 1).min(in_samples - 1);
            let frac_q16 = ((pos - idx0 as f64) * 65536.0).round() as u32;
            PlanEntry::new(idx0, idx1, frac_q16.min(0xFFFF))
        })
        .collect()
}

/// Scalar float path for interleaved `i8` buffers (no plan, no backend).
fn convert_analog_i8(input: &TimelineBuffer, output: &mut TimelineBuffer) -> Result<()> {
    if output.layout() != SampleLayout::AnalogI8
        || output.channel_count() != input.channel_count()
    {
        return Err(TimelineError::BadShape(
            "output shape does not match the i8 input",
        ));
    }
    let ratio = output
        .rate_info()
        .ok_or(TimelineError::BadShape(
            "output carries no rate info; run prepare first",
        ))?
        .ratio;

    let channels = input.channel_count() as usize;
    let in_samples = input.sample_count() as usize;
    if in_samples == 0 {
        return Err(TimelineError::EmptyInput(0));
    }
    let out_samples = output.sample_count() as usize;
    let src = input.i8_samples()?;
    let dst = output.i8_samples_mut()?;

    for i in 0..out_samples {
        let pos = i as f64 / ratio;
        let idx0 = (pos as usize).min(in_samples - 1);
        let idx1 = (idx0 + 1).min(in_samples - 1);
        let frac = pos - idx0 as f64;
        for ch in 0..channels {
            let v0 = src[idx0 * channels + ch] as f64;
            let v1 = src[idx1 * channels + ch] as f64;
            dst[i * channels + ch] = ((1.0 - frac) * v0 + frac * v1).round() as i8;
        }
    }
    Ok(())
}
