//! Min/max aggregation: downsample an input window to a fixed number of
//! per-channel extreme pairs for plotting.

use tracing::debug;

use traceline_buffer::{Result, SampleLayout, TimelineBuffer, TimelineError};
use traceline_simd_dispatch::{registry, KernelTable};

/// Allocate the min and max output buffers for `bin_count` bins.
///
/// Both outputs share the input's layout, channel count, bit width, and time
/// base; each holds one sample per bin.
pub fn prepare(
    input: &TimelineBuffer,
    bin_count: u32,
) -> Result<(TimelineBuffer, TimelineBuffer)> {
    if !supports(input.layout()) {
        return Err(TimelineError::BadShape(
            "layout does not support min/max aggregation",
        ));
    }
    let allocate_out = || -> Result<TimelineBuffer> {
        let mut out = TimelineBuffer::new();
        out.allocate(
            bin_count,
            input.channel_count(),
            input.bit_width(),
            input.layout().required_alignment(),
            input.layout(),
        )?;
        out.set_time_base(input.time_base());
        Ok(out)
    };
    let out_min = allocate_out()?;
    let out_max = allocate_out()?;
    debug!(bin_count, layout = ?input.layout(), "prepared min/max aggregation");
    Ok((out_min, out_max))
}

/// Aggregate `in_samples` samples starting at `in_offset` using the active
/// backend. `in_samples == 0` means the whole buffer.
pub fn aggregate(
    input: &TimelineBuffer,
    out_min: &mut TimelineBuffer,
    out_max: &mut TimelineBuffer,
    in_samples: u32,
    in_offset: u32,
) -> Result<()> {
    aggregate_with(registry::current(), input, out_min, out_max, in_samples, in_offset)
}

/// Aggregate through an explicit kernel table.
///
/// The window is partitioned into `bin_count` equal sub-ranges with an `f64`
/// stride; degenerate sub-ranges are widened to one sample and clamped to the
/// window, so every bin reduces at least one sample. Bins are filled in
/// ascending order.
pub fn aggregate_with(
    table: &KernelTable,
    input: &TimelineBuffer,
    out_min: &mut TimelineBuffer,
    out_max: &mut TimelineBuffer,
    in_samples: u32,
    in_offset: u32,
) -> Result<()> {
    if !supports(input.layout()) {
        return Err(TimelineError::BadShape(
            "layout does not support min/max aggregation",
        ));
    }
    if out_min.layout() != input.layout()
        || out_max.layout() != input.layout()
        || out_min.channel_count() != input.channel_count()
        || out_max.channel_count() != input.channel_count()
    {
        return Err(TimelineError::BadShape(
            "aggregation outputs do not match the input shape",
        ));
    }
    if out_min.sample_count() != out_max.sample_count() {
        return Err(TimelineError::BadShape("min and max bin counts differ"));
    }

    let bins = out_min.sample_count() as usize;
    if bins == 0 {
        return Ok(());
    }
    let in_samples = if in_samples > 0 {
        in_samples
    } else {
        input.sample_count()
    };
    if in_samples == 0 {
        return Err(TimelineError::EmptyInput(input.sample_count()));
    }
    if in_offset as u64 + in_samples as u64 > input.sample_count() as u64 {
        return Err(TimelineError::OutOfBounds {
            sample: in_offset.saturating_add(in_samples),
            channel: 0,
            samples: input.sample_count(),
            channels: input.channel_count(),
        });
    }

    let offset = in_offset as usize;
    let window = in_samples as usize;
    let stride = window as f64 / bins as f64;
    let channels = input.channel_count();

    match input.layout() {
        SampleLayout::AnalogI8 => {
            let src = input.i8_samples()?;
            let min = out_min.i8_samples_mut()?;
            let max = out_max.i8_samples_mut()?;
            for i in 0..bins {
                let (start, end) = bin_range(offset, window, stride, i);
                (table.aggregate_minmax_i8)(src, min, max, channels, i, start, end)?;
            }
        }
        SampleLayout::SimdI16x8 => {
            let src = input.i16_lanes()?;
            let min = out_min.i16_lanes_mut()?;
            let max = out_max.i16_lanes_mut()?;
            for i in 0..bins {
                let (start, end) = bin_range(offset, window, stride, i);
                (table.aggregate_minmax_i16x8)(src, min, max, channels, i, start, end)?;
            }
        }
        _ => unreachable!("layout support checked above"),
    }
    Ok(())
}

fn supports(layout: SampleLayout) -> bool {
    matches!(layout, SampleLayout::AnalogI8 | SampleLayout::SimdI16x8)
}

/// Stable derivation of one bin's sample range.
fn bin_range(offset: usize, window: usize, stride: f64, bin: usize) -> (usize, usize) {
    let start = offset + (bin as f64 * stride).floor() as usize;
    let mut end = offset + ((bin as f64 + 1.0) * stride).floor() as usize;
    if end <= start {
        end = start + 1;
    }
    (start, end.min(offset + window))
}
