//! Sample-rate conversion scenarios.

mod common;

use common::{channel0, i16x8_from_channel0, i8_buffer};
use traceline_buffer::{SampleLayout, TimeBase, TimelineBuffer, TimelineError};
use traceline_dsp::{registry, resample};

const MHZ: TimeBase = TimeBase { step: 1, exponent: -6 };

#[test]
fn identity_conversion_preserves_samples() {
    let ramp: Vec<i16> = (0..1000).collect();
    let input = i16x8_from_channel0(&ramp, MHZ);

    let mut output = resample::prepare(&input, 1_000_000).unwrap();
    assert_eq!(output.sample_count(), 1000);
    assert!((output.rate_info().unwrap().ratio - 1.0).abs() < 1e-12);

    for table in [registry::scalar_table(), registry::simd_table()] {
        resample::convert_with(table, &input, &mut output).unwrap();
        assert_eq!(channel0(&output), ramp, "{}", table.name);
    }
}

#[test]
fn two_x_upsample_interpolates_midpoints() {
    let input = i16x8_from_channel0(&[0, 100, 200, 300], MHZ);
    let mut output = resample::prepare(&input, 2_000_000).unwrap();
    assert_eq!(output.sample_count(), 8);
    assert_eq!(output.time_base(), TimeBase::new(500, -9));

    let expected = [0i16, 50, 100, 150, 200, 250, 300, 300];
    for table in [registry::scalar_table(), registry::simd_table()] {
        resample::convert_with(table, &input, &mut output).unwrap();
        common::assert_lanes_close(&channel0(&output), &expected, 1, table.name);
    }
}

#[test]
fn non_integer_downsample() {
    let input = i16x8_from_channel0(&[0, 10, 20, 30, 40, 50, 60, 70, 80, 90], MHZ);
    let mut output = resample::prepare(&input, 300_000).unwrap();
    assert_eq!(output.sample_count(), 3);

    let expected = [0i16, 33, 67];
    for table in [registry::scalar_table(), registry::simd_table()] {
        resample::convert_with(table, &input, &mut output).unwrap();
        common::assert_lanes_close(&channel0(&output), &expected, 1, table.name);
    }
}

#[test]
fn analog_i8_float_path() {
    let input = i8_buffer(&[0, 100, -100, 0], 1, MHZ);
    let mut output = resample::prepare(&input, 2_000_000).unwrap();
    assert_eq!(output.sample_count(), 8);
    resample::convert(&input, &mut output).unwrap();

    let got = output.i8_samples().unwrap().to_vec();
    assert_eq!(got, vec![0, 50, 100, 0, -100, -50, 0, 0]);
}

#[test]
fn prepared_output_carries_plan_and_ratio() {
    let input = i16x8_from_channel0(&[0; 100], MHZ);
    let output = resample::prepare(&input, 800_000).unwrap();
    assert_eq!(output.sample_count(), 80);
    let plan = output.src_plan().unwrap();
    assert_eq!(plan.len(), 80);
    for e in plan {
        assert!(e.idx1 < 100);
        assert_eq!(e.frac_q16 + e.inv_frac_q16, 0x10000);
    }
    assert!((output.rate_info().unwrap().ratio - 0.8).abs() < 1e-12);
}

#[test]
fn too_short_input_is_empty_input() {
    let input = i16x8_from_channel0(&[7], MHZ);
    assert_eq!(
        resample::prepare(&input, 500_000).unwrap_err(),
        TimelineError::EmptyInput(1)
    );
}

#[test]
fn unsupported_layout_is_rejected() {
    let mut input = TimelineBuffer::new();
    input
        .allocate(16, 1, 32, 1, SampleLayout::AnalogF32)
        .unwrap();
    input.set_time_base(MHZ);
    let mut output = resample::prepare(&input, 500_000).unwrap();
    assert!(matches!(
        resample::convert(&input, &mut output),
        Err(TimelineError::BadShape(_))
    ));
}

#[test]
fn simd_convert_without_plan_is_rejected() {
    let input = i16x8_from_channel0(&[0, 1, 2, 3], MHZ);
    // An output allocated by hand, not by prepare: no plan attached.
    let mut output = TimelineBuffer::new();
    output
        .allocate(4, 8, 16, 16, SampleLayout::SimdI16x8)
        .unwrap();
    assert!(matches!(
        resample::convert(&input, &mut output),
        Err(TimelineError::BadShape(_))
    ));
}
