//! Layout adapter: i8 ↔ 8-lane i16.

mod common;

use common::i8_buffer;
use traceline_buffer::{SampleLayout, TimeBase, TimelineBuffer, TimelineError, SIMD_LANES};
use traceline_dsp::adapter;

const MHZ: TimeBase = TimeBase { step: 1, exponent: -6 };

#[test]
fn prepared_destination_matches_source() {
    let src = i8_buffer(&[1, 2, 3, 4], 1, MHZ);
    let dst = adapter::prepare_i16x8_from_i8(&src).unwrap();
    assert_eq!(dst.layout(), SampleLayout::SimdI16x8);
    assert_eq!(dst.sample_count(), 4);
    assert_eq!(dst.channel_count(), 8);
    assert_eq!(dst.bytes_per_sample(), 16);
    assert_eq!(dst.time_base(), MHZ);
    assert_eq!(dst.bytes().as_ptr() as usize % 16, 0);
}

#[test]
fn widen_sign_extends() {
    let src = i8_buffer(&[-5, 127, -128, 0], 1, MHZ);
    let mut dst = adapter::prepare_i16x8_from_i8(&src).unwrap();
    adapter::widen_channel(&src, &mut dst, 0, 0).unwrap();

    let lanes = dst.i16_lanes().unwrap();
    assert_eq!(lanes[0], -5);
    assert_eq!(lanes[SIMD_LANES], 127);
    assert_eq!(lanes[2 * SIMD_LANES], -128);
    assert_eq!(lanes[3 * SIMD_LANES], 0);
    // Other lanes stay zero.
    assert_eq!(lanes[1], 0);
}

#[test]
fn widen_routes_channels_to_lanes() {
    // Two interleaved source channels land in two different lanes.
    let src = i8_buffer(&[10, -10, 20, -20], 2, MHZ);
    let mut dst = adapter::prepare_i16x8_from_i8(&src).unwrap();
    adapter::widen_channel(&src, &mut dst, 0, 0).unwrap();
    adapter::widen_channel(&src, &mut dst, 1, 5).unwrap();

    let lanes = dst.i16_lanes().unwrap();
    assert_eq!(lanes[0], 10);
    assert_eq!(lanes[5], -10);
    assert_eq!(lanes[SIMD_LANES], 20);
    assert_eq!(lanes[SIMD_LANES + 5], -20);
}

#[test]
fn narrow_truncates_lane_zero() {
    let src = i8_buffer(&[1, 2, 3], 1, MHZ);
    let mut wide = adapter::prepare_i16x8_from_i8(&src).unwrap();
    {
        let lanes = wide.i16_lanes_mut().unwrap();
        lanes[0] = 300; // 0x012C -> 0x2C
        lanes[SIMD_LANES] = -5;
        lanes[2 * SIMD_LANES] = 127;
    }
    let mut narrow = TimelineBuffer::new();
    narrow.allocate(3, 1, 8, 1, SampleLayout::AnalogI8).unwrap();
    adapter::narrow_to_i8(&wide, &mut narrow).unwrap();
    assert_eq!(narrow.i8_samples().unwrap(), &[44, -5, 127]);
}

#[test]
fn widen_then_narrow_round_trips_in_range() {
    let values: Vec<i8> = (-64..64).collect();
    let src = i8_buffer(&values, 1, MHZ);
    let mut wide = adapter::prepare_i16x8_from_i8(&src).unwrap();
    adapter::widen_channel(&src, &mut wide, 0, 0).unwrap();

    let mut back = TimelineBuffer::new();
    back.allocate(src.sample_count(), 1, 8, 1, SampleLayout::AnalogI8)
        .unwrap();
    adapter::narrow_to_i8(&wide, &mut back).unwrap();
    assert_eq!(back.i8_samples().unwrap(), values.as_slice());
}

#[test]
fn shape_errors() {
    let src = i8_buffer(&[1, 2], 1, MHZ);
    let mut dst = adapter::prepare_i16x8_from_i8(&src).unwrap();

    assert!(matches!(
        adapter::widen_channel(&src, &mut dst, 3, 0),
        Err(TimelineError::OutOfBounds { .. })
    ));
    assert!(matches!(
        adapter::widen_channel(&src, &mut dst, 0, 8),
        Err(TimelineError::OutOfBounds { .. })
    ));

    let shorter = i8_buffer(&[1], 1, MHZ);
    assert!(matches!(
        adapter::widen_channel(&shorter, &mut dst, 0, 0),
        Err(TimelineError::BadShape(_))
    ));
}
