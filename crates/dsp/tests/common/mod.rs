//! Shared helpers for the engine tests.

#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use traceline_buffer::{SampleLayout, TimeBase, TimelineBuffer, SIMD_LANES};

/// An allocated, zeroed 8-lane `i16` buffer.
pub fn i16x8_buffer(samples: u32, time: TimeBase) -> TimelineBuffer {
    let mut buf = TimelineBuffer::new();
    buf.allocate(samples, 8, 16, 16, SampleLayout::SimdI16x8)
        .unwrap();
    buf.set_time_base(time);
    buf
}

/// An 8-lane buffer with channel 0 populated and the other lanes zero.
pub fn i16x8_from_channel0(values: &[i16], time: TimeBase) -> TimelineBuffer {
    let mut buf = i16x8_buffer(values.len() as u32, time);
    let lanes = buf.i16_lanes_mut().unwrap();
    for (i, &v) in values.iter().enumerate() {
        lanes[i * SIMD_LANES] = v;
    }
    buf
}

/// Channel 0 of an 8-lane buffer.
pub fn channel0(buf: &TimelineBuffer) -> Vec<i16> {
    let lanes = buf.i16_lanes().unwrap();
    (0..buf.sample_count() as usize)
        .map(|i| lanes[i * SIMD_LANES])
        .collect()
}

/// An interleaved `i8` buffer populated from `values`.
pub fn i8_buffer(values: &[i8], channels: u8, time: TimeBase) -> TimelineBuffer {
    assert_eq!(values.len() % channels as usize, 0);
    let mut buf = TimelineBuffer::new();
    buf.allocate(
        (values.len() / channels as usize) as u32,
        channels,
        8,
        1,
        SampleLayout::AnalogI8,
    )
    .unwrap();
    buf.set_time_base(time);
    buf.i8_samples_mut().unwrap().copy_from_slice(values);
    buf
}

/// A seeded pseudo-random 8-lane buffer with all lanes in `lo..=hi`.
pub fn random_i16x8(samples: u32, seed: u64, lo: i16, hi: i16, time: TimeBase) -> TimelineBuffer {
    let mut buf = i16x8_buffer(samples, time);
    let mut rng = StdRng::seed_from_u64(seed);
    for lane in buf.i16_lanes_mut().unwrap() {
        *lane = rng.gen_range(lo..=hi);
    }
    buf
}

/// A deterministic multi-lane sine pattern, lanes phase-shifted by 1/8 of
/// a sample like a probe head's staggered channels.
pub fn sine_i16x8(samples: u32, period: f32, amplitude: f32, time: TimeBase) -> TimelineBuffer {
    let mut buf = i16x8_buffer(samples, time);
    let lanes = buf.i16_lanes_mut().unwrap();
    for i in 0..samples as usize {
        for ch in 0..SIMD_LANES {
            let t = (i as f32 + ch as f32 / 8.0) / period;
            let v = amplitude * (std::f32::consts::TAU * t).sin();
            lanes[i * SIMD_LANES + ch] = v.clamp(-32768.0, 32767.0) as i16;
        }
    }
    buf
}

/// Assert two lane slices agree within `tol` LSB.
pub fn assert_lanes_close(a: &[i16], b: &[i16], tol: i32, context: &str) {
    assert_eq!(a.len(), b.len(), "{context}: lengths differ");
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        assert!(
            (*x as i32 - *y as i32).abs() <= tol,
            "{context}: lane {i}: {x} vs {y}"
        );
    }
}
