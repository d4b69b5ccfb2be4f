//! The timeline buffer: aligned storage plus the metadata that gives the
//! bytes a meaning (channels, bit width, layout, time base).

use crate::error::{Result, TimelineError};
use crate::layout::SampleLayout;
use crate::plan::{PlanEntry, RateInfo};
use crate::storage::AlignedBytes;
use crate::timebase::TimeBase;
use crate::SIMD_LANES;

/// One contiguous, interleaved, fixed-rate sample stream.
///
/// A buffer is created empty, allocated once with a definite layout,
/// populated (externally or by a converter), and eventually freed or dropped.
/// Prepared conversion outputs additionally carry an interpolation plan and a
/// rate-ratio snapshot, both released together with the buffer.
///
/// # Example
///
/// ```
/// use traceline_buffer::{SampleLayout, TimeBase, TimelineBuffer};
///
/// let mut buf = TimelineBuffer::new();
/// buf.allocate(1024, 8, 16, 16, SampleLayout::SimdI16x8).unwrap();
/// buf.set_time_base(TimeBase::new(1, -6));
/// assert_eq!(buf.bytes_per_sample(), 16);
/// assert_eq!(buf.buffer_size(), 1024 * 16);
/// ```
#[derive(Debug, Default)]
pub struct TimelineBuffer {
    sample_count: u32,
    channel_count: u8,
    bit_width: u8,
    bytes_per_sample: u8,
    layout: SampleLayout,
    time: TimeBase,
    storage: Option<AlignedBytes>,
    src_plan: Option<Box<[PlanEntry]>>,
    rate_info: Option<RateInfo>,
}

impl TimelineBuffer {
    /// Create an empty buffer with zeroed metadata and no storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate storage for `sample_count` samples of the given shape.
    ///
    /// The stride is derived from the layout (`ceil(channels * bit_width / 8)`
    /// bytes, or the fixed register width for SIMD layouts) and the region is
    /// zero-initialized, so unused SIMD lanes start out as zero lanes.
    /// `alignment` is raised to the layout's minimum if it is lower.
    ///
    /// Any previous storage, plan, and rate info are released first.
    pub fn allocate(
        &mut self,
        sample_count: u32,
        channel_count: u8,
        bit_width: u8,
        alignment: u8,
        layout: SampleLayout,
    ) -> Result<()> {
        if channel_count == 0 {
            return Err(TimelineError::BadShape("channel count must be at least 1"));
        }
        if layout.is_simd() && channel_count as usize > SIMD_LANES {
            return Err(TimelineError::BadShape(
                "SIMD layouts hold at most 8 channels",
            ));
        }
        if bit_width != layout.bit_width() {
            return Err(TimelineError::TypeMismatch {
                requested: bit_width,
                actual: layout.bit_width(),
            });
        }

        let bytes_per_sample = layout
            .bytes_per_sample(channel_count)
            .ok_or(TimelineError::BadShape("sample stride exceeds 255 bytes"))?;
        let size = sample_count as usize * bytes_per_sample as usize;
        let align = alignment.max(layout.required_alignment()) as usize;
        let storage = AlignedBytes::zeroed(size, align)?;

        self.sample_count = sample_count;
        self.channel_count = channel_count;
        self.bit_width = bit_width;
        self.bytes_per_sample = bytes_per_sample;
        self.layout = layout;
        self.storage = Some(storage);
        self.src_plan = None;
        self.rate_info = None;
        Ok(())
    }

    /// Release storage, plan, and rate info and reset all metadata.
    ///
    /// The buffer returns to its freshly-initialized state and may be
    /// allocated again, e.g. when the target pixel width changes.
    pub fn free(&mut self) {
        *self = Self::default();
    }

    /// Number of valid samples.
    #[inline]
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Channels per sample.
    #[inline]
    pub fn channel_count(&self) -> u8 {
        self.channel_count
    }

    /// Bits per channel value.
    #[inline]
    pub fn bit_width(&self) -> u8 {
        self.bit_width
    }

    /// Stride in bytes between consecutive samples.
    #[inline]
    pub fn bytes_per_sample(&self) -> u8 {
        self.bytes_per_sample
    }

    /// Sample layout.
    #[inline]
    pub fn layout(&self) -> SampleLayout {
        self.layout
    }

    /// Total allocated size in bytes.
    #[inline]
    pub fn buffer_size(&self) -> u32 {
        self.storage.as_ref().map_or(0, |s| s.len() as u32)
    }

    /// Time base of the stream.
    #[inline]
    pub fn time_base(&self) -> TimeBase {
        self.time
    }

    /// Replace the time base.
    #[inline]
    pub fn set_time_base(&mut self, time: TimeBase) {
        self.time = time;
    }

    /// Window duration covered by the valid samples, in seconds.
    #[inline]
    pub fn total_time_sec(&self) -> f64 {
        self.sample_count as f64 * self.time.interval_seconds()
    }

    /// Sampling frequency scaled to an SI prefix.
    pub fn engineering_frequency(&self) -> (f64, &'static str) {
        self.time.engineering_frequency()
    }

    /// Sample interval as `(step, unit)`.
    pub fn engineering_interval(&self) -> (f64, &'static str) {
        self.time.engineering_interval()
    }

    /// Interpolation plan of a prepared conversion output, if any.
    #[inline]
    pub fn src_plan(&self) -> Option<&[PlanEntry]> {
        self.src_plan.as_deref()
    }

    /// Attach an interpolation plan (replacing any previous one).
    pub fn set_src_plan(&mut self, plan: Box<[PlanEntry]>) {
        self.src_plan = Some(plan);
    }

    /// Rate-ratio snapshot of a prepared conversion output, if any.
    #[inline]
    pub fn rate_info(&self) -> Option<RateInfo> {
        self.rate_info
    }

    /// Attach a rate-ratio snapshot.
    pub fn set_rate_info(&mut self, info: RateInfo) {
        self.rate_info = Some(info);
    }

    /// Byte offset of `(sample, channel)` within the storage.
    ///
    /// Fails with [`TimelineError::OutOfBounds`] for invalid indices or for
    /// sub-byte bit widths, where a single channel has no byte address.
    pub fn sample_byte_offset(&self, sample: u32, channel: u8) -> Result<u32> {
        if sample >= self.sample_count
            || channel >= self.channel_count
            || self.bit_width % 8 != 0
            || self.bit_width == 0
        {
            return Err(TimelineError::OutOfBounds {
                sample,
                channel,
                samples: self.sample_count,
                channels: self.channel_count,
            });
        }
        Ok(sample * self.bytes_per_sample as u32 + (channel as u32 * self.bit_width as u32) / 8)
    }

    fn check_bit_width(&self, requested: u8) -> Result<()> {
        if self.bit_width != requested {
            return Err(TimelineError::TypeMismatch {
                requested,
                actual: self.bit_width,
            });
        }
        Ok(())
    }

    fn byte_at(&self, offset: u32, len: usize) -> Result<&[u8]> {
        let bytes = self.bytes();
        let start = offset as usize;
        bytes
            .get(start..start + len)
            .ok_or(TimelineError::OutOfBounds {
                sample: 0,
                channel: 0,
                samples: self.sample_count,
                channels: self.channel_count,
            })
    }

    /// Read one signed 8-bit channel value.
    pub fn read_i8(&self, sample: u32, channel: u8) -> Result<i8> {
        self.check_bit_width(8)?;
        let offset = self.sample_byte_offset(sample, channel)?;
        Ok(self.byte_at(offset, 1)?[0] as i8)
    }

    /// Read one 32-bit float channel value.
    pub fn read_f32(&self, sample: u32, channel: u8) -> Result<f32> {
        self.check_bit_width(32)?;
        let offset = self.sample_byte_offset(sample, channel)?;
        let raw: [u8; 4] = self.byte_at(offset, 4)?.try_into().unwrap();
        Ok(f32::from_ne_bytes(raw))
    }

    /// Read one 16-bit lane of a [`SampleLayout::SimdI16x8`] sample.
    pub fn read_i16_simd(&self, sample: u32, channel: u8) -> Result<i16> {
        self.check_bit_width(16)?;
        let offset = self.sample_byte_offset(sample, channel)?;
        let raw: [u8; 2] = self.byte_at(offset, 2)?.try_into().unwrap();
        Ok(i16::from_ne_bytes(raw))
    }

    /// Read one 24-bit lane of a [`SampleLayout::SimdI24x8`] sample,
    /// sign-extended to `i32`. Lanes are stored little-endian.
    pub fn read_i24_simd(&self, sample: u32, channel: u8) -> Result<i32> {
        self.check_bit_width(24)?;
        let offset = self.sample_byte_offset(sample, channel)?;
        let raw = self.byte_at(offset, 3)?;
        let wide = i32::from_le_bytes([raw[0], raw[1], raw[2], 0]);
        Ok((wide << 8) >> 8)
    }

    /// Raw storage bytes (empty if the buffer is not allocated).
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        self.storage.as_ref().map_or(&[], |s| s.as_slice())
    }

    /// Mutable raw storage bytes (empty if the buffer is not allocated).
    #[inline]
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        match self.storage.as_mut() {
            Some(s) => s.as_mut_slice(),
            None => &mut [],
        }
    }

    fn require_layout(&self, layout: SampleLayout) -> Result<()> {
        if self.storage.is_none() {
            return Err(TimelineError::BadShape("buffer is not allocated"));
        }
        if self.layout != layout {
            return Err(TimelineError::TypeMismatch {
                requested: layout.bit_width(),
                actual: self.bit_width,
            });
        }
        Ok(())
    }

    /// View an [`SampleLayout::AnalogI8`] buffer as interleaved `i8` samples.
    pub fn i8_samples(&self) -> Result<&[i8]> {
        self.require_layout(SampleLayout::AnalogI8)?;
        let bytes = self.bytes();
        // i8 and u8 share size and alignment.
        Ok(unsafe { std::slice::from_raw_parts(bytes.as_ptr() as *const i8, bytes.len()) })
    }

    /// Mutable `i8` view of an [`SampleLayout::AnalogI8`] buffer.
    pub fn i8_samples_mut(&mut self) -> Result<&mut [i8]> {
        self.require_layout(SampleLayout::AnalogI8)?;
        let bytes = self.bytes_mut();
        Ok(unsafe { std::slice::from_raw_parts_mut(bytes.as_mut_ptr() as *mut i8, bytes.len()) })
    }

    /// View a [`SampleLayout::SimdI16x8`] buffer as a flat `i16` lane slice
    /// (8 lanes per sample).
    pub fn i16_lanes(&self) -> Result<&[i16]> {
        self.require_layout(SampleLayout::SimdI16x8)?;
        let bytes = self.bytes();
        debug_assert_eq!(bytes.as_ptr() as usize % 16, 0);
        Ok(unsafe { std::slice::from_raw_parts(bytes.as_ptr() as *const i16, bytes.len() / 2) })
    }

    /// Mutable lane view of a [`SampleLayout::SimdI16x8`] buffer.
    pub fn i16_lanes_mut(&mut self) -> Result<&mut [i16]> {
        self.require_layout(SampleLayout::SimdI16x8)?;
        let bytes = self.bytes_mut();
        debug_assert_eq!(bytes.as_ptr() as usize % 16, 0);
        Ok(unsafe {
            std::slice::from_raw_parts_mut(bytes.as_mut_ptr() as *mut i16, bytes.len() / 2)
        })
    }

    /// Mutable lane view plus the attached interpolation plan, borrowed
    /// together so a conversion kernel can read the plan while writing lanes.
    ///
    /// Returns an empty plan slice if none is attached.
    pub fn i16_lanes_with_plan_mut(&mut self) -> Result<(&mut [i16], &[PlanEntry])> {
        if self.layout != SampleLayout::SimdI16x8 {
            return Err(TimelineError::TypeMismatch {
                requested: 16,
                actual: self.bit_width,
            });
        }
        let storage = self
            .storage
            .as_mut()
            .ok_or(TimelineError::BadShape("buffer is not allocated"))?;
        let bytes = storage.as_mut_slice();
        debug_assert_eq!(bytes.as_ptr() as usize % 16, 0);
        let lanes = unsafe {
            std::slice::from_raw_parts_mut(bytes.as_mut_ptr() as *mut i16, bytes.len() / 2)
        };
        let plan: &[PlanEntry] = self.src_plan.as_deref().unwrap_or(&[]);
        Ok((lanes, plan))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_has_no_storage() {
        let buf = TimelineBuffer::new();
        assert_eq!(buf.sample_count(), 0);
        assert_eq!(buf.buffer_size(), 0);
        assert_eq!(buf.layout(), SampleLayout::Undefined);
        assert!(buf.bytes().is_empty());
    }

    #[test]
    fn simd_allocation_sizes_and_alignment() {
        let mut buf = TimelineBuffer::new();
        buf.allocate(100, 8, 16, 16, SampleLayout::SimdI16x8).unwrap();
        assert_eq!(buf.bytes_per_sample(), 16);
        assert_eq!(buf.buffer_size(), 1600);
        assert_eq!(buf.bytes().as_ptr() as usize % 16, 0);
        // Zero-initialized lanes.
        assert!(buf.i16_lanes().unwrap().iter().all(|&v| v == 0));
    }

    #[test]
    fn simd_stride_ignores_active_channel_count() {
        let mut buf = TimelineBuffer::new();
        buf.allocate(10, 3, 16, 16, SampleLayout::SimdI16x8).unwrap();
        assert_eq!(buf.bytes_per_sample(), 16);
        assert_eq!(buf.buffer_size(), 160);
    }

    #[test]
    fn simd_channel_cap() {
        let mut buf = TimelineBuffer::new();
        let err = buf
            .allocate(10, 9, 16, 16, SampleLayout::SimdI16x8)
            .unwrap_err();
        assert!(matches!(err, TimelineError::BadShape(_)));
    }

    #[test]
    fn bit_width_must_match_layout() {
        let mut buf = TimelineBuffer::new();
        let err = buf.allocate(10, 1, 16, 1, SampleLayout::AnalogI8).unwrap_err();
        assert_eq!(
            err,
            TimelineError::TypeMismatch {
                requested: 16,
                actual: 8
            }
        );
    }

    #[test]
    fn offsets_are_stride_times_sample_plus_channel() {
        let mut buf = TimelineBuffer::new();
        buf.allocate(4, 2, 8, 1, SampleLayout::AnalogI8).unwrap();
        assert_eq!(buf.sample_byte_offset(0, 0).unwrap(), 0);
        assert_eq!(buf.sample_byte_offset(0, 1).unwrap(), 1);
        assert_eq!(buf.sample_byte_offset(3, 1).unwrap(), 7);
        assert!(buf.sample_byte_offset(4, 0).is_err());
        assert!(buf.sample_byte_offset(0, 2).is_err());
    }

    #[test]
    fn sub_byte_widths_have_no_byte_offset() {
        let mut buf = TimelineBuffer::new();
        buf.allocate(8, 8, 1, 1, SampleLayout::Digital1).unwrap();
        assert!(matches!(
            buf.sample_byte_offset(0, 0),
            Err(TimelineError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn typed_reads_enforce_bit_width() {
        let mut buf = TimelineBuffer::new();
        buf.allocate(4, 8, 16, 16, SampleLayout::SimdI16x8).unwrap();
        assert_eq!(
            buf.read_i8(0, 0),
            Err(TimelineError::TypeMismatch {
                requested: 8,
                actual: 16
            })
        );
        assert_eq!(buf.read_i16_simd(0, 0).unwrap(), 0);
    }

    #[test]
    fn i16_read_write_round_trip() {
        let mut buf = TimelineBuffer::new();
        buf.allocate(3, 8, 16, 16, SampleLayout::SimdI16x8).unwrap();
        buf.i16_lanes_mut().unwrap()[2 * 8 + 5] = -1234;
        assert_eq!(buf.read_i16_simd(2, 5).unwrap(), -1234);
    }

    #[test]
    fn i24_read_sign_extends() {
        let mut buf = TimelineBuffer::new();
        buf.allocate(2, 8, 24, 16, SampleLayout::SimdI24x8).unwrap();
        // -2 as 24-bit little-endian in sample 1, channel 0.
        let offset = buf.sample_byte_offset(1, 0).unwrap() as usize;
        buf.bytes_mut()[offset..offset + 3].copy_from_slice(&[0xFE, 0xFF, 0xFF]);
        assert_eq!(buf.read_i24_simd(1, 0).unwrap(), -2);
        assert_eq!(buf.read_i24_simd(0, 0).unwrap(), 0);
    }

    #[test]
    fn free_resets_everything() {
        let mut buf = TimelineBuffer::new();
        buf.allocate(10, 1, 8, 1, SampleLayout::AnalogI8).unwrap();
        buf.set_time_base(TimeBase::new(1, -6));
        buf.set_rate_info(RateInfo { ratio: 2.0 });
        buf.free();
        assert_eq!(buf.sample_count(), 0);
        assert_eq!(buf.layout(), SampleLayout::Undefined);
        assert_eq!(buf.time_base(), TimeBase::default());
        assert!(buf.rate_info().is_none());
        assert!(buf.src_plan().is_none());
    }

    #[test]
    fn total_time_covers_the_window() {
        let mut buf = TimelineBuffer::new();
        buf.allocate(1000, 8, 16, 16, SampleLayout::SimdI16x8).unwrap();
        buf.set_time_base(TimeBase::new(1, -6));
        assert!((buf.total_time_sec() - 1e-3).abs() < 1e-12);
    }
}
