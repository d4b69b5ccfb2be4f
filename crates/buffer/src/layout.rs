//! Sample layout variants and their stride / alignment rules.

/// Layout of one interleaved sample.
///
/// The SIMD variants fix their stride to a full vector register regardless of
/// how many channels are active, so kernels can issue a single aligned load
/// per sample. Unused lanes are kept zeroed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleLayout {
    /// No layout assigned yet (freshly initialized or freed buffer).
    #[default]
    Undefined,
    /// 1-bit digital channels.
    Digital1,
    /// 4-bit digital channels.
    Digital4,
    /// 8-bit digital channels.
    Digital8,
    /// Signed 8-bit analog samples.
    AnalogI8,
    /// 32-bit float analog samples.
    AnalogF32,
    /// 64-bit float analog samples.
    AnalogF64,
    /// Eight interleaved `i16` lanes, 16-byte stride, 16-byte aligned.
    SimdI16x8,
    /// Eight interleaved 24-bit lanes, 24-byte stride, 16-byte aligned.
    SimdI24x8,
}

impl SampleLayout {
    /// Bits per channel value.
    #[inline]
    pub fn bit_width(self) -> u8 {
        match self {
            SampleLayout::Undefined => 0,
            SampleLayout::Digital1 => 1,
            SampleLayout::Digital4 => 4,
            SampleLayout::Digital8 | SampleLayout::AnalogI8 => 8,
            SampleLayout::AnalogF32 => 32,
            SampleLayout::AnalogF64 => 64,
            SampleLayout::SimdI16x8 => 16,
            SampleLayout::SimdI24x8 => 24,
        }
    }

    /// Stride in bytes between consecutive samples for `channels` channels.
    ///
    /// SIMD layouts have a fixed stride (one vector register per sample);
    /// every other layout packs `channels * bit_width` bits, rounded up to
    /// whole bytes. Returns `None` when the stride would not fit in a byte.
    #[inline]
    pub fn bytes_per_sample(self, channels: u8) -> Option<u8> {
        match self {
            SampleLayout::SimdI16x8 => Some(16),
            SampleLayout::SimdI24x8 => Some(24),
            other => {
                let bytes = (channels as u16 * other.bit_width() as u16 + 7) / 8;
                u8::try_from(bytes).ok()
            }
        }
    }

    /// Minimum storage alignment for this layout.
    #[inline]
    pub fn required_alignment(self) -> u8 {
        if self.is_simd() {
            16
        } else {
            1
        }
    }

    /// Whether this is one of the vector-register layouts.
    #[inline]
    pub fn is_simd(self) -> bool {
        matches!(self, SampleLayout::SimdI16x8 | SampleLayout::SimdI24x8)
    }
}
