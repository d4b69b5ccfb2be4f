//! Integer time-base arithmetic and engineering-unit formatting.

/// Time base of a uniformly-sampled stream.
///
/// The interval between consecutive samples is `step * 10^exponent` seconds.
/// Keeping the step as an integer with a decimal exponent avoids accumulated
/// floating-point drift when deriving conversion ratios between two streams.
///
/// # Example
///
/// ```
/// use traceline_buffer::TimeBase;
///
/// let tb = TimeBase::new(1, -6); // 1 µs per sample, i.e. 1 MHz
/// assert_eq!(tb.engineering_frequency(), (1.0, "MHz"));
/// assert_eq!(tb.engineering_interval(), (1.0, "µs"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeBase {
    /// Integer step between consecutive samples, in units of `10^exponent` s.
    pub step: u32,
    /// Signed decimal exponent, typically in −15..=3.
    pub exponent: i8,
}

const FREQ_UNITS: [&str; 6] = ["Hz", "kHz", "MHz", "GHz", "THz", "PHz"];

impl TimeBase {
    /// Create a time base from a step and a decimal exponent.
    #[inline]
    pub fn new(step: u32, exponent: i8) -> Self {
        Self { step, exponent }
    }

    /// Interval between consecutive samples in seconds.
    #[inline]
    pub fn interval_seconds(&self) -> f64 {
        self.step as f64 * 10f64.powi(self.exponent as i32)
    }

    /// Sampling frequency in Hz.
    #[inline]
    pub fn frequency_hz(&self) -> f64 {
        1.0 / self.interval_seconds()
    }

    /// Sampling frequency scaled to an SI prefix.
    ///
    /// The raw frequency is divided by 1000 until the mantissa falls in
    /// `[1, 1000)`, capped at PHz. Sub-hertz rates stay in Hz.
    pub fn engineering_frequency(&self) -> (f64, &'static str) {
        let mut freq = self.frequency_hz();
        let mut unit = 0;
        while freq >= 1000.0 && unit < FREQ_UNITS.len() - 1 {
            freq /= 1000.0;
            unit += 1;
        }
        (freq, FREQ_UNITS[unit])
    }

    /// Sample interval as `(step, unit)` with the unit looked up from the
    /// exponent. Exponents off the 3-grid report `"?s"`.
    pub fn engineering_interval(&self) -> (f64, &'static str) {
        let unit = match self.exponent {
            0 => "s",
            -3 => "ms",
            -6 => "µs",
            -9 => "ns",
            -12 => "ps",
            -15 => "fs",
            _ => "?s",
        };
        (self.step as f64, unit)
    }

    /// Normalize a target interval in seconds to a `(step, exponent)` pair.
    ///
    /// Picks the largest exponent on the 3-grid (+15 down to −15) for which
    /// the step is at least 1 and fits in a `u32`, rounding the step to the
    /// nearest integer. Intervals below one femtosecond clamp to
    /// `step = 1, exponent = −15` so the step never violates `step ≥ 1`.
    pub fn from_interval(target_seconds: f64) -> Self {
        for e in (-15..=15).rev().step_by(3) {
            let candidate = target_seconds / 10f64.powi(e);
            if candidate >= 1.0 && candidate <= u32::MAX as f64 {
                return Self {
                    step: (candidate + 0.5) as u32,
                    exponent: e as i8,
                };
            }
        }
        Self {
            step: 1,
            exponent: -15,
        }
    }

    /// Ratio of `target_rate_hz` to this time base's sampling frequency.
    ///
    /// A ratio above 1 means upsampling, below 1 downsampling.
    #[inline]
    pub fn rate_ratio(&self, target_rate_hz: u32) -> f64 {
        target_rate_hz as f64 / self.frequency_hz()
    }
}
