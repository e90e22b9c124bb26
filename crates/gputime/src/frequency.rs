use crate::error::ProfilerError;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;
const MILLIS_PER_SECOND: f64 = 1_000.0;

/// Tick rate of a queue's timestamp counter, in ticks per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampFrequency(u64);

impl TimestampFrequency {
    pub fn from_hz(hz: u64) -> Result<Self, ProfilerError> {
        if hz == 0 {
            return Err(ProfilerError::ZeroFrequency);
        }
        Ok(Self(hz))
    }

    /// Builds the frequency from `wgpu::Queue::get_timestamp_period`, which
    /// reports nanoseconds per tick.
    pub fn from_period_ns(period: f32) -> Result<Self, ProfilerError> {
        if !period.is_finite() || period <= 0.0 {
            return Err(ProfilerError::InvalidPeriod(period));
        }
        let hz = (NANOS_PER_SECOND / f64::from(period)).round();
        if hz < 1.0 {
            return Err(ProfilerError::InvalidPeriod(period));
        }
        Ok(Self(hz as u64))
    }

    pub fn hz(self) -> u64 {
        self.0
    }

    /// Milliseconds between two timestamps. An `end` earlier than `start`
    /// counts as zero elapsed time.
    pub fn ticks_to_millis(self, start: u64, end: u64) -> f64 {
        let delta = end.saturating_sub(start);
        delta as f64 / self.0 as f64 * MILLIS_PER_SECOND
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_second_of_ticks_is_one_thousand_millis() {
        for hz in [1, 1_000, 19_200_000, 1_000_000_000, u64::from(u32::MAX) + 7] {
            let frequency = TimestampFrequency::from_hz(hz).unwrap();
            assert_eq!(frequency.ticks_to_millis(0, hz), 1000.0);
        }
    }

    #[test]
    fn elapsed_millis_follow_tick_delta_over_frequency() {
        let frequency = TimestampFrequency::from_hz(10_000_000).unwrap();
        let cases = [(0u64, 0u64), (5, 5), (100, 10_100), (1_000_000, 1_166_667)];
        for (start, end) in cases {
            let expected = (end - start) as f64 / 10_000_000.0 * 1000.0;
            let actual = frequency.ticks_to_millis(start, end);
            assert!((actual - expected).abs() < 1e-12, "{start}..{end}");
        }
    }

    #[test]
    fn large_absolute_timestamps_keep_precision_of_delta() {
        let frequency = TimestampFrequency::from_hz(1_000_000_000).unwrap();
        let start = u64::MAX - 2_000_000;
        let end = start + 1_500_000;
        assert!((frequency.ticks_to_millis(start, end) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn reversed_timestamps_saturate_to_zero() {
        let frequency = TimestampFrequency::from_hz(1_000).unwrap();
        assert_eq!(frequency.ticks_to_millis(500, 100), 0.0);
    }

    #[test]
    fn zero_frequency_is_rejected() {
        assert!(matches!(
            TimestampFrequency::from_hz(0),
            Err(ProfilerError::ZeroFrequency)
        ));
    }

    #[test]
    fn period_converts_to_ticks_per_second() {
        assert_eq!(TimestampFrequency::from_period_ns(1.0).unwrap().hz(), 1_000_000_000);
        assert_eq!(TimestampFrequency::from_period_ns(10.0).unwrap().hz(), 100_000_000);
        // 19.2 MHz counters report a fractional period.
        let mobile = TimestampFrequency::from_period_ns(52.083_332).unwrap();
        assert!((mobile.hz() as i64 - 19_200_000).abs() <= 1);
    }

    #[test]
    fn degenerate_periods_are_rejected() {
        for period in [0.0, -1.0, f32::NAN, f32::INFINITY, 3.0e9] {
            assert!(
                matches!(
                    TimestampFrequency::from_period_ns(period),
                    Err(ProfilerError::InvalidPeriod(_))
                ),
                "{period}"
            );
        }
    }
}
