use std::fmt;

/// Running total of measured GPU time with an explicit sample counter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    total_ms: f64,
    samples: u64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, elapsed_ms: f64) {
        self.total_ms += elapsed_ms;
        self.samples += 1;
    }

    pub fn total_ms(&self) -> f64 {
        self.total_ms
    }

    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Returns the accumulated timing and zeroes the accumulator.
    pub fn take(&mut self) -> AccumulatedTiming {
        let taken = std::mem::take(self);
        AccumulatedTiming {
            total_ms: taken.total_ms,
            samples: taken.samples,
        }
    }
}

/// Snapshot handed back when the accumulator is reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccumulatedTiming {
    pub total_ms: f64,
    pub samples: u64,
}

impl AccumulatedTiming {
    /// Mean over the samples actually recorded, or `None` when nothing was.
    pub fn average_ms(&self) -> Option<f64> {
        self.average_over(self.samples)
    }

    /// Mean over a caller-chosen sample count, for callers that bracket a
    /// fixed number of frames regardless of how many were read back.
    pub fn average_over(&self, divisor: u64) -> Option<f64> {
        if divisor == 0 {
            None
        } else {
            Some(self.total_ms / divisor as f64)
        }
    }
}

impl fmt::Display for AccumulatedTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.average_ms() {
            Some(average) => write!(
                f,
                "{average:.4} ms average over {} samples ({:.3} ms total)",
                self.samples, self.total_ms
            ),
            None => f.write_str("no samples"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_samples_sum_to_n_times_t() {
        let mut accumulator = Accumulator::new();
        let t = 0.25;
        for _ in 0..40 {
            accumulator.add(t);
        }
        assert_eq!(accumulator.samples(), 40);
        assert!((accumulator.total_ms() - 40.0 * t).abs() < 1e-12);
    }

    #[test]
    fn take_zeroes_regardless_of_prior_value() {
        let mut accumulator = Accumulator::new();
        accumulator.add(3.5);
        accumulator.add(1.5);

        let timing = accumulator.take();
        assert_eq!(timing.samples, 2);
        assert_eq!(timing.total_ms, 5.0);
        assert_eq!(timing.average_ms(), Some(2.5));

        assert_eq!(accumulator, Accumulator::default());
        assert_eq!(accumulator.take().average_ms(), None);
    }

    #[test]
    fn average_over_uses_caller_divisor() {
        let timing = AccumulatedTiming {
            total_ms: 20_000.0,
            samples: 8_000,
        };
        assert_eq!(timing.average_over(10_000), Some(2.0));
        assert_eq!(timing.average_over(0), None);
    }

    #[test]
    fn display_reports_average() {
        let timing = AccumulatedTiming {
            total_ms: 3.0,
            samples: 2,
        };
        assert_eq!(
            timing.to_string(),
            "1.5000 ms average over 2 samples (3.000 ms total)"
        );
        let empty = AccumulatedTiming {
            total_ms: 0.0,
            samples: 0,
        };
        assert_eq!(empty.to_string(), "no samples");
    }
}
