use std::time::{Duration, Instant};

/// Frame and wall-clock bounds on a benchmark run. Unbounded when both are unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunLimits {
    max_frames: Option<u64>,
    deadline: Option<Instant>,
}

impl RunLimits {
    pub(crate) fn new(max_frames: Option<u64>, run_for: Option<Duration>, now: Instant) -> Self {
        Self {
            max_frames,
            deadline: run_for.and_then(|duration| now.checked_add(duration)),
        }
    }

    pub(crate) fn reached(&self, frames: u64, now: Instant) -> bool {
        let frames_done = self.max_frames.is_some_and(|max| frames >= max);
        let out_of_time = self.deadline.is_some_and(|deadline| now >= deadline);
        frames_done || out_of_time
    }
}
