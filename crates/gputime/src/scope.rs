use std::ops::{Deref, DerefMut};

use crate::profiler::ElapsedTimeProfiler;

/// Open timestamp query bound to a command encoder.
///
/// Dropping the guard records the end timestamp and the resolve, so a begun
/// query can never be left without its end.
pub struct TimedScope<'a> {
    profiler: &'a mut ElapsedTimeProfiler,
    encoder: &'a mut wgpu::CommandEncoder,
}

impl<'a> TimedScope<'a> {
    pub(crate) fn new(
        profiler: &'a mut ElapsedTimeProfiler,
        encoder: &'a mut wgpu::CommandEncoder,
    ) -> Self {
        Self { profiler, encoder }
    }
}

impl Deref for TimedScope<'_> {
    type Target = wgpu::CommandEncoder;

    fn deref(&self) -> &Self::Target {
        &*self.encoder
    }
}

impl DerefMut for TimedScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.encoder
    }
}

impl Drop for TimedScope<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.profiler.end_query_and_resolve(&mut *self.encoder) {
            tracing::warn!(error = %err, "failed to close timed scope");
        }
    }
}
