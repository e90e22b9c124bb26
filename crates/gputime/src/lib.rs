//! GPU elapsed-time measurement built on `wgpu` timestamp queries.
//!
//! The crate wraps a two-slot timestamp query set and a CPU-readable readback
//! buffer. A frame typically flows like this:
//!
//! ```text
//!   profiler.begin_query(&mut encoder)        slot 0 <- timestamp
//!   ... record the workload ...
//!   profiler.end_query_and_resolve(&mut encoder)
//!                                             slot 1 <- timestamp
//!                                             slots -> resolve -> readback
//!   queue.submit(..)
//!   profiler.elapsed_time(true)               map readback, ticks -> ms
//! ```
//!
//! - `profiler` owns the GPU resources and the begin/end/read cycle.
//! - `phase` tracks where in that cycle the profiler is so misuse surfaces as
//!   an error instead of garbage timings.
//! - `frequency` converts raw ticks into milliseconds.
//! - `accumulator` keeps the running total used for averaged reports.
//! - `scope` ties begin and end to a guard that resolves on drop.

mod accumulator;
mod error;
mod frequency;
mod phase;
mod profiler;
mod scope;

pub use accumulator::{AccumulatedTiming, Accumulator};
pub use error::ProfilerError;
pub use frequency::TimestampFrequency;
pub use phase::{QueryPhase, QueryPlacement};
pub use profiler::ElapsedTimeProfiler;
pub use scope::TimedScope;

/// Timestamp features a device should request, limited to what the adapter offers.
///
/// `TIMESTAMP_QUERY` enables pass-level timestamps; encoder-level begin/end
/// additionally needs `TIMESTAMP_QUERY_INSIDE_ENCODERS`.
pub fn timestamp_features(adapter_features: wgpu::Features) -> wgpu::Features {
    let wanted =
        wgpu::Features::TIMESTAMP_QUERY | wgpu::Features::TIMESTAMP_QUERY_INSIDE_ENCODERS;
    adapter_features & wanted
}
