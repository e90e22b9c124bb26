use tracing::{debug, info, warn};

use crate::accumulator::{AccumulatedTiming, Accumulator};
use crate::error::ProfilerError;
use crate::frequency::TimestampFrequency;
use crate::phase::{QueryPhase, QueryPlacement};
use crate::scope::TimedScope;

const QUERY_COUNT: u32 = 2;
const START_SLOT: u32 = 0;
const END_SLOT: u32 = 1;
const TIMESTAMP_BYTES: wgpu::BufferAddress =
    (std::mem::size_of::<u64>() as wgpu::BufferAddress) * QUERY_COUNT as wgpu::BufferAddress;

/// Measures GPU time spent between two timestamps recorded into a command
/// stream.
///
/// Device and queue stay owned by the caller; the profiler keeps a handle to
/// the device only so it can drive buffer mapping when reading results.
pub struct ElapsedTimeProfiler {
    device: wgpu::Device,
    query_set: wgpu::QuerySet,
    resolve_buffer: wgpu::Buffer,
    readback_buffer: wgpu::Buffer,
    frequency: TimestampFrequency,
    encoder_queries: bool,
    phase: QueryPhase,
    accumulator: Accumulator,
}

impl ElapsedTimeProfiler {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<Self, ProfilerError> {
        let features = device.features();
        if !features.contains(wgpu::Features::TIMESTAMP_QUERY) {
            return Err(ProfilerError::Unsupported(wgpu::Features::TIMESTAMP_QUERY));
        }

        device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let query_set = device.create_query_set(&wgpu::QuerySetDescriptor {
            label: Some("elapsed time queries"),
            ty: wgpu::QueryType::Timestamp,
            count: QUERY_COUNT,
        });
        // Query results cannot be resolved straight into mappable memory, so
        // they land in a resolve buffer and get copied to the readback one.
        let resolve_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("elapsed time resolve"),
            size: TIMESTAMP_BYTES,
            usage: wgpu::BufferUsages::QUERY_RESOLVE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("elapsed time readback"),
            size: TIMESTAMP_BYTES,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let validation = pollster::block_on(device.pop_error_scope());
        let out_of_memory = pollster::block_on(device.pop_error_scope());
        if let Some(err) = validation.or(out_of_memory) {
            return Err(ProfilerError::ResourceCreation(err.to_string()));
        }

        let frequency = TimestampFrequency::from_period_ns(queue.get_timestamp_period())?;
        let encoder_queries = features.contains(wgpu::Features::TIMESTAMP_QUERY_INSIDE_ENCODERS);
        debug!(
            frequency_hz = frequency.hz(),
            encoder_queries, "created GPU elapsed time profiler"
        );

        Ok(Self {
            device: device.clone(),
            query_set,
            resolve_buffer,
            readback_buffer,
            frequency,
            encoder_queries,
            phase: QueryPhase::Idle,
            accumulator: Accumulator::new(),
        })
    }

    pub fn frequency(&self) -> TimestampFrequency {
        self.frequency
    }

    pub fn phase(&self) -> QueryPhase {
        self.phase
    }

    /// Whether `begin_query`/`scope` can be used, as opposed to pass-level writes only.
    pub fn supports_encoder_queries(&self) -> bool {
        self.encoder_queries
    }

    pub fn accumulated_ms(&self) -> f64 {
        self.accumulator.total_ms()
    }

    pub fn samples(&self) -> u64 {
        self.accumulator.samples()
    }

    /// Records the start timestamp into `encoder`. Nothing runs until the
    /// encoder is finished and submitted by the caller.
    pub fn begin_query(&mut self, encoder: &mut wgpu::CommandEncoder) -> Result<(), ProfilerError> {
        if !self.encoder_queries {
            return Err(ProfilerError::Unsupported(
                wgpu::Features::TIMESTAMP_QUERY_INSIDE_ENCODERS,
            ));
        }
        self.phase.start(QueryPlacement::Encoder)?;
        encoder.write_timestamp(&self.query_set, START_SLOT);
        Ok(())
    }

    /// Timestamp writes for a render pass that brackets the measured work.
    /// Finish with `end_query_and_resolve` once the pass has been dropped.
    pub fn render_pass_timestamp_writes(
        &mut self,
    ) -> Result<wgpu::RenderPassTimestampWrites<'_>, ProfilerError> {
        self.phase.start(QueryPlacement::Pass)?;
        Ok(wgpu::RenderPassTimestampWrites {
            query_set: &self.query_set,
            beginning_of_pass_write_index: Some(START_SLOT),
            end_of_pass_write_index: Some(END_SLOT),
        })
    }

    /// Compute-pass counterpart of `render_pass_timestamp_writes`.
    pub fn compute_pass_timestamp_writes(
        &mut self,
    ) -> Result<wgpu::ComputePassTimestampWrites<'_>, ProfilerError> {
        self.phase.start(QueryPlacement::Pass)?;
        Ok(wgpu::ComputePassTimestampWrites {
            query_set: &self.query_set,
            beginning_of_pass_write_index: Some(START_SLOT),
            end_of_pass_write_index: Some(END_SLOT),
        })
    }

    /// Records the end timestamp (for encoder-placed queries) followed by the
    /// resolve and the copy into the readback buffer.
    pub fn end_query_and_resolve(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
    ) -> Result<(), ProfilerError> {
        let placement = self.phase.finish()?;
        if placement == QueryPlacement::Encoder {
            encoder.write_timestamp(&self.query_set, END_SLOT);
        }
        encoder.resolve_query_set(&self.query_set, 0..QUERY_COUNT, &self.resolve_buffer, 0);
        encoder.copy_buffer_to_buffer(
            &self.resolve_buffer,
            0,
            &self.readback_buffer,
            0,
            TIMESTAMP_BYTES,
        );
        Ok(())
    }

    /// Begins a query and returns a guard that ends and resolves it on drop.
    /// The guard dereferences to the encoder so the workload can be recorded
    /// through it.
    pub fn scope<'a>(
        &'a mut self,
        encoder: &'a mut wgpu::CommandEncoder,
    ) -> Result<TimedScope<'a>, ProfilerError> {
        self.begin_query(encoder)?;
        Ok(TimedScope::new(self, encoder))
    }

    /// Reads back the last resolved timestamps and returns the elapsed GPU
    /// time in milliseconds, optionally adding it to the running total.
    ///
    /// The command buffer holding the resolve must have been submitted. This
    /// call blocks until the device has finished the submitted work, since
    /// wgpu only completes a mapping once every pending use of the buffer is
    /// done.
    ///
    /// Each resolve is accumulated at most once; reading the same resolve
    /// again returns the same value without touching the running total.
    pub fn elapsed_time(&mut self, accumulate: bool) -> Result<f64, ProfilerError> {
        self.phase.ensure_resolved()?;
        let (start, end) = self.read_timestamps()?;
        if end < start {
            warn!(start, end, "end timestamp precedes start; reporting zero elapsed time");
        }

        let elapsed = self.frequency.ticks_to_millis(start, end);
        if accumulate {
            if self.phase.mark_accumulated()? {
                self.accumulator.add(elapsed);
            } else {
                debug!(elapsed_ms = elapsed, "timestamps already accumulated; skipping");
            }
        }
        Ok(elapsed)
    }

    /// Zeroes the running total and hands back what it held.
    pub fn reset(&mut self) -> AccumulatedTiming {
        let timing = self.accumulator.take();
        match timing.average_ms() {
            Some(average_ms) => info!(
                average_ms,
                samples = timing.samples,
                total_ms = timing.total_ms,
                "GPU elapsed time average"
            ),
            None => debug!("GPU profiler reset without samples"),
        }
        timing
    }

    fn read_timestamps(&self) -> Result<(u64, u64), ProfilerError> {
        let slice = self.readback_buffer.slice(..);
        let (tx, rx) = crossbeam_channel::bounded(1);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        self.device.poll(wgpu::PollType::Wait)?;
        rx.recv().map_err(|_| ProfilerError::ReadbackDropped)??;

        let ticks = {
            let mapped = slice.get_mapped_range();
            bytemuck::pod_read_unaligned::<[u64; 2]>(&mapped[..TIMESTAMP_BYTES as usize])
        };
        self.readback_buffer.unmap();
        Ok((ticks[START_SLOT as usize], ticks[END_SLOT as usize]))
    }
}
