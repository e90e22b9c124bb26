#[derive(Debug, thiserror::Error)]
pub enum ProfilerError {
    #[error("device is missing required features: {0:?}")]
    Unsupported(wgpu::Features),
    #[error("timestamp frequency must be non-zero")]
    ZeroFrequency,
    #[error("invalid timestamp period of {0} ns per tick")]
    InvalidPeriod(f32),
    #[error("failed to create timestamp resources: {0}")]
    ResourceCreation(String),
    #[error("a timestamp query is already in progress")]
    QueryAlreadyStarted,
    #[error("no timestamp query has been started")]
    QueryNotStarted,
    #[error("no resolved timestamp query is available to read")]
    QueryNotResolved,
    #[error("failed to map timestamp readback buffer: {0}")]
    Map(#[from] wgpu::BufferAsyncError),
    #[error("failed to wait for GPU work: {0}")]
    Poll(#[from] wgpu::PollError),
    #[error("timestamp readback callback was dropped before completing")]
    ReadbackDropped,
}
