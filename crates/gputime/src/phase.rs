use crate::error::ProfilerError;

/// Where the start/end timestamps of the open query are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPlacement {
    /// Written by the profiler directly into the command encoder.
    Encoder,
    /// Written by a render or compute pass at its beginning and end.
    Pass,
}

/// Position of the profiler in its begin -> end/resolve -> read cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryPhase {
    #[default]
    Idle,
    Started(QueryPlacement),
    Resolved,
    /// The last resolve has been added to the running total.
    Accumulated,
}

impl QueryPhase {
    pub(crate) fn start(&mut self, placement: QueryPlacement) -> Result<(), ProfilerError> {
        match self {
            QueryPhase::Started(_) => Err(ProfilerError::QueryAlreadyStarted),
            QueryPhase::Idle | QueryPhase::Resolved | QueryPhase::Accumulated => {
                *self = QueryPhase::Started(placement);
                Ok(())
            }
        }
    }

    pub(crate) fn finish(&mut self) -> Result<QueryPlacement, ProfilerError> {
        match *self {
            QueryPhase::Started(placement) => {
                *self = QueryPhase::Resolved;
                Ok(placement)
            }
            QueryPhase::Idle | QueryPhase::Resolved | QueryPhase::Accumulated => {
                Err(ProfilerError::QueryNotStarted)
            }
        }
    }

    pub(crate) fn ensure_resolved(&self) -> Result<(), ProfilerError> {
        match self {
            QueryPhase::Resolved | QueryPhase::Accumulated => Ok(()),
            QueryPhase::Idle | QueryPhase::Started(_) => Err(ProfilerError::QueryNotResolved),
        }
    }

    /// Returns `true` only the first time after a resolve, so one resolve
    /// feeds the running total at most once.
    pub(crate) fn mark_accumulated(&mut self) -> Result<bool, ProfilerError> {
        match *self {
            QueryPhase::Resolved => {
                *self = QueryPhase::Accumulated;
                Ok(true)
            }
            QueryPhase::Accumulated => Ok(false),
            QueryPhase::Idle | QueryPhase::Started(_) => Err(ProfilerError::QueryNotResolved),
        }
    }
}
