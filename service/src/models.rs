use crate::error::DispatchError;

/// Lifecycle of one outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Pending,
    Completed,
    Failed,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestState::Pending)
    }
}

/// Full body of one completed exchange, exactly as received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBody(Vec<u8>);

impl ResponseBody {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Terminal result of a dispatched request
#[derive(Debug)]
pub enum Outcome {
    Completed(ResponseBody),
    Failed(DispatchError),
}

impl Outcome {
    pub fn state(&self) -> RequestState {
        match self {
            Outcome::Completed(_) => RequestState::Completed,
            Outcome::Failed(_) => RequestState::Failed,
        }
    }
}

impl From<Result<ResponseBody, DispatchError>> for Outcome {
    fn from(result: Result<ResponseBody, DispatchError>) -> Self {
        match result {
            Ok(body) => Outcome::Completed(body),
            Err(err) => Outcome::Failed(err),
        }
    }
}

/// Counters reported when the relay finishes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelaySummary {
    pub lines_read: u64,
    pub parse_errors: u64,
    pub dispatched: u64,
    pub completed: u64,
    pub failed: u64,
}

impl RelaySummary {
    /// Requests still awaiting a terminal outcome
    pub fn in_flight(&self) -> u64 {
        self.dispatched - self.completed - self.failed
    }

    pub(crate) fn record(&mut self, state: RequestState) {
        match state {
            RequestState::Pending => self.dispatched += 1,
            RequestState::Completed => self.completed += 1,
            RequestState::Failed => self.failed += 1,
        }
    }
}
