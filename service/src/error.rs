use std::error::Error as StdError;

/// Failure of a single outbound request. Never fatal to the relay.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("connection failed")]
    Connect(#[source] reqwest::Error),
    #[error("request timed out")]
    Timeout(#[source] reqwest::Error),
    #[error("failed to read response body")]
    Body(#[source] reqwest::Error),
    #[error("request failed")]
    Request(#[source] reqwest::Error),
    #[error("failed to serialize message")]
    Serialize(#[from] serde_json::Error),
}

impl DispatchError {
    /// Sort a transport error into the class reported on the error channel
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DispatchError::Timeout(err)
        } else if err.is_connect() {
            DispatchError::Connect(err)
        } else if err.is_body() || err.is_decode() {
            DispatchError::Body(err)
        } else {
            DispatchError::Request(err)
        }
    }
}

/// Process-level failures: bad startup configuration or a broken local stream.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("failed to read input")]
    Input(#[source] std::io::Error),
    #[error("failed to write output")]
    Output(#[source] std::io::Error),
}

/// Render an error followed by each of its sources, separated by `": "`.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
