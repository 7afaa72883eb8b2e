use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::core::cancel::CancelToken;

/// Failure to reach or authenticate with a data source.
/// Always transient from the user's point of view: the UI offers a retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionError {
    /// The source refused or could not be reached.
    Refused(String),
    /// The connect deadline elapsed.
    Timeout(Duration),
    /// Credentials were missing or rejected.
    Unauthorized,
    /// Local I/O failure while probing the source.
    Io(String),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::Refused(msg) => write!(f, "connection refused: {msg}"),
            ConnectionError::Timeout(after) => {
                write!(f, "connection timed out after {}ms", after.as_millis())
            }
            ConnectionError::Unauthorized => write!(f, "unauthorized: check the auth token"),
            ConnectionError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for ConnectionError {}

/// Failure to fetch the list of live targets. Transient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    Unavailable(String),
    Io(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Unavailable(msg) => write!(f, "target list unavailable: {msg}"),
            FetchError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// A peekable component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub id: String,
    pub description: String,
}

impl Target {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub auth_token: Option<String>,
}

/// Proof of a successful connection test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connected {
    pub address: String,
}

/// Where peeked lines come from.
///
/// Every operation takes a `CancelToken`; implementations should stop work
/// promptly once it is cancelled. Callers also race each call against the
/// token, so a slow implementation can't hold a dialog open.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Returns the name of the source.
    fn name(&self) -> &str;

    /// Test the connection. Deadlines are enforced by the caller as well.
    async fn connect(
        &self,
        cancel: &CancelToken,
        address: &str,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Connected, ConnectionError>;

    /// Ordered list of targets that can be peeked right now.
    async fn list_targets(&self, cancel: &CancelToken) -> Result<Vec<Target>, FetchError>;

    /// Lazy, unbounded, non-restartable line stream for one target.
    /// Ends when `cancel` fires (or when the underlying source ends).
    fn stream_lines(&self, cancel: CancelToken, target: &str) -> BoxStream<'static, String>;
}
