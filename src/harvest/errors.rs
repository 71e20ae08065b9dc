//! Error types for the harvest pipeline

use thiserror::Error;

/// Errors from the upstream page source
#[derive(Debug, Error)]
pub enum SourceError {
    /// Non-2xx response; carries the full diagnostic context
    #[error("upstream returned {status} for {url} (floor={floor}, limit={limit}): {body}")]
    HttpStatus {
        status: u16,
        url: String,
        floor: u64,
        limit: usize,
        body: String,
    },
    /// Connection / transport level failure
    #[error("upstream transport error: {0}")]
    Transport(String),
    /// A page item was missing a mandatory field or otherwise malformed.
    /// Fails the whole page, never a single item.
    #[error("page parse error: {0}")]
    PageParse(String),
}

/// Errors from the consumer lag query
#[derive(Debug, Error)]
pub enum LagError {
    #[error("lag query failed: {0}")]
    Kafka(String),
}

/// Errors that terminate the fetch task
#[derive(Debug, Error)]
pub enum FetchTaskError {
    #[error(transparent)]
    Lag(#[from] LagError),
    /// Downstream receive channel dropped; the pipeline is shutting down
    #[error("receive channel closed")]
    ChannelClosed,
}

/// Errors that terminate the publish task
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to serialize record: {0}")]
    Serialize(String),
    #[error("broker publish failed: {0}")]
    Kafka(String),
}
