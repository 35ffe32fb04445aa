//! Chatsync - client-side conversation synchronizer
//!
//! This library keeps an in-memory view of direct-message conversations,
//! per-peer unseen counters, and the active conversation consistent across
//! two concurrent sources: a request/response fetch service and a
//! server-initiated push-event channel.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod directory;
pub mod fetch;
pub mod protocol;
pub mod push;
pub mod reconciler;
pub mod session;
pub mod timeline;

#[cfg(test)]
mod tests;

/// Result type alias for chatsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for chatsync operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Fetch or push call failed at the transport level
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend rejected the request with an application-level message
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// A push event could not be attributed to a peer
    #[error("Malformed event: {0}")]
    Malformed(String),

    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP/Hyper error
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),
}

/// Initialize the chatsync library with logging
pub fn init() {
    tracing_subscriber::fmt::init();
}
