//! Transmission error types.

use thiserror::Error;

/// Errors from a single transmission attempt.
///
/// Never fatal to the capture loop: the loop surfaces them as a failed
/// send, leaves the cooldown untouched, and continues.
#[derive(Debug, Error)]
pub enum TransmitError {
    #[error("Invalid collector endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Collector rejected report: HTTP {status}")]
    Rejected { status: u16 },
}
