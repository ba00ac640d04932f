//! Error type for restclient calls.
//!
//! # Design
//! There is no taxonomy of our own. Each variant wraps whatever the
//! collaborator raised (the HTTP transport, the JSON codec, the URL parser,
//! the filesystem when loading trust roots) so callers see the original
//! failure. The content-sniffing probe on GET responses never produces one
//! of these.

use thiserror::Error;

/// Errors propagated from a synchronous restclient call.
#[derive(Debug, Error)]
pub enum RestError {
    /// Connection refused, DNS failure, TLS failure, timeout, malformed
    /// response: anything the HTTP transport raised.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// Parameters could not be encoded as JSON, or a body declared as
    /// `application/json` did not parse.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The configured CA bundle could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
