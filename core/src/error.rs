//! Error types for request composition.
//!
//! # Design
//! Only input problems surface here. Invalid headers are dropped by the
//! filter instead of failing, and transport failures belong to the host that
//! performs the I/O.

use thiserror::Error;

/// Errors returned while turning user input into a `RequestSpec`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    /// The method text does not name a supported HTTP method.
    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// A `key=value` argument had no `=` separator.
    #[error("expected key=value, got: {0}")]
    MalformedPair(String),

    /// A cookie name or value that cannot be sent without being cut short.
    #[error("invalid cookie {name}: {reason}")]
    InvalidCookie { name: String, reason: &'static str },
}
