//! Error payloads delivered by every failing operation.

use serde_json::{Value, json};
use std::fmt;

/// Where a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection, DNS or TLS failure, or the body stream broke off.
    Transport,
    /// The request could not be built (bad URL, bad header, release without id).
    Request,
    /// The response body is not valid JSON, or not the shape we needed.
    Parse,
    /// A 2xx response whose body carries a known rejection message.
    Rejected,
    /// Any status outside 200..=206.
    Status(u16),
    /// No release matched the requested tag.
    NotFound,
    /// A local file could not be read.
    Io,
    /// An upload task went away without reporting an outcome.
    Interrupted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "transport error"),
            ErrorKind::Request => write!(f, "invalid request"),
            ErrorKind::Parse => write!(f, "unreadable response"),
            ErrorKind::Rejected => write!(f, "rejected by service"),
            ErrorKind::Status(code) => write!(f, "HTTP {}", code),
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::Io => write!(f, "local I/O error"),
            ErrorKind::Interrupted => write!(f, "interrupted"),
        }
    }
}

/// A failure together with its loosely-structured body.
///
/// The body is whatever the service sent back for `Rejected` and `Status`
/// failures, so no schema is assumed beyond an optional string `message`.
/// Locally synthesized failures always have the shape `{"message": "..."}`.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPayload {
    kind: ErrorKind,
    body: Value,
}

impl ErrorPayload {
    pub fn new(kind: ErrorKind, body: Value) -> Self {
        Self { kind, body }
    }

    /// Builds a payload of the form `{"message": message}`.
    pub fn synthesize(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, json!({ "message": message.into() }))
    }

    pub fn transport(error: reqwest::Error) -> Self {
        Self::synthesize(ErrorKind::Transport, error.to_string())
    }

    pub fn not_found() -> Self {
        Self::synthesize(ErrorKind::NotFound, "Not found")
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// The `message` field of the body, if it has a string one.
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}

impl fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{}: {}", self.kind, message),
            None if self.body.is_null() => write!(f, "{}", self.kind),
            None => write!(f, "{}: {}", self.kind, self.body),
        }
    }
}

impl std::error::Error for ErrorPayload {}
