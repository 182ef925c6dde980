//! Turns a status code and a raw body into a success or failure.

use serde_json::Value;

use super::error::{ErrorKind, ErrorPayload};

/// Outcome of a single request: the parsed body, or why it failed.
pub type ResponseResult = Result<Value, ErrorPayload>;

/// Message GitHub sends with a 2xx status when the credentials are wrong.
pub const BAD_CREDENTIALS: &str = "Bad credentials";

/// Messages that mark an otherwise successful body as a failure.
const SOFT_ERRORS: &[&str] = &[BAD_CREDENTIALS];

/// Classifies a complete response.
///
/// The body is always parsed first, so an unparsable body is a failure even
/// under a 2xx status. Statuses in `200..=206` succeed unless the body carries
/// a known soft-error message; every other status fails with the parsed body
/// as payload.
pub fn classify(status: u16, body: &[u8]) -> ResponseResult {
    let json = parse_body(status, body)?;

    if !(200..=206).contains(&status) {
        return Err(ErrorPayload::new(ErrorKind::Status(status), json));
    }

    match json.get("message").and_then(Value::as_str) {
        Some(message) if SOFT_ERRORS.contains(&message) => {
            Err(ErrorPayload::new(ErrorKind::Rejected, json))
        }
        _ => Ok(json),
    }
}

/// Parses a response body. Empty bodies (e.g. `204 No Content`) are `null`.
fn parse_body(status: u16, body: &[u8]) -> Result<Value, ErrorPayload> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(body).map_err(|e| {
        ErrorPayload::synthesize(
            ErrorKind::Parse,
            format!("Failed to parse response body (HTTP {}): {}", status, e),
        )
    })
}
