//! Authenticated requests and response classification.

mod classify;
mod error;
mod request;

pub use classify::{BAD_CREDENTIALS, ResponseResult, classify};
pub use error::{ErrorKind, ErrorPayload};
pub use request::{ACCEPT_RELEASES, AuthenticatedRequest};
