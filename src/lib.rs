//! Create releases on a hosted repository service and attach files to them.
//!
//! [`release::ReleaseClient`] is the entry point. It sends every call through
//! [`http::AuthenticatedRequest`] and hands freshly created releases to
//! [`upload::UploadCoordinator`], which uploads all assets concurrently and
//! reports a single outcome.

pub mod config;
pub mod http;
pub mod release;
pub mod runtime;
pub mod upload;

pub use config::{Config, Credentials, RepoId};
pub use http::{ErrorKind, ErrorPayload};
pub use release::{Release, ReleaseClient};
