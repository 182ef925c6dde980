//! Runtime abstraction for local system access.
//!
//! Release assets are read through this trait so the upload path can be
//! exercised without touching the disk.

mod fs;

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runtime: Send + Sync {
    /// Read the full contents of a file.
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>>;
}

pub struct RealRuntime;

#[async_trait]
impl Runtime for RealRuntime {
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        self.read_file_impl(path).await
    }
}
