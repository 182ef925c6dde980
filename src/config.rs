//! Credentials and client configuration handed to [`crate::release::ReleaseClient`].

use anyhow::{Context, Result, anyhow};
use log::debug;
use reqwest::Client;
use std::fmt;
use std::str::FromStr;

/// Default GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Repository identifier (owner/repo format).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoId {
    pub owner: String,
    pub repo: String,
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            Err(anyhow!("Invalid repository format. Expected 'owner/repo'."))
        } else {
            Ok(RepoId {
                owner: parts[0].to_string(),
                repo: parts[1].to_string(),
            })
        }
    }
}

/// Who we are and which repository we publish to.
///
/// Immutable once built. The secret has no public accessor; only
/// [`crate::http::AuthenticatedRequest`] reads it to build the
/// `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identity: String,
    secret: String,
    pub owner: String,
    pub repository: String,
}

impl Credentials {
    pub fn new(
        identity: impl Into<String>,
        secret: impl Into<String>,
        owner: impl Into<String>,
        repository: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
            owner: owner.into(),
            repository: repository.into(),
        }
    }

    pub fn for_repo(identity: impl Into<String>, secret: impl Into<String>, repo: RepoId) -> Self {
        Self::new(identity, secret, repo.owner, repo.repo)
    }

    pub(crate) fn secret(&self) -> &str {
        &self.secret
    }

    /// `<api_url>/repos/{owner}/{repository}/releases`
    pub fn releases_url(&self, api_url: &str) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            api_url.trim_end_matches('/'),
            self.owner,
            self.repository
        )
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"*********")
            .field("owner", &self.owner)
            .field("repository", &self.repository)
            .finish()
    }
}

/// Everything a client needs before it can talk to the service.
pub struct Config {
    pub credentials: Credentials,
    pub api_url: String,
    pub client: Client,
}

impl Config {
    pub fn new(credentials: Credentials, api_url: Option<String>) -> Result<Self> {
        let api_url = api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());

        debug!(
            "Publishing to {}/{} as {} via {}",
            credentials.owner, credentials.repository, credentials.identity, api_url
        );

        let client = Client::builder()
            .user_agent("grel-cli")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            credentials,
            api_url,
            client,
        })
    }
}
