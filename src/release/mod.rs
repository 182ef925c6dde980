//! Creating, finding and removing releases.

use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{Config, Credentials};
use crate::http::{AuthenticatedRequest, ErrorKind, ErrorPayload};
use crate::runtime::Runtime;
use crate::upload::UploadCoordinator;

/// A release as returned by the service.
///
/// Only `tag_name` and `upload_url` are interpreted. Every other field is
/// kept as-is and written back unchanged.
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
pub struct Release {
    pub tag_name: String,
    /// URL template with a `{?name}` style placeholder for the asset name.
    pub upload_url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Release {
    pub fn from_value(value: Value) -> Result<Self, ErrorPayload> {
        serde_json::from_value(value).map_err(|e| {
            ErrorPayload::synthesize(ErrorKind::Parse, format!("Unexpected release payload: {}", e))
        })
    }

    pub fn id(&self) -> Option<u64> {
        self.extra.get("id").and_then(Value::as_u64)
    }
}

pub struct ReleaseClient<R: Runtime> {
    client: Client,
    credentials: Arc<Credentials>,
    api_url: String,
    uploader: UploadCoordinator<R>,
}

impl<R: Runtime + 'static> ReleaseClient<R> {
    pub fn new(config: Config, runtime: R) -> Self {
        let credentials = Arc::new(config.credentials);
        let uploader = UploadCoordinator::new(
            config.client.clone(),
            Arc::clone(&credentials),
            Arc::new(runtime),
        );

        Self {
            client: config.client,
            credentials,
            api_url: config.api_url,
            uploader,
        }
    }

    pub fn releases_url(&self) -> String {
        self.credentials.releases_url(&self.api_url)
    }

    fn request(&self) -> AuthenticatedRequest {
        AuthenticatedRequest::new(self.client.clone(), &self.credentials)
    }

    /// Creates a release tagged `name` and attaches `files` to it.
    ///
    /// Nothing is uploaded unless the release was created.
    #[tracing::instrument(skip(self, message))]
    pub async fn create(
        &self,
        name: &str,
        message: &str,
        files: &[PathBuf],
    ) -> Result<Release, ErrorPayload> {
        let payload = json!({
            "tag_name": name,
            "name": name,
            "body": message,
            "draft": false,
            "prerelease": false,
        });

        let mut request = self.request();
        request.header(CONTENT_TYPE.as_str(), "application/json");
        request.body(payload.to_string());

        let created = request.send(Method::POST, &self.releases_url()).await?;
        let release = Release::from_value(created)?;
        debug!(
            "Created release {}, attaching {} file(s)",
            release.tag_name,
            files.len()
        );

        self.attach(release, files).await
    }

    /// Attaches `files` to an existing release.
    pub async fn attach(&self, release: Release, files: &[PathBuf]) -> Result<Release, ErrorPayload> {
        self.uploader.attach(release, files).await
    }

    /// Waits for uploads that were still running when their batch failed.
    pub async fn wait_for_uploads(&self) {
        self.uploader.wait_idle().await
    }

    /// Finds the first release tagged `tag` on the first page of releases.
    #[tracing::instrument(skip(self))]
    pub async fn find(&self, tag: &str) -> Result<Release, ErrorPayload> {
        let listed = self.request().send(Method::GET, &self.releases_url()).await?;

        let Value::Array(releases) = listed else {
            return Err(ErrorPayload::synthesize(
                ErrorKind::Parse,
                "Expected a list of releases",
            ));
        };
        debug!("Scanning {} release(s) for {}", releases.len(), tag);

        releases
            .into_iter()
            .find(|release| release.get("tag_name").and_then(Value::as_str) == Some(tag))
            .ok_or_else(ErrorPayload::not_found)
            .and_then(Release::from_value)
    }

    /// Deletes a release by its `id`. Assets go with it.
    #[tracing::instrument(skip(self, release), fields(tag = %release.tag_name))]
    pub async fn remove(&self, release: &Release) -> Result<(), ErrorPayload> {
        let id = release.id().ok_or_else(|| {
            ErrorPayload::synthesize(
                ErrorKind::Request,
                format!("Release {} has no id", release.tag_name),
            )
        })?;

        let url = format!("{}/{}", self.releases_url(), id);
        self.request().send(Method::DELETE, &url).await.map(|_| ())
    }
}
