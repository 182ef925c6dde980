//! Attaching local files to an existing release.

mod asset;
mod fan_in;

use log::{debug, warn};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Client, Method};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

pub use asset::{DEFAULT_CONTENT_TYPE, asset_name, content_type, upload_url};
pub use fan_in::{Delivery, FanIn};

use crate::config::Credentials;
use crate::http::{AuthenticatedRequest, ErrorKind, ErrorPayload};
use crate::release::Release;
use crate::runtime::Runtime;

/// Uploads a batch of files to a release, one concurrent task per file.
///
/// Upload tasks are never cancelled. A batch can resolve with an error while
/// some of its uploads are still running; [`UploadCoordinator::wait_idle`]
/// waits for those before the runtime goes away.
pub struct UploadCoordinator<R: Runtime> {
    client: Client,
    credentials: Arc<Credentials>,
    runtime: Arc<R>,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl<R: Runtime + 'static> UploadCoordinator<R> {
    pub fn new(client: Client, credentials: Arc<Credentials>, runtime: Arc<R>) -> Self {
        Self {
            client,
            credentials,
            runtime,
            in_flight: Mutex::new(Vec::new()),
        }
    }

    /// Waits until every upload task spawned so far has finished.
    pub async fn wait_idle(&self) {
        let handles = std::mem::take(
            &mut *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner),
        );
        if !handles.is_empty() {
            debug!("Waiting for {} upload task(s) to finish", handles.len());
        }
        for handle in handles {
            // A panicked task has already resolved its batch as interrupted.
            let _ = handle.await;
        }
    }

    /// Attaches `files` to `release`.
    ///
    /// Resolves with the unchanged release once every upload succeeded, or
    /// with the first error in completion order. Uploads still in flight when
    /// the batch fails are not cancelled; their outcomes are only logged.
    #[tracing::instrument(skip(self, release), fields(tag = %release.tag_name))]
    pub async fn attach(
        &self,
        release: Release,
        files: &[PathBuf],
    ) -> Result<Release, ErrorPayload> {
        if files.is_empty() {
            debug!("No assets to attach to {}", release.tag_name);
            return Ok(release);
        }

        let template = release.upload_url.clone();
        let (fan_in, done) = FanIn::new(files.len(), release);
        let fan_in = Arc::new(Mutex::new(fan_in));
        let mut handles = Vec::with_capacity(files.len());

        for path in files {
            let upload = AssetUpload {
                client: self.client.clone(),
                credentials: Arc::clone(&self.credentials),
                runtime: Arc::clone(&self.runtime),
                template: template.clone(),
                path: path.clone(),
            };
            let fan_in = Arc::clone(&fan_in);

            handles.push(tokio::spawn(async move {
                let path = upload.path.clone();
                let outcome = upload.run().await;
                let error = outcome.as_ref().err().map(ToString::to_string);

                let delivery = fan_in
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .complete(outcome);

                match (delivery, error) {
                    (Delivery::Ignored, Some(e)) => warn!(
                        "Upload of {} failed after the batch had already failed: {}",
                        path.display(),
                        e
                    ),
                    (_, Some(e)) => debug!("Upload of {} failed: {}", path.display(), e),
                    (_, None) => debug!("Uploaded {}", path.display()),
                }
            }));
        }

        {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            in_flight.retain(|handle| !handle.is_finished());
            in_flight.extend(handles);
        }

        // Only the upload tasks may keep the sender alive from here on.
        drop(fan_in);

        done.await.unwrap_or_else(|_| {
            Err(ErrorPayload::synthesize(
                ErrorKind::Interrupted,
                "Upload tasks ended without reporting an outcome",
            ))
        })
    }
}

/// Everything one upload task needs, owned so it can be spawned.
struct AssetUpload<R: Runtime> {
    client: Client,
    credentials: Arc<Credentials>,
    runtime: Arc<R>,
    template: String,
    path: PathBuf,
}

impl<R: Runtime> AssetUpload<R> {
    async fn run(self) -> Result<(), ErrorPayload> {
        let bytes = self
            .runtime
            .read_file(&self.path)
            .await
            .map_err(|e| ErrorPayload::synthesize(ErrorKind::Io, format!("{:#}", e)))?;

        let name = asset_name(&self.path).ok_or_else(|| {
            ErrorPayload::synthesize(
                ErrorKind::Io,
                format!("{} has no file name", self.path.display()),
            )
        })?;
        let url = upload_url(&self.template, &name);

        let mut request = AuthenticatedRequest::new(self.client, &self.credentials);
        request.header(CONTENT_TYPE.as_str(), content_type(&self.path));
        request.header(CONTENT_LENGTH.as_str(), bytes.len().to_string());
        request.body(bytes);

        request.send(Method::POST, &url).await.map(|_| ())
    }
}
