//! A single authenticated request to the release API.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use std::collections::BTreeMap;
use url::Url;

use super::classify::{ResponseResult, classify};
use super::error::{ErrorKind, ErrorPayload};
use crate::config::Credentials;

/// Media type the release API expects on every request.
pub const ACCEPT_RELEASES: &str = "application/vnd.github.manifold-preview";

/// One request with the authentication and accept headers already set.
///
/// Every request owns its headers and body. `send` consumes it, so a request
/// is sent at most once and resolves exactly once.
pub struct AuthenticatedRequest {
    client: Client,
    headers: BTreeMap<String, String>,
    body: Option<Vec<u8>>,
}

impl AuthenticatedRequest {
    pub fn new(client: Client, credentials: &Credentials) -> Self {
        let token = STANDARD.encode(format!("{}:{}", credentials.identity, credentials.secret()));

        let mut request = Self {
            client,
            headers: BTreeMap::new(),
            body: None,
        };
        request.header(AUTHORIZATION.as_str(), format!("Basic {}", token));
        request.header(ACCEPT.as_str(), ACCEPT_RELEASES);
        request
    }

    /// Sets a header. Names are case-insensitive; the last value set wins.
    pub fn header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn body(&mut self, content: impl Into<Vec<u8>>) {
        self.body = Some(content.into());
    }

    /// Sends the request and classifies the complete response.
    ///
    /// Transport failures, including a body stream that breaks off halfway,
    /// come back as [`ErrorKind::Transport`]. Nothing is retried.
    #[tracing::instrument(skip(self))]
    pub async fn send(self, method: Method, url: &str) -> ResponseResult {
        let location = Url::parse(url).map_err(|e| {
            ErrorPayload::synthesize(ErrorKind::Request, format!("Invalid URL {}: {}", url, e))
        })?;

        debug!(
            "{} {}{} ({} bytes)",
            method,
            location.host_str().unwrap_or_default(),
            location.path(),
            self.body.as_ref().map_or(0, Vec::len)
        );

        let headers = self.header_map()?;
        let mut request = self.client.request(method, location).headers(headers);
        if let Some(body) = self.body {
            request = request.body(body);
        }

        let mut response = request.send().await.map_err(ErrorPayload::transport)?;
        let status = response.status().as_u16();

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(ErrorPayload::transport)? {
            body.extend_from_slice(&chunk);
        }

        debug!("HTTP {} with {} bytes", status, body.len());

        classify(status, &body)
    }

    fn header_map(&self) -> Result<HeaderMap, ErrorPayload> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let invalid = |e: &dyn std::fmt::Display| {
                ErrorPayload::synthesize(
                    ErrorKind::Request,
                    format!("Invalid header {}: {}", name, e),
                )
            };
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(&e))?;
            let mut header_value = HeaderValue::from_str(value).map_err(|e| invalid(&e))?;
            if header_name == AUTHORIZATION {
                header_value.set_sensitive(true);
            }
            map.insert(header_name, header_value);
        }
        Ok(map)
    }
}
