use crate::config::Config;
use crate::error::ClientError;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// HTTP client for the remote answering service.
///
/// One operation: send the user's raw text, get a plain-text (or Markdown)
/// answer back. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct AnswerClient {
    base: Url,
    client: reqwest::Client,
}

impl AnswerClient {
    pub fn new(base: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { base, client })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.endpoint()?, config.request_timeout())
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Build `<base>/<percent-encoded input>`.
    ///
    /// The input is used verbatim (not trimmed) and always becomes a single
    /// path segment, so `/`, `?` and `#` are escaped. A bare `.` or `..`
    /// (even percent-encoded) is normalized away by URL parsing and is
    /// rejected instead of silently requesting the base.
    pub fn request_url(&self, input: &str) -> Result<Url, ClientError> {
        if matches!(input, "." | "..") {
            return Err(ClientError::DotSegment(input.to_string()));
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push(input);
        Ok(url)
    }

    /// Ask the service. Any transport error or non-2xx status is a failure.
    pub async fn ask(&self, input: &str) -> Result<String, ClientError> {
        let url = self.request_url(input)?;
        debug!(%url, "sending question");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "answering service returned an error status");
            return Err(ClientError::Status { status, body });
        }

        let body = response.text().await?;
        debug!(bytes = body.len(), "received answer");
        Ok(body)
    }
}
