use reqwest::{header, Client};
use tracing::{debug, error, warn};

use super::model::{ApodRecord, MediaPayload};
use crate::error::ApodError;
use crate::utils::text::truncate;

/// Client for the NASA APOD endpoint and the media it links to.
#[derive(Debug, Clone)]
pub struct NasaClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl NasaClient {
    pub fn new(client: Client, api_url: String, api_key: String) -> Self {
        Self {
            client,
            api_url,
            api_key,
        }
    }

    /// `GET <api_url>?api_key=<key>`.
    pub async fn fetch_apod(&self) -> Result<ApodRecord, ApodError> {
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            // The URL carries the API key; keep it out of errors and logs.
            .map_err(|e| ApodError::Transport(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %truncate(&body), "NASA APOD returned an error status");
            return Err(ApodError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApodError::Transport(e.without_url()))?;

        match ApodRecord::from_body(&body) {
            Ok(apod) => {
                debug!(title = ?apod.title(), url = ?apod.url(), "fetched APOD");
                Ok(apod)
            }
            Err(e) => {
                warn!(error = %e, body = %truncate(&String::from_utf8_lossy(&body)), "unusable APOD payload");
                Err(e)
            }
        }
    }

    /// Download the media referenced by an APOD record.
    pub async fn fetch_media(&self, url: &str) -> Result<MediaPayload, ApodError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ApodError::Transport)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        if !status.is_success() {
            warn!(%status, %url, "media download failed");
            return Err(ApodError::MediaUnavailable {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(ApodError::Transport)?;
        if bytes.is_empty() {
            warn!(%status, %url, "media download returned an empty body");
            return Err(ApodError::MediaUnavailable {
                status: status.as_u16(),
            });
        }

        debug!(%url, content_type = ?content_type, len = bytes.len(), "downloaded APOD media");
        Ok(MediaPayload {
            content_type,
            bytes,
        })
    }
}
