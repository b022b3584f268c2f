use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

use super::interface::{TranslateInterface, TranslationResponse};
use crate::error::TranslationError;
use crate::utils::text::truncate;

/// Client for the MyMemory `/get` translation endpoint.
#[derive(Debug, Clone)]
pub struct MyMemoryClient {
    client: Client,
    api_url: String,
    langpair: String,
}

impl MyMemoryClient {
    pub fn new(client: Client, api_url: String, langpair: String) -> Self {
        Self {
            client,
            api_url,
            langpair,
        }
    }
}

#[async_trait]
impl TranslateInterface for MyMemoryClient {
    async fn translate_chunk(&self, chunk: &str) -> Result<String, TranslationError> {
        debug!(chars = chunk.chars().count(), "requesting MyMemory translation");

        // `query` form-encodes the whole chunk, including `|`, quotes and newlines.
        let response = self
            .client
            .get(&self.api_url)
            .query(&[("q", chunk), ("langpair", self.langpair.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %truncate(&body), "MyMemory non-success");
            return Err(TranslationError::Status(status.as_u16()));
        }

        response
            .json::<TranslationResponse>()
            .await?
            .into_translated_text()
            .ok_or(TranslationError::MissingText)
    }
}
