use async_trait::async_trait;
use serde::Deserialize;

use crate::error::TranslationError;

/// Wire shape of a MyMemory `/get` response. Only `translatedText` is read.
#[derive(Debug, Deserialize)]
pub struct TranslationResponse {
    #[serde(rename = "responseData")]
    pub response_data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseData {
    #[serde(rename = "translatedText")]
    pub translated_text: Option<String>,
}

impl TranslationResponse {
    pub fn into_translated_text(self) -> Option<String> {
        self.response_data.and_then(|d| d.translated_text)
    }
}

/// A remote service that translates one API-sized piece of text.
///
/// Implementations report failures; degrading to the original text is the
/// caller's job.
#[async_trait]
pub trait TranslateInterface: Send + Sync {
    async fn translate_chunk(&self, chunk: &str) -> Result<String, TranslationError>;
}
