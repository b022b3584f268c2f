use std::sync::Arc;
use tracing::{debug, error, warn};

use super::chunker::{plan_chunks, Chunk, MAX_CHUNK};
use super::interface::TranslateInterface;
use crate::error::TranslationError;

type ChunkPlanner = fn(&str) -> Result<Vec<Chunk>, TranslationError>;

/// English to Brazilian Portuguese translator.
///
/// Long texts are translated chunk by chunk, in order. Every failure
/// degrades to the untranslated text; callers never see an error.
#[derive(Clone)]
pub struct Translator {
    backend: Arc<dyn TranslateInterface>,
}

impl Translator {
    pub fn new(backend: Arc<dyn TranslateInterface>) -> Self {
        Self { backend }
    }

    /// `None` stays `None`.
    pub async fn translate(&self, text: Option<&str>) -> Option<String> {
        match text {
            Some(text) => Some(self.translate_text(text).await),
            None => None,
        }
    }

    pub async fn translate_text(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return text.to_string();
        }

        if text.chars().count() <= MAX_CHUNK {
            return self.translate_chunk(text).await;
        }

        self.translate_long(text, plan_chunks).await
    }

    /// Any planning or slicing failure discards partial work and returns `text`.
    async fn translate_long(&self, text: &str, plan: ChunkPlanner) -> String {
        match self.translate_chunked(text, plan).await {
            Ok(translated) => translated,
            Err(e) => {
                error!(error = %e, "chunked translation failed, returning original text");
                text.to_string()
            }
        }
    }

    async fn translate_chunked(
        &self,
        text: &str,
        plan: ChunkPlanner,
    ) -> Result<String, TranslationError> {
        let chunks = plan(text)?;
        debug!(chunks = chunks.len(), bytes = text.len(), "translating long text in chunks");

        let mut result = String::with_capacity(text.len());
        for chunk in &chunks {
            let translated = self.translate_chunk(chunk.slice(text)?).await;
            result.push_str(&translated);

            if chunk.end < text.len() && !translated.ends_with(' ') {
                result.push(' ');
            }
        }

        Ok(result)
    }

    /// One remote call; the chunk itself comes back on failure.
    pub async fn translate_chunk(&self, chunk: &str) -> String {
        match self.backend.translate_chunk(chunk).await {
            Ok(translated) => translated,
            Err(TranslationError::MissingText) => {
                warn!("invalid translation response, returning original text");
                chunk.to_string()
            }
            Err(e) => {
                error!(error = %e, "translation API call failed, returning original text");
                chunk.to_string()
            }
        }
    }
}
