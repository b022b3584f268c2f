use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::error::ApodError;

/// Astronomy Picture of the Day metadata, kept as the JSON object NASA sent.
///
/// Keys keep their upstream order and values (including explicit `null`s).
/// Only `title` and `explanation` are ever rewritten, in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(
    value_type = Object,
    example = json!({
        "date": "2024-05-01",
        "explanation": "Uma galáxia espiral.",
        "media_type": "image",
        "title": "Galáxia",
        "url": "https://apod.nasa.gov/apod/image/2405/galaxy.jpg"
    })
)]
pub struct ApodRecord(Map<String, Value>);

impl ApodRecord {
    /// Decode a NASA response body; an empty body or JSON `null` is
    /// an empty payload.
    pub fn from_body(body: &[u8]) -> Result<Self, ApodError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ApodError::EmptyPayload);
        }
        serde_json::from_slice::<Option<Map<String, Value>>>(body)?
            .map(ApodRecord)
            .ok_or(ApodError::EmptyPayload)
    }

    pub fn title(&self) -> Option<&str> {
        self.text("title")
    }

    pub fn explanation(&self) -> Option<&str> {
        self.text("explanation")
    }

    /// Image or video URL provided by NASA.
    pub fn url(&self) -> Option<&str> {
        self.text("url")
    }

    pub fn set_title(&mut self, title: String) {
        self.replace_text("title", title);
    }

    pub fn set_explanation(&mut self, explanation: String) {
        self.replace_text("explanation", explanation);
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Only string slots are rewritten; absent or non-string keys stay as they are.
    fn replace_text(&mut self, key: &str, text: String) {
        if let Some(slot) = self.0.get_mut(key).filter(|v| v.is_string()) {
            *slot = Value::String(text);
        }
    }
}

pub const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// Raw bytes downloaded from an APOD media URL.
#[derive(Debug, Clone)]
pub struct MediaPayload {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl MediaPayload {
    pub fn content_type(&self) -> &str {
        self.content_type.as_deref().unwrap_or(DEFAULT_MEDIA_TYPE)
    }

    /// Videos and HTML pages (e.g. embedded players) are not served as images.
    pub fn is_image_like(&self) -> bool {
        !is_non_image(self.content_type())
    }
}

/// True for `video/*` and `text/html`, ignoring parameters and case.
pub fn is_non_image(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let (top, sub) = essence.split_once('/').unwrap_or((essence.as_str(), ""));

    top == "video" || (top == "text" && sub == "html")
}
