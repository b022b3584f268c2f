use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// Failures surfaced to API clients by the APOD handlers.
#[derive(Error, Debug)]
pub enum ApodError {
    /// NASA answered with a non-2xx status; relayed to the client.
    #[error("NASA APOD returned status {status}")]
    UpstreamStatus { status: u16 },

    #[error("transport error talking to upstream: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("failed to decode NASA APOD payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("NASA APOD returned an empty payload")]
    EmptyPayload,

    #[error("NASA APOD payload has no media url")]
    MissingMediaUrl,

    #[error("media download failed or was empty (status {status})")]
    MediaUnavailable { status: u16 },
}

impl ApodError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApodError::UpstreamStatus { status } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApodError::Transport(_) | ApodError::Decode(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApodError::EmptyPayload
            | ApodError::MissingMediaUrl
            | ApodError::MediaUnavailable { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Portuguese message shown to the caller.
    pub fn client_message(&self) -> String {
        match self {
            ApodError::UpstreamStatus { status } => {
                let reason = StatusCode::from_u16(*status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("Unknown Status");
                format!("Erro ao acessar a API da NASA: {} {}", status, reason)
            }
            ApodError::Transport(_) | ApodError::Decode(_) => {
                "Serviço indisponível no momento. Tente novamente mais tarde.".to_string()
            }
            ApodError::EmptyPayload => {
                "Não foi possível obter os dados da NASA neste momento.".to_string()
            }
            ApodError::MissingMediaUrl => {
                "Não foi possível obter a URL da mídia da NASA neste momento.".to_string()
            }
            ApodError::MediaUnavailable { .. } => {
                "Não foi possível baixar a mídia da URL fornecida pela NASA.".to_string()
            }
        }
    }
}

impl IntoResponse for ApodError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        error!(%status, error = %self, "request failed");
        (status, self.client_message()).into_response()
    }
}

/// Why a single remote translation call produced nothing usable.
#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("translation API returned status {0}")]
    Status(u16),

    #[error("translation response has no translatedText")]
    MissingText,

    #[error("chunk range {start}..{end} is out of bounds for text of {len} bytes")]
    ChunkOutOfRange { start: usize, end: usize, len: usize },
}
