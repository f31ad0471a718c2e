use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API Error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("API key not set")]
    MissingApiKey,

    #[error("Failed to generate audio")]
    GenerationFailed,

    #[error("TTS error: {0}")]
    TtsError(#[from] anyhow::Error),

    #[error("Audio container error: {0}")]
    Container(#[from] tts_core::WavError),
}

/// Error response structure
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingApiKey
            | ApiError::GenerationFailed
            | ApiError::TtsError(_)
            | ApiError::Container(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::InvalidInput(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::InvalidInput(_) => {}
            ApiError::MissingApiKey => tracing::error!("GEMINI_API_KEY is not configured"),
            ApiError::GenerationFailed => tracing::warn!("No audio produced by upstream stream"),
            ApiError::TtsError(e) => tracing::error!("TTS error: {:#}", e),
            ApiError::Container(e) => tracing::error!("Container error: {}", e),
        }

        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.public_message(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}
