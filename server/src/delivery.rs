//! Turns an upstream speech stream into a deliverable audio artifact.

use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use gemini_core::{InlineData, ResponseChunk, SpeechSource};
use tracing::{debug, info, warn};
use tts_core::prepare_audio;

use crate::error::ApiError;

/// Final audio for one request.
#[derive(Debug, Clone)]
pub struct GeneratedAudio {
    pub audio_base64: String,
    pub file_extension: &'static str,
    /// MIME type exactly as the upstream reported it.
    pub mime_type: String,
    /// Type of the delivered bytes (`audio/wav` once wrapped).
    pub content_type: String,
    pub wrapped: bool,
    pub size_bytes: usize,
}

pub struct AudioDelivery {
    source: Arc<dyn SpeechSource>,
}

impl AudioDelivery {
    pub fn new(source: Arc<dyn SpeechSource>) -> Self {
        Self { source }
    }

    pub async fn generate(&self, text: &str, voice: &str) -> Result<GeneratedAudio, ApiError> {
        let chunks = self.source.stream_speech(text, voice).await?;
        let inline = first_inline_audio(chunks).await?;

        let prepared = prepare_audio(inline.data, &inline.mime_type)?;
        info!(
            voice,
            mime_type = %prepared.mime_type,
            wrapped = prepared.wrapped,
            bytes = prepared.bytes.len(),
            "Audio generated"
        );

        Ok(GeneratedAudio {
            audio_base64: prepared.to_base64(),
            file_extension: prepared.file_extension,
            content_type: prepared.content_type().to_string(),
            wrapped: prepared.wrapped,
            size_bytes: prepared.bytes.len(),
            mime_type: prepared.mime_type,
        })
    }
}

/// Pull chunks until one carries inline audio; the rest of the stream is
/// dropped unread.
pub async fn first_inline_audio<S>(mut chunks: S) -> Result<InlineData, ApiError>
where
    S: Stream<Item = anyhow::Result<ResponseChunk>> + Unpin,
{
    let mut seen = 0usize;
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        seen += 1;

        if let Some(err) = chunk.error.as_ref() {
            warn!(
                code = ?err.code,
                status = ?err.status,
                message = ?err.message,
                "Upstream reported an error in stream"
            );
        }

        match chunk.into_inline_audio() {
            Some(inline) => {
                debug!(chunk = seen, mime_type = %inline.mime_type, "Found inline audio");
                return Ok(inline);
            }
            None => debug!(chunk = seen, "Skipping chunk without inline audio"),
        }
    }

    warn!(chunks = seen, "Stream ended without inline audio");
    Err(ApiError::GenerationFailed)
}
