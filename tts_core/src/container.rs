//! Container recognition and final-bytes preparation.

use base64::{engine::general_purpose, Engine as _};

use crate::wav::{convert_to_wav, WavError};

/// File extension used for payloads we wrap ourselves.
pub const WAV_EXTENSION: &str = ".wav";

/// Resolve a file extension for audio types that already carry their own
/// container metadata. Raw PCM types (`audio/L16`, `audio/pcm`) are not
/// self-describing and yield `None`.
pub fn extension_for_mime(mime_type: &str) -> Option<&'static str> {
    let essence = mime_type.split(';').next().unwrap_or("").trim();

    let ext = match essence.to_ascii_lowercase().as_str() {
        "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => ".wav",
        "audio/mpeg" | "audio/mp3" => ".mp3",
        "audio/ogg" => ".ogg",
        "audio/opus" => ".opus",
        "audio/flac" | "audio/x-flac" => ".flac",
        "audio/aac" => ".aac",
        "audio/mp4" | "audio/x-m4a" => ".m4a",
        "audio/webm" => ".webm",
        _ => return None,
    };
    Some(ext)
}

/// Audio ready to hand to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedAudio {
    pub bytes: Vec<u8>,
    pub file_extension: &'static str,
    /// MIME type as reported by the upstream, untouched.
    pub mime_type: String,
    /// True when a WAV header was synthesized around the payload.
    pub wrapped: bool,
}

impl PreparedAudio {
    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.bytes)
    }

    /// Content type describing `bytes` as they will be delivered.
    pub fn content_type(&self) -> &str {
        if self.wrapped {
            "audio/wav"
        } else {
            &self.mime_type
        }
    }
}

/// Pass self-describing payloads through, wrap raw PCM in a WAV container.
pub fn prepare_audio(payload: Vec<u8>, mime_type: &str) -> Result<PreparedAudio, WavError> {
    if let Some(file_extension) = extension_for_mime(mime_type) {
        return Ok(PreparedAudio {
            bytes: payload,
            file_extension,
            mime_type: mime_type.to_string(),
            wrapped: false,
        });
    }

    Ok(PreparedAudio {
        bytes: convert_to_wav(&payload, mime_type)?,
        file_extension: WAV_EXTENSION,
        mime_type: mime_type.to_string(),
        wrapped: true,
    })
}
