//! Wire types for `streamGenerateContent`.

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Deserializer, Serialize};

/// Request body for a single-turn speech generation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<RequestContent<'a>>,
    pub generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
pub struct RequestContent<'a> {
    pub role: &'a str,
    pub parts: Vec<TextPart<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TextPart<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig<'a> {
    pub temperature: f32,
    pub response_modalities: Vec<&'a str>,
    pub speech_config: SpeechConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig<'a> {
    pub voice_config: VoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig<'a> {
    pub prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig<'a> {
    pub voice_name: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    pub fn speech(text: &'a str, voice: &'a str, temperature: f32) -> Self {
        Self {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![TextPart { text }],
            }],
            generation_config: GenerationConfig {
                temperature,
                response_modalities: vec!["audio"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig { voice_name: voice },
                    },
                },
            },
        }
    }
}

/// One streamed response record. Every level may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseChunk {
    pub candidates: Option<Vec<Candidate>>,
    /// Set when the upstream reports a failure inside the stream.
    pub error: Option<UpstreamError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Content {
    pub parts: Option<Vec<Part>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub text: Option<String>,
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, deserialize_with = "base64_bytes")]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamError {
    pub code: Option<i64>,
    pub message: Option<String>,
    pub status: Option<String>,
}

impl ResponseChunk {
    /// First part of the first candidate, if it carries non-empty inline data.
    pub fn into_inline_audio(self) -> Option<InlineData> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .inline_data
            .filter(|d| !d.data.is_empty())
    }
}

fn base64_bytes<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let encoded = String::deserialize(deserializer)?;
    general_purpose::STANDARD
        .decode(encoded.as_bytes())
        .map_err(serde::de::Error::custom)
}
