//! Client for the Gemini streaming speech-generation API.

mod client;
mod sse;
mod types;

pub use client::{
    decode_chunks, ChunkStream, GeminiClient, GeminiConfig, SpeechSource, DEFAULT_BASE_URL,
    DEFAULT_MODEL,
};
pub use sse::SseDecoder;
pub use types::{
    Candidate, Content, GenerateContentRequest, InlineData, Part, ResponseChunk, UpstreamError,
};

/// Voice used when a request does not name one.
pub const DEFAULT_VOICE: &str = "Zephyr";

/// Prebuilt voices published for the speech models.
pub const PREBUILT_VOICES: &[&str] = &[
    "Zephyr",
    "Puck",
    "Charon",
    "Kore",
    "Fenrir",
    "Leda",
    "Orus",
    "Aoede",
    "Callirrhoe",
    "Autonoe",
    "Enceladus",
    "Iapetus",
    "Umbriel",
    "Algieba",
    "Despina",
    "Erinome",
    "Algenib",
    "Rasalgethi",
    "Laomedeia",
    "Achernar",
    "Alnilam",
    "Schedar",
    "Gacrux",
    "Pulcherrima",
    "Achird",
    "Zubenelgenubi",
    "Vindemiatrix",
    "Sadachbia",
    "Sadaltager",
    "Sulafat",
];
