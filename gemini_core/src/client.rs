use std::pin::Pin;

use anyhow::{Context, Result};
use async_stream::stream;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use reqwest::Client;
use tracing::{debug, warn};

use crate::sse::SseDecoder;
use crate::types::{GenerateContentRequest, ResponseChunk};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-tts";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Lazy, finite sequence of response chunks. Dropping it abandons the
/// upstream response.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ResponseChunk>> + Send>>;

/// Anything that can turn text into a stream of speech response chunks.
#[async_trait]
pub trait SpeechSource: Send + Sync {
    async fn stream_speech(&self, text: &str, voice: &str) -> Result<ChunkStream>;
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 1.0,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl SpeechSource for GeminiClient {
    async fn stream_speech(&self, text: &str, voice: &str) -> Result<ChunkStream> {
        let body = GenerateContentRequest::speech(text, voice, self.config.temperature);

        debug!(model = %self.config.model, voice, text_len = text.len(), "Starting speech stream");

        let resp = self
            .client
            .post(self.config.stream_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to reach Gemini API")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error {status}: {body}");
        }

        Ok(decode_chunks(resp.bytes_stream()))
    }
}

/// Turn a server-sent-events byte stream into response chunks.
///
/// Events that are not valid chunk JSON are logged and skipped.
pub fn decode_chunks<S, B, E>(bytes: S) -> ChunkStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let out = stream! {
        let mut bytes = Box::pin(bytes);
        let mut decoder = SseDecoder::new();

        while let Some(chunk) = bytes.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(anyhow::Error::new(e).context("Gemini stream error"));
                    return;
                }
            };
            for event in decoder.push(chunk.as_ref()) {
                if let Some(parsed) = parse_event(&event) {
                    yield Ok(parsed);
                }
            }
        }

        if let Some(event) = decoder.finish() {
            if let Some(parsed) = parse_event(&event) {
                yield Ok(parsed);
            }
        }
    };
    Box::pin(out)
}

fn parse_event(event: &str) -> Option<ResponseChunk> {
    if event.trim() == "[DONE]" {
        return None;
    }
    match serde_json::from_str(event) {
        Ok(chunk) => Some(chunk),
        Err(e) => {
            warn!(error = %e, "Skipping undecodable stream event");
            None
        }
    }
}
