//! Common utilities for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use futures_util::stream;
use gemini_core::{ChunkStream, ResponseChunk, SpeechSource};
use serde_json::{json, Value};
use tower::ServiceExt;

use tts_server::{build_router, config::ServerConfig, AppState};

/// (text, voice) pairs seen by the scripted source.
pub type CallLog = Arc<Mutex<Vec<(String, String)>>>;

/// Replays a fixed list of response chunks for every request.
pub struct ScriptedSource {
    chunks: Vec<Value>,
    fail_with: Option<String>,
    calls: CallLog,
}

impl ScriptedSource {
    pub fn new(chunks: Vec<Value>) -> Self {
        Self {
            chunks,
            fail_with: None,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }
}

#[async_trait]
impl SpeechSource for ScriptedSource {
    async fn stream_speech(&self, text: &str, voice: &str) -> anyhow::Result<ChunkStream> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), voice.to_string()));

        if let Some(ref message) = self.fail_with {
            anyhow::bail!("{}", message);
        }

        let chunks: Vec<anyhow::Result<ResponseChunk>> = self
            .chunks
            .iter()
            .map(|v| serde_json::from_value::<ResponseChunk>(v.clone()).map_err(anyhow::Error::from))
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}

pub fn audio_chunk(data: &[u8], mime_type: &str) -> Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{ "inlineData": { "mimeType": mime_type, "data": general_purpose::STANDARD.encode(data) } }]
            }
        }]
    })
}

pub fn text_chunk(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

pub fn pcm_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 253) as u8).collect()
}

/// App backed by `source`; `None` simulates a missing API key.
pub fn create_test_app(source: Option<ScriptedSource>) -> Router {
    let source = source.map(|s| Arc::new(s) as Arc<dyn SpeechSource>);
    build_router(AppState::new(ServerConfig::default(), source))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

pub fn decode_audio(response: &Value) -> Vec<u8> {
    general_purpose::STANDARD
        .decode(response["audio_base64"].as_str().unwrap())
        .unwrap()
}
