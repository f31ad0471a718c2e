pub mod config;
pub mod delivery;
pub mod error;
pub mod metrics;
pub mod page;
pub mod validation;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{DefaultBodyLimit, Query, Request, State},
    http::{HeaderValue, Method},
    middleware::Next,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use gemini_core::{SpeechSource, PREBUILT_VOICES};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::delivery::{AudioDelivery, GeneratedAudio};
use crate::error::ApiError;
use crate::metrics::{AppMetrics, MetricsResponse};
use crate::page::{render_page, PageOutcome};
use crate::validation::validate_generate_request;

#[derive(Clone)]
pub struct AppState {
    /// `None` when no API key is configured.
    pub delivery: Option<Arc<AudioDelivery>>,
    pub config: ServerConfig,
    pub metrics: AppMetrics,
}

impl AppState {
    pub fn new(config: ServerConfig, source: Option<Arc<dyn SpeechSource>>) -> Self {
        Self {
            delivery: source.map(|s| Arc::new(AudioDelivery::new(s))),
            config,
            metrics: AppMetrics::new(),
        }
    }
}

/// Body (POST) or query string (GET) of a generation request.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateAudioRequest {
    pub text: Option<String>,
    pub voice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerateAudioResponse {
    pub audio_base64: String,
    pub file_extension: String,
    pub mime_type: String,
}

impl From<GeneratedAudio> for GenerateAudioResponse {
    fn from(audio: GeneratedAudio) -> Self {
        Self {
            audio_base64: audio.audio_base64,
            file_extension: audio.file_extension.to_string(),
            mime_type: audio.mime_type,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let config = &state.config;
    let max_body_bytes = config.max_body_bytes;

    let middleware_stack = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors_layer(config))
        .into_inner();

    let api = Router::new()
        .route("/", get(page_endpoint))
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .route("/voices", get(list_voices))
        .route(
            "/generate-audio",
            get(generate_audio_query).post(generate_audio_json),
        )
        .route("/metrics", get(metrics_endpoint));

    Router::new()
        .merge(api.clone()) // root paths
        .nest("/api", api) // /api prefix
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(axum::middleware::from_fn(add_request_id))
        .layer(middleware_stack)
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    let origins: Vec<HeaderValue> = match config.cors_allowed_origins {
        Some(ref allowed) => allowed.iter().filter_map(|o| o.parse().ok()).collect(),
        None => {
            warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (development mode)");
            return base.allow_origin(Any);
        }
    };

    if origins.is_empty() {
        warn!("CORS_ALLOWED_ORIGINS is empty, falling back to permissive CORS");
        base.allow_origin(Any)
    } else {
        info!("CORS configured for {} origin(s)", origins.len());
        base.allow_origin(AllowOrigin::list(origins))
    }
}

async fn add_request_id(mut request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let header = HeaderValue::from_str(&request_id).ok();

    if let Some(ref value) = header {
        request.headers_mut().insert("x-request-id", value.clone());
    }
    let mut response = next.run(request).await;
    if let Some(value) = header {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_voices() -> Json<Vec<&'static str>> {
    Json(PREBUILT_VOICES.to_vec())
}

pub async fn generate_audio_json(
    State(state): State<AppState>,
    Json(req): Json<GenerateAudioRequest>,
) -> Result<Json<GenerateAudioResponse>, ApiError> {
    generate(&state, &req).await.map(|a| Json(a.into()))
}

pub async fn generate_audio_query(
    State(state): State<AppState>,
    Query(req): Query<GenerateAudioRequest>,
) -> Result<Json<GenerateAudioResponse>, ApiError> {
    generate(&state, &req).await.map(|a| Json(a.into()))
}

pub async fn page_endpoint(
    State(state): State<AppState>,
    Query(req): Query<GenerateAudioRequest>,
) -> Response {
    let voice = requested_voice(&req)
        .unwrap_or(state.config.default_voice.as_str())
        .to_string();

    let Some(text) = req.text.as_deref() else {
        return Html(render_page("", &voice, PageOutcome::Empty)).into_response();
    };

    match generate(&state, &req).await {
        Ok(audio) => Html(render_page(text, &voice, PageOutcome::Audio(&audio))).into_response(),
        Err(err) => {
            let html = render_page(text, &voice, PageOutcome::Error(&err));
            (err.status(), Html(html)).into_response()
        }
    }
}

pub async fn metrics_endpoint(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(MetricsResponse {
        timestamp: chrono::Utc::now(),
        uptime_seconds: state.metrics.uptime_seconds(),
        generate_audio: state.metrics.generate_audio.snapshot(),
        generation: state.metrics.generation.snapshot(),
    })
}

/// An empty voice field (e.g. an unset form select) means "use the default".
/// Anything else is forwarded untouched.
fn requested_voice(req: &GenerateAudioRequest) -> Option<&str> {
    req.voice.as_deref().filter(|v| !v.is_empty())
}

async fn generate(state: &AppState, req: &GenerateAudioRequest) -> Result<GeneratedAudio, ApiError> {
    let start_time = Instant::now();

    let result = async {
        let text = validate_generate_request(req.text.as_deref())?;
        let delivery = state.delivery.as_ref().ok_or(ApiError::MissingApiKey)?;
        let voice = requested_voice(req).unwrap_or(state.config.default_voice.as_str());

        info!("Generate request received: text length={}, voice={}", text.len(), voice);
        delivery.generate(text, voice).await
    }
    .await;

    let latency_ms = start_time.elapsed().as_millis() as u64;
    state.metrics.generate_audio.record_request(latency_ms);
    match &result {
        Ok(audio) => {
            state
                .metrics
                .generation
                .record_success(audio.wrapped, audio.size_bytes);
        }
        Err(err) => {
            state.metrics.generate_audio.record_error();
            if matches!(
                err,
                ApiError::GenerationFailed | ApiError::TtsError(_) | ApiError::Container(_)
            ) {
                state.metrics.generation.record_failure();
            }
        }
    }

    result
}
