// Configuration for the server, read once at startup

use std::time::Duration;

use gemini_core::{GeminiConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_VOICE};

#[derive(Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub request_timeout_secs: u64,
    pub max_body_bytes: usize,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub default_voice: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            request_timeout_secs: 60,
            max_body_bytes: 64 * 1024,
            cors_allowed_origins: None,
            default_voice: DEFAULT_VOICE.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable numbers and blank
    /// strings fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = non_empty("PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);

        let request_timeout_secs = non_empty("REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);

        let max_body_bytes = non_empty("MAX_BODY_BYTES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_body_bytes);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        Self {
            port,
            request_timeout_secs,
            max_body_bytes,
            cors_allowed_origins,
            default_voice: non_empty("DEFAULT_VOICE").unwrap_or(defaults.default_voice),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            gemini_base_url: non_empty("GEMINI_API_BASE").unwrap_or(defaults.gemini_base_url),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Upstream client settings, or `None` when no API key is configured.
    pub fn gemini_config(&self) -> Option<GeminiConfig> {
        let api_key = self.gemini_api_key.as_ref()?;
        Some(
            GeminiConfig::new(api_key.clone())
                .with_model(self.gemini_model.clone())
                .with_base_url(self.gemini_base_url.clone()),
        )
    }
}
