use serde::Deserialize;
use std::env;
use std::time::Duration;

use crate::infrastructure::repositories::LlmSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub storage_backend: StorageBackend,
    pub environment: Environment,
    pub log_format: LogFormat,
    /// `*` or explicit origins
    pub cors_allow_origins: Vec<String>,
    // OpenAI
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub llm_model: String,
    pub llm_model_fallbacks: Vec<String>,
    pub llm_request_timeout_secs: u64,
    pub llm_retry_count: u32,
    pub llm_retry_backoff_ms: u64,
    pub tts_model: String,
    /// Empty picks a voice per language
    pub tts_voice: String,
    pub tts_cache_enabled: bool,
    // Meeting source
    pub meeting_source_base_url: String,
    pub meeting_source_token: String,
    pub meeting_source_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

fn csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let storage_backend = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageBackend::Memory,
            _ => StorageBackend::Postgres,
        };

        let database_url = match storage_backend {
            StorageBackend::Postgres => env::var("DATABASE_URL")?,
            StorageBackend::Memory => env::var("DATABASE_URL").unwrap_or_default(),
        };

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            database_url,
            storage_backend,
            environment: match env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .as_str()
            {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            cors_allow_origins: csv(&env::var("CORS_ALLOW_ORIGINS").unwrap_or_else(|_| "*".to_string())),
            openai_api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_base_url: env::var("OPENAI_BASE_URL").ok().filter(|s| !s.trim().is_empty()),
            llm_model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            llm_model_fallbacks: csv(&env::var("LLM_MODEL_FALLBACKS").unwrap_or_default()),
            llm_request_timeout_secs: env::var("LLM_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "45".to_string())
                .parse()?,
            llm_retry_count: env::var("LLM_RETRY_COUNT")
                .unwrap_or_else(|_| "3".to_string())
                .parse()?,
            llm_retry_backoff_ms: env::var("LLM_RETRY_BACKOFF_MS")
                .unwrap_or_else(|_| "1200".to_string())
                .parse()?,
            tts_model: env::var("TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string()),
            tts_voice: env::var("TTS_VOICE").unwrap_or_default(),
            tts_cache_enabled: env::var("TTS_CACHE_ENABLED")
                .map(|s| s.to_lowercase() != "false")
                .unwrap_or(true),
            meeting_source_base_url: env::var("MEETING_SOURCE_BASE_URL").unwrap_or_default(),
            meeting_source_token: env::var("MEETING_SOURCE_TOKEN").unwrap_or_default(),
            meeting_source_timeout_secs: env::var("MEETING_SOURCE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            model: self.llm_model.clone(),
            fallback_models: self.llm_model_fallbacks.clone(),
            request_timeout: Duration::from_secs(self.llm_request_timeout_secs),
            retry_count: self.llm_retry_count,
            retry_backoff: Duration::from_millis(self.llm_retry_backoff_ms),
        }
    }

    pub fn meeting_source_timeout(&self) -> Duration {
        Duration::from_secs(self.meeting_source_timeout_secs)
    }
}
