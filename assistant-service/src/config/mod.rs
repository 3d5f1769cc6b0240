use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Value shipped in sample `.env` files; treated the same as an unset URI.
pub const PLACEHOLDER_MONGO_URI: &str = "mongodb://localhost:27017/";

const DEFAULT_MONGO_TIMEOUT_MS: u64 = 5_000;

/// Frontends allowed to call the service when `CORS_ALLOWED_ORIGINS` is unset.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "https://blog-app-frontend-a7th.onrender.com",
    "http://localhost:5173",
    "http://localhost:5174",
];

#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub generator: GeneratorConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    /// `None` when no usable connection string is configured.
    pub uri: Option<String>,
    pub database: String,
    pub collection: String,
    /// Applied to both connect and server selection.
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Mock,
}

impl std::str::FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "unknown ASSISTANT_PROVIDER '{}', expected 'gemini' or 'mock'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub provider: ProviderKind,
    /// Required when `provider` is `gemini`.
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|o| o.to_string())
                .collect(),
        }
    }
}

impl AssistantConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let provider: ProviderKind = get_env("ASSISTANT_PROVIDER", Some("mock"), is_prod)?.parse()?;
        let api_key = env::var("GOOGLE_API_KEY").ok().filter(|k| !k.trim().is_empty());
        if provider == ProviderKind::Gemini && api_key.is_none() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GOOGLE_API_KEY is required when ASSISTANT_PROVIDER is 'gemini'"
            )));
        }

        Ok(AssistantConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: usable_mongo_uri(env::var("MONGO_URI").ok()),
                database: get_env("MONGO_DATABASE", Some("ai_assistant"), false)?,
                collection: get_env("MONGO_COLLECTION", Some("chat_history"), false)?,
                timeout_ms: get_env(
                    "MONGO_TIMEOUT_MS",
                    Some(&DEFAULT_MONGO_TIMEOUT_MS.to_string()),
                    false,
                )?
                .parse()
                .unwrap_or(DEFAULT_MONGO_TIMEOUT_MS),
            },
            generator: GeneratorConfig {
                provider,
                api_key,
                model: get_env("GENAI_TEXT_MODEL", Some("gemini-2.0-flash"), false)?,
            },
            cors: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|raw| parse_origins(&raw))
                .filter(|origins| !origins.is_empty())
                .map(|allowed_origins| CorsConfig { allowed_origins })
                .unwrap_or_default(),
        })
    }
}

/// Filters out connection strings that mean "no persistence configured":
/// unset, blank, the sample placeholder, or an unfilled `<user>:<password>`
/// template.
pub fn usable_mongo_uri(raw: Option<String>) -> Option<String> {
    raw.map(|uri| uri.trim().to_string())
        .filter(|uri| !uri.is_empty())
        .filter(|uri| uri != PLACEHOLDER_MONGO_URI)
        .filter(|uri| !uri.contains('<'))
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
