//! Response generator abstraction.
//!
//! The assistant treats the AI model as an opaque `text -> text` function.
//! Implementations: Gemini over HTTP, and a mock for tests and offline runs.

pub mod gemini;
pub mod mock;

use crate::config::{GeneratorConfig, ProviderKind};
use async_trait::async_trait;
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;

pub use gemini::{GeminiConfig, GeminiGenerator};
pub use mock::MockGenerator;

/// Error type for generator operations.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered")]
    ContentFiltered,

    #[error("Empty response from model")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),
}

impl GeneratorError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GeneratorError::ApiError(_) => "api_error",
            GeneratorError::RateLimited => "rate_limited",
            GeneratorError::ContentFiltered => "content_filtered",
            GeneratorError::EmptyResponse => "empty_response",
            GeneratorError::NetworkError(_) => "network_error",
        }
    }
}

/// Produces an answer for a user's text.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, text: &str) -> Result<String, GeneratorError>;

    /// Provider name used in logs and metrics.
    fn name(&self) -> &'static str;
}

/// Build the generator selected by configuration.
pub fn build_generator(config: &GeneratorConfig) -> Result<Arc<dyn ResponseGenerator>, AppError> {
    match config.provider {
        ProviderKind::Gemini => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!("GOOGLE_API_KEY is not set"))
            })?;
            let generator = GeminiGenerator::new(GeminiConfig {
                api_key,
                model: config.model.clone(),
            })?;
            tracing::info!(model = %config.model, "Initialized Gemini response generator");
            Ok(Arc::new(generator))
        }
        ProviderKind::Mock => {
            tracing::warn!("Using mock response generator; answers echo the question");
            Ok(Arc::new(MockGenerator::echo()))
        }
    }
}
