//! Request orchestration: generate an answer, then record it if possible.

use crate::models::{AskResponse, HistoryResponse, Query};
use crate::services::generator::ResponseGenerator;
use crate::services::history::HistoryStore;
use crate::services::metrics;
use std::sync::Arc;

/// Answer returned when the generator fails.
pub const FALLBACK_ANSWER: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

#[derive(Clone)]
pub struct Assistant {
    generator: Arc<dyn ResponseGenerator>,
    history: HistoryStore,
}

impl Assistant {
    pub fn new(generator: Arc<dyn ResponseGenerator>, history: HistoryStore) -> Self {
        Self { generator, history }
    }

    pub fn history_store(&self) -> &HistoryStore {
        &self.history
    }

    /// Generator failures become a fallback answer with `error` set, and
    /// nothing is recorded. Persistence failures are invisible to the caller.
    pub async fn ask(&self, query: &Query) -> AskResponse {
        let answer = match self.generator.generate(&query.text).await {
            Ok(answer) => answer,
            Err(e) => {
                metrics::record_generator_error(self.generator.name(), e.kind());
                tracing::error!(
                    provider = self.generator.name(),
                    error = %e,
                    "Response generator failed"
                );
                return AskResponse::failed(FALLBACK_ANSWER, e.to_string());
            }
        };

        if self.history.is_available() {
            self.history.insert(&query.text, &answer).await;
        }

        AskResponse::answered(answer)
    }

    pub async fn history(&self) -> HistoryResponse {
        self.history.list_all().await
    }
}
