#![allow(dead_code)]

use assistant_service::config::{
    AssistantConfig, CorsConfig, GeneratorConfig, MongoConfig, ProviderKind,
};
use assistant_service::services::generator::MockGenerator;
use assistant_service::services::{Assistant, HistoryStore, InMemoryExchangeLog};
use assistant_service::startup::{build_router, AppState, Application};
use axum::Router;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;

pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";

pub fn test_config() -> AssistantConfig {
    AssistantConfig {
        common: CoreConfig { port: 0 },
        mongodb: MongoConfig {
            uri: None,
            database: "ai_assistant".to_string(),
            collection: "chat_history".to_string(),
            timeout_ms: 500,
        },
        generator: GeneratorConfig {
            provider: ProviderKind::Mock,
            api_key: None,
            model: "mock".to_string(),
        },
        cors: CorsConfig::default(),
    }
}

pub fn state(generator: MockGenerator, history: HistoryStore) -> AppState {
    AppState {
        assistant: Assistant::new(Arc::new(generator), history),
    }
}

/// Router over an in-memory log, for `oneshot` tests.
pub fn router_with_log(generator: MockGenerator) -> (Router, Arc<InMemoryExchangeLog>) {
    let log = Arc::new(InMemoryExchangeLog::new());
    let router = build_router(
        state(generator, HistoryStore::with_log(log.clone())),
        &CorsConfig::default(),
    );
    (router, log)
}

pub fn router_without_store(generator: MockGenerator) -> Router {
    build_router(
        state(generator, HistoryStore::unavailable()),
        &CorsConfig::default(),
    )
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub log: Option<Arc<InMemoryExchangeLog>>,
}

impl TestApp {
    /// Spawn on a random port with an in-memory history log.
    pub async fn spawn(generator: MockGenerator) -> Self {
        let log = Arc::new(InMemoryExchangeLog::new());
        Self::spawn_with(generator, HistoryStore::with_log(log.clone()), Some(log)).await
    }

    /// Spawn on a random port with persistence disabled.
    pub async fn spawn_degraded(generator: MockGenerator) -> Self {
        Self::spawn_with(generator, HistoryStore::unavailable(), None).await
    }

    async fn spawn_with(
        generator: MockGenerator,
        history: HistoryStore,
        log: Option<Arc<InMemoryExchangeLog>>,
    ) -> Self {
        let app = Application::build_with_state(test_config(), state(generator, history))
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp { address, port, log }
    }

    pub async fn ask(&self, text: &str) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/ask", self.address))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn history(&self) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}/history", self.address))
            .send()
            .await
            .expect("Failed to execute request")
    }
}
