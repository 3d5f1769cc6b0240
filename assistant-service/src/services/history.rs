//! Chat history persistence.
//!
//! [`HistoryStore`] decides once at startup whether persistence is available.
//! When it is not, the service keeps answering and history reads report that
//! storage is disabled. Store errors never reach the caller: writes are
//! logged and dropped, reads become an empty list with an error marker.

use crate::config::MongoConfig;
use crate::models::{Exchange, HistoryResponse};
use crate::services::metrics;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{ClientOptions, FindOptions},
    Client as MongoClient, Collection,
};
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

pub const HISTORY_UNAVAILABLE_MESSAGE: &str =
    "Chat history not available - MongoDB not connected";

/// Append-only log of exchanges.
#[async_trait]
pub trait ExchangeLog: Send + Sync {
    async fn append(&self, exchange: &Exchange) -> Result<(), AppError>;

    /// All exchanges in insertion order.
    async fn list(&self) -> Result<Vec<Exchange>, AppError>;
}

/// MongoDB-backed exchange log.
#[derive(Clone)]
pub struct MongoExchangeLog {
    client: MongoClient,
    collection: Collection<Exchange>,
}

impl MongoExchangeLog {
    /// Connect and verify the server answers a `ping` within `timeout`.
    pub async fn connect(
        uri: &str,
        database: &str,
        collection: &str,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let mut options = ClientOptions::parse(uri).await?;
        options.server_selection_timeout = Some(timeout);
        options.connect_timeout = Some(timeout);
        options.app_name = Some("assistant-service".to_string());

        let client = MongoClient::with_options(options)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;

        let collection = client.database(database).collection::<Exchange>(collection);
        Ok(Self { client, collection })
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }
}

#[async_trait]
impl ExchangeLog for MongoExchangeLog {
    async fn append(&self, exchange: &Exchange) -> Result<(), AppError> {
        self.collection.insert_one(exchange, None).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Exchange>, AppError> {
        let options = FindOptions::builder()
            .projection(doc! { "_id": 0 })
            .build();
        let cursor = self.collection.find(doc! {}, options).await?;
        let exchanges: Vec<Exchange> = cursor.try_collect().await?;
        Ok(exchanges)
    }
}

/// In-process exchange log with switchable failures, for tests and demos.
#[derive(Default)]
pub struct InMemoryExchangeLog {
    exchanges: RwLock<Vec<Exchange>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl InMemoryExchangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.exchanges.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.exchanges.read().await.is_empty()
    }
}

#[async_trait]
impl ExchangeLog for InMemoryExchangeLog {
    async fn append(&self, exchange: &Exchange) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "write rejected: not primary"
            )));
        }
        self.exchanges.write().await.push(exchange.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Exchange>, AppError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "cursor killed during read"
            )));
        }
        Ok(self.exchanges.read().await.clone())
    }
}

/// History store adapter. Available iff it holds a log.
#[derive(Clone)]
pub struct HistoryStore {
    log: Option<Arc<dyn ExchangeLog>>,
}

impl HistoryStore {
    /// Ping MongoDB once. Any failure leaves the store unavailable for the
    /// life of the process; this never returns an error.
    pub async fn connect(config: &MongoConfig) -> Self {
        let Some(uri) = config.uri.as_deref() else {
            tracing::warn!("No MongoDB URI provided - chat history will not be saved");
            return Self::unavailable();
        };

        let timeout = Duration::from_millis(config.timeout_ms);
        match MongoExchangeLog::connect(uri, &config.database, &config.collection, timeout).await
        {
            Ok(log) => {
                tracing::info!(
                    database = %config.database,
                    collection = %config.collection,
                    "MongoDB connected - chat history enabled"
                );
                Self::with_log(Arc::new(log))
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "MongoDB connection failed - service will run without chat history storage"
                );
                Self::unavailable()
            }
        }
    }

    pub fn unavailable() -> Self {
        Self { log: None }
    }

    pub fn with_log(log: Arc<dyn ExchangeLog>) -> Self {
        Self { log: Some(log) }
    }

    pub fn is_available(&self) -> bool {
        self.log.is_some()
    }

    /// Best-effort append. No-op when unavailable; errors are logged only.
    pub async fn insert(&self, user_text: &str, ai_text: &str) {
        let Some(log) = &self.log else {
            return;
        };

        match log.append(&Exchange::new(user_text, ai_text)).await {
            Ok(()) => metrics::record_exchange_saved(),
            Err(e) => {
                metrics::record_store_error("insert");
                tracing::warn!(error = %e, "Failed to save exchange to chat history");
            }
        }
    }

    pub async fn list_all(&self) -> HistoryResponse {
        let Some(log) = &self.log else {
            return HistoryResponse::unavailable(HISTORY_UNAVAILABLE_MESSAGE);
        };

        match log.list().await {
            Ok(exchanges) => HistoryResponse::records(exchanges),
            Err(e) => {
                metrics::record_store_error("list");
                tracing::error!(error = %e, "Failed to read chat history");
                HistoryResponse::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_uri(uri: Option<&str>) -> MongoConfig {
        MongoConfig {
            uri: uri.map(str::to_string),
            database: "ai_assistant".to_string(),
            collection: "chat_history".to_string(),
            timeout_ms: 200,
        }
    }

    #[tokio::test]
    async fn missing_uri_starts_degraded() {
        let store = HistoryStore::connect(&config_with_uri(None)).await;
        assert!(!store.is_available());
    }

    #[tokio::test]
    async fn malformed_uri_starts_degraded() {
        let store = HistoryStore::connect(&config_with_uri(Some("not-a-mongo-uri"))).await;
        assert!(!store.is_available());
    }

    #[tokio::test]
    async fn unreachable_server_starts_degraded() {
        // Port 1 refuses connections; selection gives up after the timeout.
        let store =
            HistoryStore::connect(&config_with_uri(Some("mongodb://127.0.0.1:1/"))).await;
        assert!(!store.is_available());
    }

    #[tokio::test]
    async fn unavailable_listing_carries_message() {
        let response = HistoryStore::unavailable().list_all().await;
        assert!(response.history.is_empty());
        assert_eq!(response.message.as_deref(), Some(HISTORY_UNAVAILABLE_MESSAGE));
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn insert_appends_in_order() {
        let log = Arc::new(InMemoryExchangeLog::new());
        let store = HistoryStore::with_log(log.clone());

        store.insert("first", "one").await;
        store.insert("second", "two").await;

        let response = store.list_all().await;
        assert_eq!(
            response.history,
            vec![Exchange::new("first", "one"), Exchange::new("second", "two")]
        );
        assert!(response.message.is_none());
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn insert_failure_is_swallowed() {
        let log = Arc::new(InMemoryExchangeLog::new());
        log.set_fail_writes(true);
        let store = HistoryStore::with_log(log.clone());

        store.insert("hello", "hi there").await;

        assert!(log.is_empty().await);
    }

    #[tokio::test]
    async fn read_failure_becomes_error_marker() {
        let log = Arc::new(InMemoryExchangeLog::new());
        let store = HistoryStore::with_log(log.clone());
        store.insert("hello", "hi there").await;
        log.set_fail_reads(true);

        let response = store.list_all().await;
        assert!(response.history.is_empty());
        assert!(response.message.is_none());
        assert!(response
            .error
            .as_deref()
            .is_some_and(|e| e.contains("cursor killed")));
    }
}
