pub mod assistant;
pub mod generator;
pub mod history;
pub mod metrics;

pub use assistant::{Assistant, FALLBACK_ANSWER};
pub use generator::{build_generator, GeneratorError, ResponseGenerator};
pub use history::{
    ExchangeLog, HistoryStore, InMemoryExchangeLog, MongoExchangeLog,
    HISTORY_UNAVAILABLE_MESSAGE,
};
pub use metrics::{get_metrics, init_metrics};
