//! Domain models for the assistant service.

pub mod exchange;

pub use exchange::{AskResponse, Exchange, HistoryResponse, Query};
