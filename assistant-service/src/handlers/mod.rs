//! HTTP handlers for the assistant service.

pub mod chat;
pub mod health;

pub use chat::{ask, history};
pub use health::{health_check, metrics_endpoint};
