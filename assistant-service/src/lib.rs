//! assistant-service: answers user questions through an AI response
//! generator and keeps a best-effort history of the exchanges.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
