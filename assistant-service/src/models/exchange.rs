//! Request, response and persisted record shapes.

use serde::{Deserialize, Serialize};

/// Body of `POST /ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
}

/// One persisted user-query/assistant-answer pair.
///
/// Stored as `{user, ai}`; the store's own `_id` is never read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub user: String,
    pub ai: String,
}

impl Exchange {
    pub fn new(user: impl Into<String>, ai: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ai: ai.into(),
        }
    }
}

/// Body returned by `POST /ask`.
///
/// `error` is only present when the generator failed, in which case `answer`
/// holds a generic apology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AskResponse {
    pub fn answered(answer: String) -> Self {
        Self {
            answer,
            error: None,
        }
    }

    pub fn failed(answer: &str, error: String) -> Self {
        Self {
            answer: answer.to_string(),
            error: Some(error),
        }
    }
}

/// Body returned by `GET /history`.
///
/// `message` marks an empty list caused by persistence being disabled;
/// `error` marks an empty list caused by a failed read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub history: Vec<Exchange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HistoryResponse {
    pub fn records(history: Vec<Exchange>) -> Self {
        Self {
            history,
            message: None,
            error: None,
        }
    }

    pub fn unavailable(message: &str) -> Self {
        Self {
            history: Vec::new(),
            message: Some(message.to_string()),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            history: Vec::new(),
            message: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clean_answer_omits_error_field() {
        let body = serde_json::to_value(AskResponse::answered("hi there".to_string())).unwrap();
        assert_eq!(body, json!({ "answer": "hi there" }));
    }

    #[test]
    fn unavailable_history_carries_message_only() {
        let body = serde_json::to_value(HistoryResponse::unavailable("not connected")).unwrap();
        assert_eq!(body, json!({ "history": [], "message": "not connected" }));
    }

    #[test]
    fn exchange_ignores_store_identifier_on_read() {
        let exchange: Exchange = serde_json::from_value(json!({
            "_id": "65f0c0ffee",
            "user": "hello",
            "ai": "hi there"
        }))
        .unwrap();
        assert_eq!(exchange, Exchange::new("hello", "hi there"));
        assert_eq!(
            serde_json::to_value(&exchange).unwrap(),
            json!({ "user": "hello", "ai": "hi there" })
        );
    }
}
