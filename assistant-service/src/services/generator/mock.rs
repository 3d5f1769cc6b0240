//! Mock generator for tests and local development.

use super::{GeneratorError, ResponseGenerator};
use async_trait::async_trait;

#[derive(Debug, Clone)]
enum Behavior {
    Echo,
    Reply(String),
    Fail(String),
}

/// Deterministic generator: echoes, returns a fixed reply, or always fails.
#[derive(Debug, Clone)]
pub struct MockGenerator {
    behavior: Behavior,
}

impl MockGenerator {
    pub fn echo() -> Self {
        Self {
            behavior: Behavior::Echo,
        }
    }

    pub fn replying(answer: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Reply(answer.into()),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            behavior: Behavior::Fail(reason.into()),
        }
    }
}

#[async_trait]
impl ResponseGenerator for MockGenerator {
    async fn generate(&self, text: &str) -> Result<String, GeneratorError> {
        match &self.behavior {
            Behavior::Echo => Ok(format!("Mock response for: {}", text)),
            Behavior::Reply(answer) => Ok(answer.clone()),
            Behavior::Fail(reason) => Err(GeneratorError::ApiError(reason.clone())),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echo_includes_the_question() {
        let answer = MockGenerator::echo().generate("hello").await.unwrap();
        assert_eq!(answer, "Mock response for: hello");
    }

    #[tokio::test]
    async fn failing_mock_returns_api_error() {
        let err = MockGenerator::failing("model offline")
            .generate("hello")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "api_error");
        assert!(err.to_string().contains("model offline"));
    }
}
