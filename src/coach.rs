use std::sync::Arc;

use log::{debug, error};

use crate::error::{CoachError, CoachResult};
use crate::event_bus::{Event, EventBus};
use crate::llm::{CompletionRequest, LLMProvider};

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_OUTPUT_TOKENS: usize = 1000;

/// Sends prompts to the coach model. One attempt per call, no retries.
pub struct CoachClient {
    provider: Arc<dyn LLMProvider>,
    event_bus: Option<Arc<EventBus>>,
}

impl CoachClient {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            provider,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Ask the coach. Every provider error comes back as
    /// `CoachError::ProviderFailure`.
    pub async fn ask(&self, prompt: &str, persona: &str) -> CoachResult<String> {
        let request = CompletionRequest {
            system: persona.to_string(),
            prompt: prompt.to_string(),
            temperature: TEMPERATURE,
            max_tokens: MAX_OUTPUT_TOKENS,
        };

        self.emit(Event::CoachCallStarted {
            provider: self.provider.name().to_string(),
            model: self.provider.model_name().to_string(),
        })
        .await;
        debug!("Coach prompt:\n{}", prompt);

        match self.provider.complete(&request).await {
            Ok(text) if !text.trim().is_empty() => {
                self.emit(Event::CoachCallCompleted {
                    provider: self.provider.name().to_string(),
                    chars: text.len(),
                })
                .await;
                Ok(text)
            }
            Ok(_) => Err(self.fail("the coach returned an empty response".to_string()).await),
            Err(e) => Err(self.fail(format!("{:#}", e)).await),
        }
    }

    async fn fail(&self, message: String) -> CoachError {
        error!("{} request failed: {}", self.provider.name(), message);
        self.emit(Event::CoachCallFailed {
            provider: self.provider.name().to_string(),
            error: message.clone(),
        })
        .await;
        CoachError::provider_failure(message)
    }

    async fn emit(&self, event: Event) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.emit(event).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedProvider;
    use crate::prompts::COACH_PERSONA;

    #[tokio::test]
    async fn test_ask_sends_fixed_parameters() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok("Stay side-on.")]));
        let client = CoachClient::new(provider.clone());

        let reply = client.ask("How do I bowl an outswinger?", COACH_PERSONA).await;
        assert_eq!(reply.unwrap(), "Stay side-on.");

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system, COACH_PERSONA);
        assert_eq!(requests[0].prompt, "How do I bowl an outswinger?");
        assert_eq!(requests[0].temperature, 0.7);
        assert_eq!(requests[0].max_tokens, 1000);
    }

    #[tokio::test]
    async fn test_provider_error_becomes_failure() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err("OpenAI API error (401): bad key")]));
        let bus = Arc::new(EventBus::default());
        let client = CoachClient::new(provider.clone()).with_event_bus(bus.clone());

        match client.ask("hello", COACH_PERSONA).await {
            Err(CoachError::ProviderFailure { message }) => {
                assert!(message.contains("bad key"));
            }
            other => panic!("expected provider failure, got {:?}", other),
        }
        assert_eq!(provider.call_count(), 1);

        let metrics = bus.get_metrics().await;
        assert_eq!(metrics.coach_calls, 1);
        assert_eq!(metrics.coach_failures, 1);
    }

    #[tokio::test]
    async fn test_blank_reply_is_failure_with_message() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok("  \n")]));
        let client = CoachClient::new(provider);

        let err = client.ask("hello", COACH_PERSONA).await.unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn test_no_retry_after_failure() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err("boom"), Ok("unused")]));
        let client = CoachClient::new(provider.clone());

        assert!(client.ask("hello", COACH_PERSONA).await.is_err());
        assert_eq!(provider.call_count(), 1);
    }
}
