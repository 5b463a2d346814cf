//! Completion Invoker: one round trip, no retry, always an answer.

use std::sync::Arc;

use opentelemetry::KeyValue;
use tracing::{Instrument, warn};

use crate::config::CompletionSettings;
use crate::error::{Error, Result};
use crate::model::ChatMessage;
use crate::model::character::Personality;
use crate::telemetry::{genai, metrics};

use super::{CompletionOutput, CompletionRequest, CompletionService, fallback};

/// What the caller gets back from [`CompletionInvoker::invoke`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Never empty.
    pub text: String,
    /// False when `text` came from the fallback bucket.
    pub success: bool,
}

pub struct CompletionInvoker {
    service: Arc<dyn CompletionService>,
    settings: CompletionSettings,
}

impl CompletionInvoker {
    pub fn new(service: Arc<dyn CompletionService>, settings: CompletionSettings) -> Self {
        Self { service, settings }
    }

    pub fn settings(&self) -> &CompletionSettings {
        &self.settings
    }

    /// Call the completion service; on any failure, answer from the
    /// personality's fallback bucket instead.
    pub async fn invoke(
        &self,
        system: String,
        messages: Vec<ChatMessage>,
        personality: Option<&str>,
    ) -> Completion {
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            system,
            messages,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        match self.call(request).await {
            Ok(text) => Completion {
                text,
                success: true,
            },
            Err(e) => {
                let resolved = Personality::resolve(personality);
                warn!(personality = %resolved, error = %e, "completion failed, using fallback reply");
                metrics::completion_fallbacks()
                    .add(1, &[KeyValue::new("personality", resolved.as_str())]);
                Completion {
                    text: fallback::reply(personality).to_string(),
                    success: false,
                }
            }
        }
    }

    async fn call(&self, request: CompletionRequest) -> Result<String> {
        let span = genai::start_chat_span(&request.model, self.service.provider());

        let output: CompletionOutput = match tokio::time::timeout(
            self.settings.timeout,
            self.service.complete(request).instrument(span.clone()),
        )
        .await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                genai::record_error(&span, "upstream");
                return Err(e);
            }
            Err(_) => {
                genai::record_error(&span, "timeout");
                return Err(Error::Completion(format!(
                    "timed out after {}ms",
                    self.settings.timeout.as_millis()
                )));
            }
        };

        genai::record_token_usage(&span, output.input_tokens, output.output_tokens);
        metrics::llm_tokens().add(
            output.input_tokens,
            &[
                KeyValue::new("model", self.settings.model.clone()),
                KeyValue::new("direction", "input"),
            ],
        );
        metrics::llm_tokens().add(
            output.output_tokens,
            &[
                KeyValue::new("model", self.settings.model.clone()),
                KeyValue::new("direction", "output"),
            ],
        );

        if output.text.trim().is_empty() {
            genai::record_error(&span, "empty");
            return Err(Error::Completion("empty completion".to_string()));
        }
        Ok(output.text)
    }
}
