//! Completion service seam and its rig-core Anthropic implementation.
//!
//! [`CompletionService`] is the one unreliable outbound dependency of a
//! turn. The [`invoker::CompletionInvoker`] wraps it with a timeout and an
//! in-character fallback so callers always get a reply.
//!
//! # Example
//! ```no_run
//! use catbot_rs::llm::{AnthropicCompletion, anthropic_client};
//! use secrecy::SecretString;
//!
//! let key = SecretString::from("sk-ant-...");
//! let client = anthropic_client(&key).expect("failed to create Anthropic client");
//! let service = AnthropicCompletion::new(client);
//! ```

pub mod fallback;
pub mod invoker;

pub use invoker::{Completion, CompletionInvoker};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{Error, Result};
use crate::model::{ChatMessage, Role};

/// One fully assembled completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    /// Oldest first; the last entry is the new user message.
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u64,
    pub temperature: f64,
}

#[derive(Debug, Clone, Default)]
pub struct CompletionOutput {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Provider name reported on GenAI spans.
    fn provider(&self) -> &'static str;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionOutput>;
}

/// Create an Anthropic client from a secret API key.
///
/// # Errors
/// Returns an error if the underlying HTTP client cannot be constructed.
pub fn anthropic_client(api_key: &SecretString) -> Result<rig::providers::anthropic::Client> {
    rig::providers::anthropic::Client::new(api_key.expose_secret())
        .map_err(|e| Error::Completion(format!("failed to build Anthropic client: {e}")))
}

/// [`CompletionService`] backed by rig-core's Anthropic provider.
pub struct AnthropicCompletion {
    client: rig::providers::anthropic::Client,
}

impl AnthropicCompletion {
    pub fn new(client: rig::providers::anthropic::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CompletionService for AnthropicCompletion {
    fn provider(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionOutput> {
        use rig::client::CompletionClient;
        use rig::completion::{AssistantContent, CompletionModel, Message};

        let model = self.client.completion_model(&request.model);

        let mut history: Vec<Message> = request
            .messages
            .iter()
            .map(|m| match m.role {
                Role::User => Message::user(m.content.clone()),
                Role::Assistant => Message::assistant(m.content.clone()),
            })
            .collect();
        let prompt = history
            .pop()
            .ok_or_else(|| Error::Completion("no messages to complete".to_string()))?;

        let response = model
            .completion_request(prompt)
            .preamble(request.system)
            .messages(history)
            .max_tokens(request.max_tokens)
            .temperature(request.temperature)
            .send()
            .await
            .map_err(|e| Error::Completion(e.to_string()))?;

        let text = response
            .choice
            .iter()
            .filter_map(|content| match content {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(CompletionOutput {
            text,
            input_tokens: response.usage.input_tokens,
            output_tokens: response.usage.output_tokens,
        })
    }
}
