use anyhow::{Context, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse,
    },
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::debug;

const SYSTEM_MESSAGE: &str = "You are a helpful assistant.";

/// Sampling parameters sent with every completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
        }
    }
}

/// The text-generation collaborator the quiz flow depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends a single prompt and returns the model's raw reply.
    async fn generate_text(&self, prompt: &str) -> Result<String>;
}

/// An implementation of `TextGenerator` for any OpenAI-compatible API.
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    params: GenerationParams,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration for the OpenAI client, including API key and base URL.
    /// * `params` - Model identifier and sampling settings used for every request.
    pub fn new(config: OpenAIConfig, params: GenerationParams) -> Self {
        Self {
            client: Client::with_config(config),
            params,
        }
    }

    /// Builds the chat completion request for `prompt`.
    ///
    /// The token cap is sent as `max_tokens`.
    #[allow(deprecated)]
    fn build_request(&self, prompt: &str) -> Result<CreateChatCompletionRequest> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.params.model)
            .max_tokens(self.params.max_tokens)
            .temperature(self.params.temperature)
            .messages(vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(SYSTEM_MESSAGE)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .build()?;
        Ok(request)
    }
}

#[async_trait]
impl TextGenerator for OpenAICompatibleClient {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        let request = self.build_request(prompt)?;

        let response: CreateChatCompletionResponse = self
            .client
            .chat()
            .create(request)
            .await
            .context("Chat completion request failed")?;

        let content = response
            .choices
            .first()
            .context("No response choice from LLM")?
            .message
            .content
            .as_ref()
            .context("No content in LLM response")?;

        debug!(model = %self.params.model, chars = content.len(), "Received completion");
        Ok(content.trim().to_string())
    }
}

/// A `TextGenerator` that replays canned replies in order.
///
/// Useful for development runs and scenario tests without API costs. Once the
/// script is used up every further call fails.
#[derive(Default)]
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedGenerator {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
        }
    }

    /// Number of replies not yet consumed.
    #[cfg(test)]
    fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate_text(&self, _prompt: &str) -> Result<String> {
        let mut replies = self
            .replies
            .lock()
            .map_err(|_| anyhow::anyhow!("Scripted generator lock poisoned"))?;
        replies
            .pop_front()
            .context("Scripted generator has no replies left")
    }
}
