//! OpenAI chat-completion summarization engine.

use super::SummaryEngine;
use crate::error::{NotatError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You summarize lecture transcript excerpts. Write a single \
compressed paragraph capturing the main points. Do not add headings, bullet lists, or \
commentary; output the paragraph only.";

/// Chat-completion-backed summarization engine.
pub struct OpenAiSummaryEngine {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAiSummaryEngine {
    /// Create an engine for the given chat model.
    pub fn new(model: &str) -> Self {
        Self {
            client: create_client(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl SummaryEngine for OpenAiSummaryEngine {
    async fn summarize_chunk(&self, text: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| NotatError::Summarization(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(text.to_string())
                .build()
                .map_err(|e| NotatError::Summarization(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.3)
            .build()
            .map_err(|e| NotatError::Summarization(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| NotatError::OpenAI(format!("Summarization API error: {}", e)))?;

        let summary = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| NotatError::Summarization("Empty response from engine".to_string()))?
            .trim()
            .to_string();

        debug!("Chunk summarized to {} chars", summary.len());
        Ok(summary)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
