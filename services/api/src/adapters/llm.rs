//! services/api/src/adapters/llm.rs
//!
//! This module contains the adapter for the interpretation model.
//! It implements the `InterpretationService` port from the `fal_core` crate
//! against any OpenAI-compatible chat-completion endpoint (Gemini's
//! compatibility layer in production).
//!
//! Malformed model output is never an error here: the response parsers in
//! `fal_core::response` repair partial JSON and fall back to placeholder
//! readings, and we only log when that happens.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs},
    Client,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use fal_core::domain::{DrawnCard, DreamReading, KatinaReading, TarotReading};
use fal_core::ports::{InterpretationService, PortError, PortResult};
use fal_core::zodiac::ZodiacSign;
use fal_core::{prompt, response};
use tracing::warn;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `InterpretationService` using an
/// OpenAI-compatible LLM endpoint.
#[derive(Clone)]
pub struct GeminiInterpreter {
    client: Client<OpenAIConfig>,
    tarot_model: String,
    katina_model: String,
    dream_model: String,
}

impl GeminiInterpreter {
    /// Creates a new `GeminiInterpreter`.
    pub fn new(
        client: Client<OpenAIConfig>,
        tarot_model: String,
        katina_model: String,
        dream_model: String,
    ) -> Self {
        Self {
            client,
            tarot_model,
            katina_model,
            dream_model,
        }
    }

    /// Sends a single-user-message chat completion and returns the raw text
    /// of the first choice.
    async fn complete(&self, model: &str, prompt_text: String) -> PortResult<String> {
        let messages = vec![ChatCompletionRequestUserMessageArgs::default()
            .content(prompt_text)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?
            .into()];

        let request = CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(PortError::Unexpected(
                    "Interpretation response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Unexpected(
                "Interpretation model returned no choices in its response.".to_string(),
            ))
        }
    }
}

//=========================================================================================
// `InterpretationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl InterpretationService for GeminiInterpreter {
    async fn interpret_tarot(
        &self,
        cards: &[DrawnCard],
        birth_date: NaiveDate,
        question: &str,
    ) -> PortResult<TarotReading> {
        let sign = ZodiacSign::from_date(birth_date);
        let prompt_text = prompt::tarot_prompt(cards, sign, question);
        let raw = self.complete(&self.tarot_model, prompt_text).await?;

        let outcome = response::parse_tarot(&raw, cards, sign);
        if outcome.is_fallback() {
            warn!("tarot interpretation could not be parsed, serving fallback reading");
        }
        Ok(outcome.into_inner())
    }

    async fn interpret_katina(
        &self,
        cards: &[DrawnCard],
        birth_date: NaiveDate,
        question: &str,
    ) -> PortResult<KatinaReading> {
        let sign = ZodiacSign::from_date(birth_date);
        let prompt_text = prompt::katina_prompt(cards, sign, question);
        let raw = self.complete(&self.katina_model, prompt_text).await?;

        let outcome = response::parse_katina(&raw, cards);
        if outcome.is_fallback() {
            warn!("katina interpretation could not be parsed, serving fallback reading");
        }
        Ok(outcome.into_inner())
    }

    async fn interpret_dream(
        &self,
        description: &str,
        emotions: &[String],
    ) -> PortResult<DreamReading> {
        let prompt_text = prompt::dream_prompt(description, emotions);
        let raw = self.complete(&self.dream_model, prompt_text).await?;

        let outcome = response::parse_dream(&raw);
        if outcome.is_fallback() {
            warn!("dream interpretation could not be parsed, serving fallback reading");
        }
        Ok(outcome.into_inner())
    }
}
