use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::{ClassificationRequest, RawClassification};
use crate::providers::ClassificationProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat completions endpoint, constrained to JSON-object answers.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            AppError::ExternalApiError(format!("Failed to create OpenAI client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
            config.openai_model.clone(),
            config.openai_temperature,
            Duration::from_secs(config.classifier_timeout_secs),
        )
    }

    /// Sends the chat request and parses the first choice's content as JSON.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(_))` - The parsed JSON answer (any shape).
    /// * `Ok(None)` - The model returned no content.
    /// * `Err(_)` - Transport failure, non-2xx status, or content that is not JSON.
    pub async fn chat_json(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Option<RawClassification>, AppError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = json!({
            "model": self.model,
            "messages": request.messages,
            "temperature": self.temperature,
            "response_format": {"type": "json_object"},
        });

        tracing::debug!(
            "OpenAI: requesting {} with {} message(s)",
            self.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(AppError::from)
            .context("OpenAI request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "OpenAI returned status {}: {}",
                status, error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse OpenAI response: {}", e))
        })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty());

        let Some(content) = content else {
            tracing::warn!("OpenAI: completion contained no content");
            return Ok(None);
        };

        let answer = serde_json::from_str(&content).map_err(|e| {
            AppError::ExternalApiError(format!("OpenAI content is not valid JSON: {}", e))
        })?;

        Ok(Some(RawClassification::new(answer)))
    }
}

#[async_trait]
impl ClassificationProvider for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai_chat"
    }

    async fn classify(
        &self,
        request: &ClassificationRequest,
    ) -> Result<Option<RawClassification>, AppError> {
        self.chat_json(request).await
    }
}
