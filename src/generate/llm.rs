//! Chat-completion client for OpenAI-compatible endpoints (Groq by default).

use super::GenerateError;
use crate::domain::LlmConfig;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub trait LlmClient {
    fn model(&self) -> &str;

    /// Send one system + user exchange and return the reply text.
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, GenerateError>;
}

pub struct ChatCompletionsClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl ChatCompletionsClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, GenerateError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GenerateError::MissingApiKey)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }
}

impl LlmClient for ChatCompletionsClient {
    fn model(&self) -> &str {
        &self.model
    }

    fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, GenerateError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: system_prompt },
                ChatMessage { role: "user", content: user_prompt },
            ],
            temperature: self.temperature,
        };

        tracing::debug!("Requesting completion from {} ({})", self.endpoint, self.model);
        let response = self.client.post(&self.endpoint).bearer_auth(&self.api_key).json(&request).send()?;
        let status = response.status();
        let body: Value = response.json()?;
        if !status.is_success() && body.get("error").is_none() {
            return Err(GenerateError::Api(format!("HTTP {status}")));
        }
        extract_content(&body)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Pull `choices[0].message.content` out of a reply; an `error` field wins.
fn extract_content(body: &Value) -> Result<String, GenerateError> {
    if let Some(error) = body.get("error") {
        let message = error.get("message").and_then(Value::as_str).map(str::to_string);
        return Err(GenerateError::Api(message.unwrap_or_else(|| error.to_string())));
    }
    body.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(GenerateError::EmptyResponse)
}
