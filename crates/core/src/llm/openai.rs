use crate::config::ModelConfig;
use crate::llm::error::LlmCallError;
use crate::llm::{ChatClient, ChatPrompt};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Gemini's OpenAI-compatible surface; any chat-completion endpoint with the
// same shape works via LLM_BASE_URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    temperature: f64,
}

impl OpenAiCompatClient {
    pub fn from_config(model: &ModelConfig) -> anyhow::Result<Self> {
        let base_url =
            std::env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout_secs = std::env::var("LLM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build llm http client")?;

        Ok(Self {
            http,
            base_url,
            model: model.name.clone(),
            temperature: model.temperature,
        })
    }
}

#[async_trait::async_trait]
impl ChatClient for OpenAiCompatClient {
    async fn complete(&self, api_key: &str, prompt: &ChatPrompt) -> anyhow::Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        let req = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system",
                    content: prompt.system.clone(),
                },
                Message {
                    role: "user",
                    content: prompt.user.clone(),
                },
            ],
            temperature: self.temperature,
        };

        let res = self
            .http
            .post(url)
            .bearer_auth(api_key)
            .json(&req)
            .send()
            .await
            .context("chat completion request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read chat completion response body")?;

        if !status.is_success() {
            return Err(LlmCallError {
                stage: "http",
                detail: format!("status={status}"),
                raw_body: Some(text),
            }
            .into());
        }

        let parsed = serde_json::from_str::<ChatCompletionResponse>(&text).map_err(|err| {
            LlmCallError {
                stage: "decode",
                detail: err.to_string(),
                raw_body: Some(text.clone()),
            }
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| LlmCallError {
                stage: "decode",
                detail: "response contained no assistant message".to_string(),
                raw_body: Some(text),
            })?;

        Ok(content)
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
}

#[derive(Debug, Clone, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
}
