//! Text generator used by the pipeline.
//!
//! [`GenerationClient`] is the seam: the pipeline only needs `generate(prompt) -> text`.
//! [`GroqClient`] implements it against Groq's OpenAI-compatible chat.completions API.
//! Calls are instrumented and log model name, latency, token usage and response size,
//! never the API key and never full contents.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::GenerationSettings;
use crate::error::GenerationError;
use crate::util::trunc_for_log;

#[async_trait]
pub trait GenerationClient: Send + Sync {
  /// Send one prompt, return the raw completion text.
  async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Clone)]
pub struct GroqClient {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub model: String,
  pub system_prompt: String,
  pub settings: GenerationSettings,
}

impl GroqClient {
  /// Construct the client if we find GROQ_API_KEY; otherwise return None.
  pub fn from_env(system_prompt: &str, settings: &GenerationSettings) -> Option<Self> {
    let api_key = std::env::var("GROQ_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
    let base_url = std::env::var("GROQ_BASE_URL").unwrap_or_else(|_| "https://api.groq.com/openai/v1".into());
    let model = std::env::var("GROQ_MODEL").unwrap_or_else(|_| "llama-3.3-70b-versatile".into());

    // The pipeline enforces its own deadline; this only bounds a hung connection.
    let client = reqwest::Client::builder()
      .timeout(settings.timeout() + Duration::from_secs(5))
      .build()
      .ok()?;

    Some(Self {
      client,
      api_key,
      base_url,
      model,
      system_prompt: system_prompt.to_string(),
      settings: settings.clone(),
    })
  }

  fn request_body(&self, prompt: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
      model: self.model.clone(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: self.system_prompt.clone() },
        ChatMessageReq { role: "user".into(), content: prompt.into() },
      ],
      temperature: self.settings.temperature,
      max_tokens: Some(self.settings.max_tokens),
      top_p: Some(self.settings.top_p),
    }
  }
}

#[async_trait]
impl GenerationClient for GroqClient {
  #[instrument(level = "info", skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
  async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
    let url = format!("{}/chat/completions", self.base_url);
    let start = Instant::now();

    let res = self.client.post(&url)
      .header(USER_AGENT, "expressions-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&self.request_body(prompt))
      .send()
      .await
      .map_err(|e| GenerationError::Transport(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_api_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
      error!(target: "groq", status = status.as_u16(), %message, elapsed = ?start.elapsed(), "Generator call failed");
      return Err(GenerationError::Http { status: status.as_u16(), message });
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| GenerationError::Transport(e.to_string()))?;
    if let Some(usage) = &body.usage {
      info!(target: "groq", prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "Generator usage");
    }

    let text = first_choice_text(body).ok_or(GenerationError::EmptyResponse)?;
    info!(target: "groq", elapsed = ?start.elapsed(), response_len = text.len(), "Generator response received");
    Ok(text)
  }
}

fn first_choice_text(body: ChatCompletionResponse) -> Option<String> {
  body.choices
    .into_iter()
    .next()
    .and_then(|c| c.message.content)
    .filter(|t| !t.trim().is_empty())
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  top_p: Option<f32>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI-style error body.
fn extract_api_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client() -> GroqClient {
    GroqClient {
      client: reqwest::Client::new(),
      api_key: "test".into(),
      base_url: "http://localhost".into(),
      model: "llama-3.3-70b-versatile".into(),
      system_prompt: "Only JSON.".into(),
      settings: GenerationSettings::default(),
    }
  }

  #[test]
  fn request_carries_system_prompt_and_sampling() {
    let v = serde_json::to_value(client().request_body("hello")).unwrap();
    assert_eq!(v["model"], "llama-3.3-70b-versatile");
    assert_eq!(v["messages"][0]["role"], "system");
    assert_eq!(v["messages"][0]["content"], "Only JSON.");
    assert_eq!(v["messages"][1]["content"], "hello");
    assert_eq!(v["max_tokens"], 2000);
    assert!(v.get("top_p").is_some());
  }

  #[test]
  fn api_error_message_is_extracted() {
    let body = r#"{"error":{"message":"Rate limit reached","type":"tokens"}}"#;
    assert_eq!(extract_api_error(body).as_deref(), Some("Rate limit reached"));
    assert_eq!(extract_api_error("<html>502</html>"), None);
  }

  #[test]
  fn blank_completion_counts_as_empty() {
    let body: ChatCompletionResponse =
      serde_json::from_str(r#"{"choices":[{"message":{"content":"   "}}]}"#).unwrap();
    assert_eq!(first_choice_text(body), None);

    let body: ChatCompletionResponse =
      serde_json::from_str(r#"{"choices":[{"message":{"content":"{\"expressions\":[]}"}}],"usage":{"total_tokens":12}}"#).unwrap();
    assert_eq!(first_choice_text(body).as_deref(), Some("{\"expressions\":[]}"));

    let body: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
    assert_eq!(first_choice_text(body), None);
  }
}
