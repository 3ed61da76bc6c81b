//! Loading agent configuration (prompts + generation settings) from TOML.
//!
//! See `AgentConfig`, `Prompts` and `GenerationSettings` for the expected schema.
//! Every field has a default, so a partial file (or none at all) is fine.

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AgentConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub generation: GenerationSettings,
}

/// Prompts sent to the generator. The user template may use `{intent}` and `{schema}`.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub system: String,
  pub user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      system: "You are a Korean language expert. You respond ONLY with valid JSON, no other text, no markdown code blocks, no explanations.".into(),
      user_template: "Generate 4 Korean translations for: \"{intent}\"\n\nReturn this exact JSON format with NO markdown, NO code blocks, just pure JSON:\n{schema}\n\nIMPORTANT: Return ONLY the JSON object, nothing else.".into(),
    }
  }
}

/// Sampling parameters and the per-request generation deadline.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
  pub temperature: f32,
  pub max_tokens: u32,
  pub top_p: f32,
  pub timeout_secs: u64,
}

impl Default for GenerationSettings {
  fn default() -> Self {
    Self { temperature: 0.7, max_tokens: 2000, top_p: 0.9, timeout_secs: 30 }
  }
}

impl GenerationSettings {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs.max(1))
  }
}

/// Attempt to load `AgentConfig` from AGENT_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_agent_config_from_env() -> Option<AgentConfig> {
  let path = std::env::var("AGENT_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_agent_config(&s) {
      Ok(cfg) => {
        info!(target: "expressions_backend", %path, "Loaded agent config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "expressions_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "expressions_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

pub fn parse_agent_config(s: &str) -> Result<AgentConfig, toml::de::Error> {
  toml::from_str::<AgentConfig>(s)
}
