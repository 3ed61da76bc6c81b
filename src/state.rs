//! Application state: the expression pipeline built from config + environment.
//!
//! Nothing here is mutated after startup; handlers share it through `Arc<AppState>`.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::{load_agent_config_from_env, AgentConfig};
use crate::groq::{GenerationClient, GroqClient};
use crate::pipeline::ExpressionPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: ExpressionPipeline,
}

impl AppState {
    /// Build state from env: load config, init the Groq client if a key is present.
    #[instrument(level = "info", skip_all)]
    pub fn from_env() -> Self {
        let cfg = load_agent_config_from_env().unwrap_or_default();

        let client: Option<Arc<dyn GenerationClient>> = match GroqClient::from_env(&cfg.prompts.system, &cfg.generation) {
            Some(groq) => {
                info!(target: "expressions_backend", base_url = %groq.base_url, model = %groq.model, timeout_secs = cfg.generation.timeout_secs, "Groq enabled.");
                Some(Arc::new(groq))
            }
            None => {
                warn!(target: "expressions_backend", "Groq disabled (no GROQ_API_KEY). Every request will get the fallback batch.");
                None
            }
        };

        Self::new(cfg, client)
    }

    pub fn new(cfg: AgentConfig, client: Option<Arc<dyn GenerationClient>>) -> Self {
        let timeout = cfg.generation.timeout();
        Self { pipeline: ExpressionPipeline::new(client, cfg.prompts, timeout) }
    }
}
