//! Intent to batch: prompt, generate, repair, normalize, with one fallback.
//!
//! Stages: `Generating -> Repairing -> Normalizing -> Done`. Each stage returns a
//! typed `Result`; `run` is the only place that turns an `Err` into the fallback
//! batch. The generator is called at most once per request (no retries).

use std::{future::Future, sync::Arc, time::Duration};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::Prompts;
use crate::domain::{Batch, Intent};
use crate::error::{GenerationError, PipelineError};
use crate::fallback::fallback_batch;
use crate::groq::GenerationClient;
use crate::normalize::normalize;
use crate::prompt::build_prompt;
use crate::repair::repair;
use crate::util::trunc_for_log;
use crate::vocab::extract_vocabulary;

/// Which path produced the batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchSource {
  Generated,
  Fallback,
}

#[derive(Clone, Debug)]
pub struct PipelineOutcome {
  pub batch: Batch,
  pub source: BatchSource,
}

#[derive(Clone)]
pub struct ExpressionPipeline {
  client: Option<Arc<dyn GenerationClient>>,
  prompts: Prompts,
  timeout: Duration,
}

impl ExpressionPipeline {
  /// `client: None` means every request takes the fallback path.
  pub fn new(client: Option<Arc<dyn GenerationClient>>, prompts: Prompts, timeout: Duration) -> Self {
    Self { client, prompts, timeout }
  }

  pub fn has_client(&self) -> bool {
    self.client.is_some()
  }

  /// Always returns a complete batch.
  pub async fn run(&self, intent: &Intent) -> PipelineOutcome {
    self.run_until(intent, std::future::pending::<()>()).await
  }

  /// Like [`run`](Self::run), but the generator call is abandoned as soon as `cancel`
  /// completes; the request then resolves with the fallback batch.
  #[instrument(level = "info", skip(self, intent, cancel), fields(intent_len = intent.as_str().len()))]
  pub async fn run_until<F>(&self, intent: &Intent, cancel: F) -> PipelineOutcome
  where
    F: Future<Output = ()>,
  {
    let (batch, source) = match self.try_generate(intent, cancel).await {
      Ok(batch) => (batch, BatchSource::Generated),
      Err(e) => {
        warn!(target: "expressions", stage = e.stage(), error = %e, "Generation path failed; using fallback batch");
        (fallback_batch(intent), BatchSource::Fallback)
      }
    };

    let batch = batch.with_vocabulary(|rec| extract_vocabulary(&rec.text));
    info!(target: "expressions", source = ?source, levels = ?batch.levels(), "Batch ready");
    PipelineOutcome { batch, source }
  }

  async fn try_generate<F>(&self, intent: &Intent, cancel: F) -> Result<Batch, PipelineError>
  where
    F: Future<Output = ()>,
  {
    let prompt = build_prompt(&self.prompts, intent);

    debug!(target: "expressions", prompt_len = prompt.len(), "Generating");
    let raw = self.call_generator(&prompt, cancel).await?;

    debug!(target: "expressions", raw_preview = %trunc_for_log(&raw, 120), "Repairing");
    let repaired = repair(&raw)?;

    debug!(target: "expressions", "Normalizing");
    let records = normalize(&repaired, intent)?;
    Ok(Batch::from_records(records)?)
  }

  async fn call_generator<F>(&self, prompt: &str, cancel: F) -> Result<String, GenerationError>
  where
    F: Future<Output = ()>,
  {
    let client = self.client.as_ref().ok_or(GenerationError::NotConfigured)?;
    tokio::select! {
      res = tokio::time::timeout(self.timeout, client.generate(prompt)) => {
        res.unwrap_or(Err(GenerationError::Timeout(self.timeout)))
      }
      _ = cancel => Err(GenerationError::Cancelled),
    }
  }
}
