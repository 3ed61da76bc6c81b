//! Error kinds for the expression pipeline.
//!
//! Only [`InputValidationError`] ever reaches a client as a rejection. The stage
//! errors (generation, repair, validation) are absorbed by the fallback batch and
//! exist so each stage returns a typed `Result` instead of swallowing failures.

/// Bad intent. Raised before the pipeline is invoked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputValidationError {
  #[error("Intent is required")]
  Missing,
  #[error("Intent is too long (max {max} characters)")]
  TooLong { max: usize },
}

/// The external generator failed. The pipeline does not distinguish the causes;
/// the variants only make logs useful.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
  #[error("generator not configured")]
  NotConfigured,
  #[error("generator HTTP {status}: {message}")]
  Http { status: u16, message: String },
  #[error("generator transport error: {0}")]
  Transport(String),
  #[error("generator returned no content")]
  EmptyResponse,
  #[error("generator timed out after {0:?}")]
  Timeout(std::time::Duration),
  #[error("generation cancelled by caller")]
  Cancelled,
}

/// No recoverable structured region in the raw generator text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no `{marker}` object found in generator output")]
pub struct RepairError {
  pub marker: &'static str,
}

/// The repaired text did not yield a usable record array.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
  #[error("repaired text is not valid JSON: {0}")]
  Parse(String),
  #[error("`{0}` field is missing")]
  MissingArray(&'static str),
  #[error("`{0}` field is not an array")]
  NotAnArray(&'static str),
  #[error("`{0}` array is empty")]
  EmptyArray(&'static str),
  #[error("batch is missing levels: {0}")]
  IncompleteBatch(String),
}

/// Union of every stage failure. The pipeline maps any of these to the fallback batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
  #[error(transparent)]
  Generation(#[from] GenerationError),
  #[error(transparent)]
  Repair(#[from] RepairError),
  #[error(transparent)]
  Validation(#[from] ValidationError),
}

impl PipelineError {
  /// Stage name used in logs.
  pub fn stage(&self) -> &'static str {
    match self {
      PipelineError::Generation(_) => "generating",
      PipelineError::Repair(_) => "repairing",
      PipelineError::Validation(_) => "normalizing",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn input_errors_match_http_messages() {
    assert_eq!(InputValidationError::Missing.to_string(), "Intent is required");
    let err = InputValidationError::TooLong { max: 500 };
    assert_eq!(err.to_string(), "Intent is too long (max 500 characters)");
  }

  #[test]
  fn stage_errors_convert_into_pipeline_error() {
    let e: PipelineError = RepairError { marker: "expressions" }.into();
    assert_eq!(e.stage(), "repairing");
    assert!(e.to_string().contains("expressions"));

    let e: PipelineError = GenerationError::Cancelled.into();
    assert_eq!(e.stage(), "generating");

    let e: PipelineError = ValidationError::EmptyArray("expressions").into();
    assert_eq!(e.stage(), "normalizing");
  }
}
