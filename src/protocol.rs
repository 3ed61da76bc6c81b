//! Public HTTP request/response structs (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Expression;

#[derive(Debug, Deserialize)]
pub struct GenerateIn {
    #[serde(default)]
    pub intent: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOut {
    pub expressions: Vec<Expression>,
    /// ISO-8601, millisecond precision, `Z` suffix.
    pub generated_at: String,
}

impl GenerateOut {
    pub fn new(expressions: Vec<Expression>, at: DateTime<Utc>) -> Self {
        Self { expressions, generated_at: at.to_rfc3339_opts(SecondsFormat::Millis, true) }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorOut {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into(), details: None }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self { error: error.into(), details: Some(details.into()) }
    }
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub generator: bool,
}
