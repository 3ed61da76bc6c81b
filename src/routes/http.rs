//! HTTP endpoint handlers. These are thin wrappers around the pipeline.
//! Input validation happens here, before the pipeline is invoked.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use tracing::{error, info, info_span, instrument, warn, Instrument};
use uuid::Uuid;

use crate::domain::Intent;
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthOut { ok: true, generator: state.pipeline.has_client() })
}

#[instrument(level = "info", skip_all)]
pub async fn http_post_generate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GenerateIn>, JsonRejection>,
) -> Response {
    let body = match body {
        Ok(Json(b)) => b,
        Err(rejection) => {
            warn!(target: "expressions_backend", error = %rejection, "Rejected malformed request body");
            return (StatusCode::BAD_REQUEST, Json(ErrorOut::with_details("Invalid request body", rejection.body_text())))
                .into_response();
        }
    };

    let intent = match Intent::parse(body.intent.as_deref().unwrap_or("")) {
        Ok(i) => i,
        Err(e) => {
            warn!(target: "expressions_backend", error = %e, "Rejected intent");
            return (StatusCode::BAD_REQUEST, Json(ErrorOut::new(e.to_string()))).into_response();
        }
    };

    // Run on its own task so a fault inside the pipeline becomes a 500 instead of a dropped connection.
    let request_id = Uuid::new_v4();
    let pipeline = state.pipeline.clone();
    let task = tokio::spawn(
        async move { pipeline.run(&intent).await }.instrument(info_span!("generate", %request_id)),
    );

    match task.await {
        Ok(outcome) => {
            info!(target: "expressions_backend", %request_id, source = ?outcome.source, "Expressions served");
            Json(GenerateOut::new(outcome.batch.into_records(), Utc::now())).into_response()
        }
        Err(e) => {
            error!(target: "expressions_backend", %request_id, error = %e, "Pipeline task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorOut::with_details("Failed to generate expressions", e.to_string())),
            )
                .into_response()
        }
    }
}
