//! Korean Expressions Backend
//!
//! - Axum HTTP API: English intent in, four Korean expressions (formal, informal,
//!   polite-casual, slang) out
//! - Optional Groq integration (via environment variables); without it every
//!   request is answered with the built-in fallback batch
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   GROQ_API_KEY      : enables the Groq generator if present
//!   GROQ_BASE_URL     : default "https://api.groq.com/openai/v1"
//!   GROQ_MODEL        : default "llama-3.3-70b-versatile"
//!   AGENT_CONFIG_PATH : path to TOML config (prompts + generation settings)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod config;
mod prompt;
mod repair;
mod normalize;
mod fallback;
mod vocab;
mod groq;
mod pipeline;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let state = Arc::new(AppState::from_env());
  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "expressions_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
  info!(target: "expressions_backend", "HTTP server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "expressions_backend", error = %e, "Failed to listen for Ctrl-C; shutting down");
  }
}
