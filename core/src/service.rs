//! HTTP surface — `POST /check` and `GET /health`.
//!
//! The handler parses query parameters into a `RunRequest` and hands it to
//! the blocking check pipeline on tokio's blocking pool. Every response body
//! is a `{"data": ...}` mapping.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::check::Checker;
use crate::error::CheckError;
use crate::types::request::{CheckParams, RunOutcome};


pub const MISSING_URL: &str = "missing required parameter: url";


#[derive(Clone)]
struct AppState {
    checker: Arc<Checker>,
}


/// Build the service router around a shared checker.
pub fn router(checker: Arc<Checker>) -> Router {
    Router::new()
        .route("/check", post(handle_check))
        .route("/health", get(handle_health))
        .with_state(AppState { checker })
}


/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, checker: Arc<Checker>) -> Result<(), CheckError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| CheckError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    let local = listener.local_addr().map_err(CheckError::Serve)?;
    info!(addr = %local, config = %checker.config_path().display(), "rdapct front-end listening");

    axum::serve(listener, router(checker))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(CheckError::Serve)?;

    info!("rdapct front-end stopped");
    Ok(())
}


async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}


async fn handle_check(
    State(state): State<AppState>,
    params: Result<Query<CheckParams>, QueryRejection>,
) -> (StatusCode, Json<RunOutcome>) {
    let params = match params {
        Ok(Query(p)) => p,
        Err(rejection) => {
            warn!(%rejection, "malformed check query");
            return (StatusCode::BAD_REQUEST, Json(RunOutcome::new(rejection.body_text())));
        }
    };
    let request = match params.into_request() {
        Some(r) => r,
        None => return (StatusCode::BAD_REQUEST, Json(RunOutcome::new(MISSING_URL))),
    };

    let checker = Arc::clone(&state.checker);
    match tokio::task::spawn_blocking(move || checker.check(&request)).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)),
        Err(e) => {
            error!(error = %e, "check task did not complete");
            (StatusCode::OK, Json(RunOutcome::error()))
        }
    }
}


async fn handle_health() -> &'static str {
    "healthy"
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
