// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Internal maintenance routes.
//!
//! Called by the scheduler with the shared tasks secret; the secret check is
//! applied in routes/mod.rs.

use crate::error::Result;
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// Task routes (require the tasks secret).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tasks/close-stale-sessions", post(close_stale_sessions))
}

#[derive(Debug, Serialize)]
pub struct CloseStaleResponse {
    pub closed: usize,
}

/// Close sessions left open on a previous day.
async fn close_stale_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CloseStaleResponse>> {
    tracing::info!("Sweeping stale sessions");
    let closed = state.sessions.close_stale_sessions(Utc::now()).await?;
    Ok(Json(CloseStaleResponse { closed }))
}
