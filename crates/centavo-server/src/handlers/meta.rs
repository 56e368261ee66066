//! Category vocabulary, account, and health handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};
use centavo_core::ai::AIBackend;
use centavo_core::categories::CATEGORIES;
use centavo_core::db::Account;

/// GET /api/categories - The fixed category vocabulary
pub async fn list_categories() -> Json<Vec<&'static str>> {
    Json(CATEGORIES.to_vec())
}

/// GET /api/accounts - List accounts
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Account>>, AppError> {
    Ok(Json(state.db.list_accounts()?))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ai_configured: bool,
    pub ai_healthy: bool,
}

/// GET /api/health - Service health and model backend reachability
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ai_healthy = match state.ai {
        Some(ref client) => client.health_check().await,
        None => false,
    };

    Json(HealthResponse {
        status: "ok",
        ai_configured: state.ai.is_some(),
        ai_healthy,
    })
}
