//! Category suggestion handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use centavo_core::ai::AIBackend;
use centavo_core::categories;

#[derive(Debug, Deserialize)]
pub struct CategorizeRequest {
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CategorizeResponse {
    pub category: String,
}

/// POST /api/categorize - Suggest a category for a free-text description
///
/// Model failure surfaces as 502 so the UI keeps the user's current
/// selection; it never substitutes a guess for an error.
pub async fn categorize(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CategorizeRequest>,
) -> Result<Json<CategorizeResponse>, AppError> {
    let description = payload.description.trim();
    if description.is_empty() {
        return Err(AppError::bad_request("description: must not be empty"));
    }

    let Some(ref ai) = state.ai else {
        return Err(AppError::bad_gateway("Model backend not configured"));
    };

    let suggestion = ai.suggest_category(description).await?;

    Ok(Json(CategorizeResponse {
        category: categories::coerce(&suggestion.category).to_string(),
    }))
}
