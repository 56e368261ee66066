//! Transaction enrichment handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{AppError, AppState};
use centavo_core::enrich;
use centavo_core::models::EnrichmentResult;

/// POST /api/transactions/:id/enrich - Enrich a transaction via the model
///
/// Explicit user action: unknown ids answer 404 and model failures answer
/// 502 with a human-readable message, never a synthesized result. The
/// sanitized result is persisted before returning (last write wins).
pub async fn enrich_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<EnrichmentResult>, AppError> {
    let Some(ref ai) = state.ai else {
        return Err(AppError::bad_gateway("Model backend not configured"));
    };

    let result = enrich::enrich(&state.db, ai, id).await?;
    state.db.save_enrichment(id, &result)?;

    Ok(Json(result))
}

/// GET /api/transactions/:id/enrichment - Fetch the stored enrichment
pub async fn get_enrichment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<EnrichmentResult>, AppError> {
    // 404 distinguishes a missing expense from a not-yet-enriched one
    state.db.fetch_record_by_id(id)?;

    match state.db.get_enrichment(id)? {
        Some(result) => Ok(Json(result)),
        None => Err(AppError::not_found("Enrichment not found")),
    }
}
