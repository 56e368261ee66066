//! Insight and metrics handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use tracing::warn;

use crate::{AppError, AppState};
use centavo_core::models::{CanonicalRecord, Insight, MetricsSnapshot};
use centavo_core::{insight, metrics, normalize};

/// Normalize all stored rows, skipping the malformed ones.
fn load_records(state: &AppState) -> Result<Vec<CanonicalRecord>, centavo_core::Error> {
    let raw = state.db.fetch_records()?;
    Ok(raw
        .iter()
        .filter_map(|r| match normalize::normalize(r) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(id = ?r.id, error = %e, "Skipping malformed expense row");
                None
            }
        })
        .collect())
}

/// GET /api/metrics - Spending metrics for the current month
pub async fn get_metrics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MetricsSnapshot>, AppError> {
    let records = load_records(&state)?;
    let today = chrono::Utc::now().date_naive();

    Ok(Json(metrics::compute_metrics(&records, today)))
}

/// GET /api/insights - AI spending insight
///
/// Always answers 200. Any internal failure, model or storage, yields the
/// fixed fallback insight instead of an error status.
pub async fn get_insights(State(state): State<Arc<AppState>>) -> Json<Insight> {
    let records = match load_records(&state) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "Storage failure, returning fallback insight");
            return Json(insight::fallback_insight());
        }
    };
    let today = chrono::Utc::now().date_naive();

    let snapshot = metrics::compute_metrics(&records, today);
    let breakdown = metrics::build_breakdown(&records);

    let result =
        insight::generate_insight(state.ai.as_ref(), &snapshot, &breakdown, records.len()).await;

    Json(result)
}
