//! Expense list and create handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::warn;

use crate::{AppError, AppState};
use centavo_core::models::{CanonicalRecord, NewExpense};
use centavo_core::normalize;

/// GET /api/expenses - List all expenses as canonical records
///
/// Rows that fail normalization indicate a storage inconsistency; they are
/// logged and skipped so one bad row does not take the whole list down.
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CanonicalRecord>>, AppError> {
    let raw = state.db.fetch_records()?;

    let records: Vec<CanonicalRecord> = raw
        .iter()
        .filter_map(|r| match normalize::normalize(r) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(id = ?r.id, error = %e, "Skipping malformed expense row");
                None
            }
        })
        .collect();

    Ok(Json(records))
}

/// POST /api/expenses - Create an expense
///
/// Validation happens before anything touches storage: amount > 0,
/// description 1-500 chars, category in the vocabulary, date `YYYY-MM-DD`.
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewExpense>,
) -> Result<(StatusCode, Json<CanonicalRecord>), AppError> {
    payload.validate()?;

    if let Some(account_id) = payload.account_id {
        if state.db.get_account(account_id)?.is_none() {
            return Err(AppError::bad_request("accountId: unknown account"));
        }
    }

    let id = state.db.insert_expense(&payload)?;
    let raw = state.db.fetch_record_by_id(id)?;
    let record = normalize::normalize(&raw)?;

    Ok((StatusCode::CREATED, Json(record)))
}
