//! Per-transaction model enrichment
//!
//! Unlike insight generation, enrichment is an explicit user-triggered
//! action: model failures surface as `Error::ExternalModel` so the caller
//! can offer a retry. No partial fallback object is ever synthesized.

use crate::ai::types::{ModelEnrichment, ModelMerchantInfo, ModelPaymentInfo};
use crate::ai::{AIBackend, AIClient};
use crate::db::Database;
use crate::error::Result;
use crate::models::{EnrichmentResult, MerchantInfo, PaymentInfo, RiskLevel};
use crate::{categories, normalize};

/// Enrich a stored expense through the model backend.
///
/// Looks the row up (`Error::NotFound` if missing), normalizes it, calls the
/// model, and sanitizes the response. Persisting the result is the caller's
/// decision.
pub async fn enrich(db: &Database, ai: &AIClient, id: i64) -> Result<EnrichmentResult> {
    let raw = db.fetch_record_by_id(id)?;
    let record = normalize::normalize(&raw)?;

    let model_output = ai.enrich_transaction(&record).await?;
    Ok(sanitize_enrichment(model_output))
}

/// Validate and coerce a raw model response into a client-safe result.
///
/// - unknown suggested categories collapse to "Outros"
/// - tags collapse to trimmed non-empty strings
/// - unrecognized risk levels coerce to low
/// - sub-objects survive only when at least one inner field is non-empty
pub fn sanitize_enrichment(raw: ModelEnrichment) -> EnrichmentResult {
    let suggested_category =
        categories::coerce(raw.suggested_category.as_deref().unwrap_or("")).to_string();

    let tags: Vec<String> = raw
        .tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let risk_level = raw
        .risk_level
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or(RiskLevel::Low);

    EnrichmentResult {
        suggested_category,
        tags,
        notes: raw.notes.map(|n| n.trim().to_string()).unwrap_or_default(),
        is_recurring: raw.is_recurring.unwrap_or(false),
        risk_level,
        merchant_info: raw.merchant_info.and_then(sanitize_merchant),
        payment_info: raw.payment_info.and_then(sanitize_payment),
    }
}

fn sanitize_merchant(raw: ModelMerchantInfo) -> Option<MerchantInfo> {
    let info = MerchantInfo {
        name: non_empty(raw.name),
        category: non_empty(raw.category),
        mcc: non_empty(raw.mcc),
    };
    (!info.is_empty()).then_some(info)
}

fn sanitize_payment(raw: ModelPaymentInfo) -> Option<PaymentInfo> {
    let info = PaymentInfo {
        method: non_empty(raw.method),
        pix_key: non_empty(raw.pix_key),
        end_to_end_id: non_empty(raw.end_to_end_id),
    };
    (!info.is_empty()).then_some(info)
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::NewExpense;
    use rust_decimal::Decimal;

    #[test]
    fn test_sanitize_coerces_unknown_fields() {
        let raw = ModelEnrichment {
            suggested_category: Some("groceries".to_string()),
            tags: vec!["  mercado ".to_string(), "".to_string(), "  ".to_string()],
            notes: None,
            is_recurring: None,
            risk_level: Some("catastrophic".to_string()),
            merchant_info: None,
            payment_info: None,
        };

        let result = sanitize_enrichment(raw);
        assert_eq!(result.suggested_category, "Outros");
        assert_eq!(result.tags, vec!["mercado".to_string()]);
        assert_eq!(result.notes, "");
        assert!(!result.is_recurring);
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_sanitize_missing_risk_level_defaults_to_low() {
        let raw = ModelEnrichment {
            risk_level: None,
            ..Default::default()
        };

        let result = sanitize_enrichment(raw);
        assert_eq!(result.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_sanitize_preserves_valid_category_case_insensitively() {
        let raw = ModelEnrichment {
            suggested_category: Some("alimentação".to_string()),
            risk_level: Some("HIGH".to_string()),
            ..Default::default()
        };
        let result = sanitize_enrichment(raw);
        assert_eq!(result.suggested_category, "Alimentação");
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_empty_sub_objects_are_dropped() {
        let raw = ModelEnrichment {
            merchant_info: Some(ModelMerchantInfo {
                name: Some("  ".to_string()),
                category: None,
                mcc: Some("".to_string()),
            }),
            payment_info: Some(ModelPaymentInfo {
                method: Some("pix".to_string()),
                pix_key: None,
                end_to_end_id: None,
            }),
            ..Default::default()
        };

        let result = sanitize_enrichment(raw);
        assert!(result.merchant_info.is_none());
        let payment = result.payment_info.expect("payment kept");
        assert_eq!(payment.method.as_deref(), Some("pix"));
    }

    #[tokio::test]
    async fn test_enrich_unknown_id_is_not_found() {
        let db = Database::in_memory().unwrap();
        let ai = AIClient::mock();
        match enrich(&db, &ai, 999).await {
            Err(Error::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_enrich_surfaces_model_failure() {
        let db = Database::in_memory().unwrap();
        let id = db
            .insert_expense(&NewExpense {
                amount: Decimal::new(1590, 2),
                description: "Netflix".to_string(),
                category: "Lazer".to_string(),
                date: "2026-08-15".to_string(),
                account_id: None,
            })
            .unwrap();

        let ai = AIClient::mock_unhealthy();
        match enrich(&db, &ai, id).await {
            Err(Error::ExternalModel(_)) => {}
            other => panic!("expected ExternalModel, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_enrich_returns_sanitized_result() {
        let db = Database::in_memory().unwrap();
        let id = db
            .insert_expense(&NewExpense {
                amount: Decimal::new(1590, 2),
                description: "Netflix assinatura".to_string(),
                category: "Lazer".to_string(),
                date: "2026-08-15".to_string(),
                account_id: None,
            })
            .unwrap();

        let ai = AIClient::mock();
        let result = enrich(&db, &ai, id).await.unwrap();
        assert!(crate::categories::is_valid(&result.suggested_category));
        assert!(result.is_recurring);
    }
}
