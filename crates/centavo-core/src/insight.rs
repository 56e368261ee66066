//! Spending insight generation
//!
//! Narrates an already-computed metrics snapshot through the model backend.
//! This path never errors: any failure (no backend configured, transport
//! error, unparseable response) yields the fixed fallback `Insight` so the
//! read side is never blocked by model availability. The fallback suppresses
//! the computed breakdown and trend as well, keeping a single well-known
//! "unavailable" presentation instead of a partial hybrid.

use crate::ai::types::SpendingDigest;
use crate::ai::{AIBackend, AIClient};
use crate::models::{CategoryBreakdown, Insight, MetricsSnapshot, Trend};

/// Summary shown when the model backend is unavailable.
pub const FALLBACK_SUMMARY: &str = "Os insights automáticos estão temporariamente indisponíveis. \
     Seus dados continuam sendo processados normalmente.";

/// General financial-hygiene tips shown alongside the fallback summary.
pub const FALLBACK_TIPS: [&str; 4] = [
    "Registre seus gastos diariamente para manter o controle.",
    "Conecte sua conta bancária para sincronizar transações automaticamente.",
    "Revise suas categorias de gastos regularmente.",
    "Defina metas de economia mensais e acompanhe seu progresso.",
];

/// The fixed insight returned whenever model narration fails.
pub fn fallback_insight() -> Insight {
    Insight {
        summary: FALLBACK_SUMMARY.to_string(),
        tips: FALLBACK_TIPS.iter().map(|t| t.to_string()).collect(),
        category_breakdown: CategoryBreakdown::new(),
        spending_trend: Trend::Stable,
    }
}

/// Generate a spending insight from pre-computed aggregates.
///
/// Consumes the metrics snapshot and breakdown as-is; this function never
/// recomputes them. On success the computed breakdown and trend are attached
/// to the model's narrative. On any failure the fixed fallback is returned.
pub async fn generate_insight(
    ai: Option<&AIClient>,
    snapshot: &MetricsSnapshot,
    breakdown: &CategoryBreakdown,
    record_count: usize,
) -> Insight {
    let Some(client) = ai else {
        tracing::warn!("No model backend configured, returning fallback insight");
        return fallback_insight();
    };

    let digest = build_digest(snapshot, breakdown, record_count);

    match client.summarize_spending(&digest).await {
        Ok(text) => Insight {
            summary: text.summary,
            tips: text.tips,
            category_breakdown: breakdown.clone(),
            spending_trend: snapshot.trend,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Insight generation failed, returning fallback");
            fallback_insight()
        }
    }
}

/// Aggregate-only payload for the model. Carries category names and sums but
/// no per-transaction free text.
fn build_digest(
    snapshot: &MetricsSnapshot,
    breakdown: &CategoryBreakdown,
    record_count: usize,
) -> SpendingDigest {
    let mut top_categories: Vec<(String, rust_decimal::Decimal)> = breakdown
        .iter()
        .map(|(name, sum)| (name.clone(), *sum))
        .collect();
    top_categories.sort_by(|a, b| b.1.cmp(&a.1));
    top_categories.truncate(5);

    SpendingDigest {
        total_amount: snapshot.total_amount,
        current_period_amount: snapshot.current_period_amount,
        average_per_record: snapshot.average_per_record,
        record_count,
        trend: snapshot.trend,
        top_categories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            total_amount: Decimal::new(30000, 2),
            current_period_amount: Decimal::new(12000, 2),
            average_per_record: Decimal::new(10000, 2),
            trend: Trend::Increasing,
        }
    }

    fn breakdown() -> CategoryBreakdown {
        let mut b = CategoryBreakdown::new();
        b.insert("Alimentação".to_string(), Decimal::new(20000, 2));
        b.insert("Transporte".to_string(), Decimal::new(10000, 2));
        b
    }

    #[test]
    fn test_fallback_insight_is_fixed() {
        let a = fallback_insight();
        let b = fallback_insight();
        assert_eq!(a.summary, b.summary);
        assert_eq!(a.tips.len(), 4);
        assert_eq!(a.tips, FALLBACK_TIPS.map(String::from).to_vec());
        assert!(a.category_breakdown.is_empty());
        assert_eq!(a.spending_trend, Trend::Stable);
    }

    #[tokio::test]
    async fn test_no_backend_returns_fallback() {
        let insight = generate_insight(None, &snapshot(), &breakdown(), 3).await;
        assert_eq!(insight.summary, FALLBACK_SUMMARY);
        assert!(insight.category_breakdown.is_empty());
        assert_eq!(insight.spending_trend, Trend::Stable);
    }

    #[tokio::test]
    async fn test_backend_failure_returns_fallback_not_hybrid() {
        let client = AIClient::mock_unhealthy();
        let insight = generate_insight(Some(&client), &snapshot(), &breakdown(), 3).await;
        assert_eq!(insight.summary, FALLBACK_SUMMARY);
        // computed breakdown and trend are suppressed on failure
        assert!(insight.category_breakdown.is_empty());
        assert_eq!(insight.spending_trend, Trend::Stable);
    }

    #[tokio::test]
    async fn test_success_attaches_computed_aggregates() {
        let client = AIClient::mock();
        let insight = generate_insight(Some(&client), &snapshot(), &breakdown(), 3).await;
        assert_ne!(insight.summary, FALLBACK_SUMMARY);
        assert_eq!(insight.category_breakdown, breakdown());
        assert_eq!(insight.spending_trend, Trend::Increasing);
    }

    #[test]
    fn test_digest_orders_top_categories() {
        let digest = build_digest(&snapshot(), &breakdown(), 3);
        assert_eq!(digest.top_categories[0].0, "Alimentação");
        assert_eq!(digest.top_categories[1].0, "Transporte");
        assert_eq!(digest.record_count, 3);
    }
}
