//! Spending metrics and trend classification
//!
//! Pure functions over canonical records. The reference date is injected by
//! the caller so results are deterministic and testable.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{CanonicalRecord, CategoryBreakdown, MetricsSnapshot, Trend};

/// Relative month-over-month change beyond which spending is classified as
/// increasing or decreasing. Exactly at the threshold is inclusive `stable`.
pub const TREND_THRESHOLD: Decimal = Decimal::from_parts(5, 0, 0, false, 2); // 0.05

/// Compute the metrics snapshot for a record collection.
///
/// `reference_date` defines the current period (its calendar month and year)
/// and anchors the trend comparison against the previous calendar month.
pub fn compute_metrics(records: &[CanonicalRecord], reference_date: NaiveDate) -> MetricsSnapshot {
    let total_amount: Decimal = records.iter().map(|r| r.amount).sum();

    let current_period_amount = month_total(records, reference_date.year(), reference_date.month());

    let average_per_record = if records.is_empty() {
        Decimal::ZERO
    } else {
        total_amount / Decimal::from(records.len() as u64)
    };

    let (prev_year, prev_month) = previous_month(reference_date);
    let previous_period_amount = month_total(records, prev_year, prev_month);
    let trend = classify_trend(previous_period_amount, current_period_amount);

    MetricsSnapshot {
        total_amount,
        current_period_amount,
        average_per_record,
        trend,
    }
}

/// Group amounts by category. Categories whose cumulative sum is exactly zero
/// are omitted from the result.
pub fn build_breakdown(records: &[CanonicalRecord]) -> CategoryBreakdown {
    let mut breakdown = CategoryBreakdown::new();
    for record in records {
        *breakdown.entry(record.category.clone()).or_insert(Decimal::ZERO) += record.amount;
    }
    breakdown.retain(|_, sum| !sum.is_zero());
    breakdown
}

/// Classify month-over-month change against [`TREND_THRESHOLD`].
///
/// A prior total of zero with any positive current total reports increasing;
/// zero-to-zero reports stable.
pub fn classify_trend(previous: Decimal, current: Decimal) -> Trend {
    if previous.is_zero() {
        return if current > Decimal::ZERO {
            Trend::Increasing
        } else {
            Trend::Stable
        };
    }

    let change = (current - previous) / previous;
    if change > TREND_THRESHOLD {
        Trend::Increasing
    } else if change < -TREND_THRESHOLD {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn month_total(records: &[CanonicalRecord], year: i32, month: u32) -> Decimal {
    records
        .iter()
        .filter(|r| r.date.year() == year && r.date.month() == month)
        .map(|r| r.amount)
        .sum()
}

fn previous_month(date: NaiveDate) -> (i32, u32) {
    if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, amount: i64, date: &str, category: &str) -> CanonicalRecord {
        CanonicalRecord {
            id,
            amount: Decimal::new(amount, 2),
            description: format!("expense {}", id),
            category: category.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            account_name: None,
            account_type: None,
            is_synced_from_bank: false,
        }
    }

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 20).unwrap()
    }

    #[test]
    fn test_empty_collection() {
        let snapshot = compute_metrics(&[], reference());
        assert_eq!(snapshot.total_amount, Decimal::ZERO);
        assert_eq!(snapshot.current_period_amount, Decimal::ZERO);
        assert_eq!(snapshot.average_per_record, Decimal::ZERO);
        assert_eq!(snapshot.trend, Trend::Stable);
    }

    #[test]
    fn test_totals_and_average() {
        let records = vec![
            record(1, 1000, "2026-08-01", "Alimentação"),
            record(2, 2000, "2026-08-15", "Transporte"),
            record(3, 3000, "2026-07-10", "Alimentação"),
        ];
        let snapshot = compute_metrics(&records, reference());
        assert_eq!(snapshot.total_amount, Decimal::new(6000, 2));
        assert_eq!(snapshot.current_period_amount, Decimal::new(3000, 2));
        assert_eq!(snapshot.average_per_record, Decimal::new(2000, 2));
    }

    #[test]
    fn test_current_period_matches_month_and_year() {
        // Same month in a different year must not count.
        let records = vec![
            record(1, 1000, "2026-08-01", "Outros"),
            record(2, 1000, "2025-08-01", "Outros"),
        ];
        let snapshot = compute_metrics(&records, reference());
        assert_eq!(snapshot.current_period_amount, Decimal::new(1000, 2));
    }

    #[test]
    fn test_trend_exactly_at_threshold_is_stable() {
        // 100 last month, 105 this month: exactly +5%, inclusive stable.
        let records = vec![
            record(1, 10000, "2026-07-05", "Outros"),
            record(2, 10500, "2026-08-05", "Outros"),
        ];
        assert_eq!(compute_metrics(&records, reference()).trend, Trend::Stable);
    }

    #[test]
    fn test_trend_above_threshold_is_increasing() {
        let records = vec![
            record(1, 10000, "2026-07-05", "Outros"),
            record(2, 11000, "2026-08-05", "Outros"),
        ];
        assert_eq!(
            compute_metrics(&records, reference()).trend,
            Trend::Increasing
        );
    }

    #[test]
    fn test_trend_below_threshold_is_decreasing() {
        let records = vec![
            record(1, 10000, "2026-07-05", "Outros"),
            record(2, 9000, "2026-08-05", "Outros"),
        ];
        assert_eq!(
            compute_metrics(&records, reference()).trend,
            Trend::Decreasing
        );
    }

    #[test]
    fn test_trend_zero_prior_positive_current_is_increasing() {
        let records = vec![record(1, 5000, "2026-08-05", "Outros")];
        assert_eq!(
            compute_metrics(&records, reference()).trend,
            Trend::Increasing
        );
    }

    #[test]
    fn test_trend_zero_to_zero_is_stable() {
        let records = vec![record(1, 5000, "2026-03-05", "Outros")];
        assert_eq!(compute_metrics(&records, reference()).trend, Trend::Stable);
    }

    #[test]
    fn test_trend_january_compares_against_december() {
        let records = vec![
            record(1, 10000, "2025-12-05", "Outros"),
            record(2, 20000, "2026-01-05", "Outros"),
        ];
        let january = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(compute_metrics(&records, january).trend, Trend::Increasing);
    }

    #[test]
    fn test_breakdown_sums_and_omits_zero() {
        let records = vec![
            record(1, 1000, "2026-08-01", "Alimentação"),
            record(2, 500, "2026-08-02", "Alimentação"),
            record(3, 0, "2026-08-03", "Transporte"),
        ];
        let breakdown = build_breakdown(&records);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown["Alimentação"], Decimal::new(1500, 2));
        assert!(!breakdown.contains_key("Transporte"));
    }

    #[test]
    fn test_breakdown_empty() {
        assert!(build_breakdown(&[]).is_empty());
    }
}
