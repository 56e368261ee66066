//! Domain models for Centavo

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::categories;
use crate::error::{Error, Result};

/// Longest accepted expense description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Longest accepted category name on create (before vocabulary lookup).
pub const MAX_CATEGORY_LEN: usize = 100;

// ============================================================================
// Raw storage representation
// ============================================================================

/// An expense amount exactly as the storage layer handed it back.
///
/// SQLite columns are dynamically typed, so the same logical column can hold
/// fixed-point text, integer minor units, or a float depending on how the row
/// was written (manual create, bank sync, legacy import). The normalizer is
/// the only place allowed to decode these.
#[derive(Debug, Clone, PartialEq)]
pub enum RawAmount {
    /// Fixed-point text, e.g. "12.50"
    Fixed(String),
    /// Integer minor units (centavos), e.g. 1250 for R$12.50
    Cents(i64),
    /// Float column value (legacy rows)
    Float(f64),
    /// Already-decoded decimal
    Decimal(Decimal),
}

/// A boolean flag as the storage layer handed it back: integer 0/1,
/// "true"/"false" text, or a native bool.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFlag {
    Int(i64),
    Text(String),
    Bool(bool),
}

impl RawFlag {
    /// Resolve to a bool. Integer 1, "true" (any case), or native true are
    /// true; everything else is false.
    pub fn resolve(&self) -> bool {
        match self {
            RawFlag::Int(v) => *v == 1,
            RawFlag::Text(s) => s.trim().eq_ignore_ascii_case("true"),
            RawFlag::Bool(b) => *b,
        }
    }
}

/// An account row joined onto an expense. Only the presentation fields are
/// carried; the normalizer copies them out and drops the relation.
#[derive(Debug, Clone, Default)]
pub struct RawAccount {
    pub name: Option<String>,
    pub account_type: Option<String>,
}

/// The persistence layer's native representation of an expense row.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub id: Option<i64>,
    pub amount: Option<RawAmount>,
    pub description: Option<String>,
    pub category: Option<String>,
    /// Raw date text; may carry a time-of-day suffix ("2026-03-01 14:05:00").
    pub date: Option<String>,
    /// Embedded account relation from a join, if the expense has one.
    pub account: Option<RawAccount>,
    pub is_synced_from_bank: Option<RawFlag>,
}

// ============================================================================
// Canonical representation
// ============================================================================

/// The normalized, storage-agnostic expense record consumed by every
/// downstream component. Produced fresh per normalization call and never
/// mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub id: i64,
    /// Finite, non-negative magnitude; direction is never encoded in the sign.
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    /// Calendar date, no time component.
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    pub is_synced_from_bank: bool,
}

// ============================================================================
// Expense creation
// ============================================================================

/// Payload for creating an expense.
#[derive(Debug, Clone, Deserialize)]
pub struct NewExpense {
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    /// ISO `YYYY-MM-DD`
    pub date: String,
    #[serde(default)]
    pub account_id: Option<i64>,
}

impl NewExpense {
    /// Validate the payload before it reaches storage or the normalizer.
    ///
    /// Returns the parsed date on success so callers do not parse twice.
    pub fn validate(&self) -> Result<NaiveDate> {
        if self.amount <= Decimal::ZERO {
            return Err(Error::validation("amount", "must be a positive number"));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(Error::validation("description", "must not be empty"));
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(Error::validation(
                "description",
                format!("must be at most {} characters", MAX_DESCRIPTION_LEN),
            ));
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(Error::validation("category", "must not be empty"));
        }
        if category.chars().count() > MAX_CATEGORY_LEN {
            return Err(Error::validation(
                "category",
                format!("must be at most {} characters", MAX_CATEGORY_LEN),
            ));
        }
        if !categories::is_valid(category) {
            return Err(Error::validation("category", "unknown category"));
        }
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| Error::validation("date", "must match YYYY-MM-DD"))
    }
}

// ============================================================================
// Derived analytics
// ============================================================================

/// Three-valued classification of period-over-period spending change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Stable => "stable",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read-only aggregate over a record collection. Recomputed on every request,
/// never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_amount: Decimal,
    pub current_period_amount: Decimal,
    pub average_per_record: Decimal,
    pub trend: Trend,
}

/// Per-category amount sums. Categories with a zero cumulative sum are
/// omitted; consumers sort for display.
pub type CategoryBreakdown = std::collections::BTreeMap<String, Decimal>;

/// AI-derived aggregate narrative. Always returned to the client; when the
/// model is unavailable the fixed fallback value is used instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub summary: String,
    pub tips: Vec<String>,
    pub category_breakdown: CategoryBreakdown,
    pub spending_trend: Trend,
}

// ============================================================================
// Enrichment
// ============================================================================

/// Risk classification attached to an enriched transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("Unknown risk level: {}", other)),
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Merchant metadata extracted by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MerchantInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Merchant category code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcc: Option<String>,
}

impl MerchantInfo {
    pub fn is_empty(&self) -> bool {
        fn blank(v: &Option<String>) -> bool {
            v.as_deref().map_or(true, |s| s.trim().is_empty())
        }
        blank(&self.name) && blank(&self.category) && blank(&self.mcc)
    }
}

/// Payment metadata extracted by the model (Pix transfers carry a key and an
/// end-to-end identifier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_to_end_id: Option<String>,
}

impl PaymentInfo {
    pub fn is_empty(&self) -> bool {
        fn blank(v: &Option<String>) -> bool {
            v.as_deref().map_or(true, |s| s.trim().is_empty())
        }
        blank(&self.method) && blank(&self.pix_key) && blank(&self.end_to_end_id)
    }
}

/// Validated AI enrichment for a single transaction. The caller decides
/// whether to persist it; repeated enrichment overwrites the prior result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentResult {
    pub suggested_category: String,
    pub tags: Vec<String>,
    pub notes: String,
    pub is_recurring: bool,
    pub risk_level: RiskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_info: Option<MerchantInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_info: Option<PaymentInfo>,
}
