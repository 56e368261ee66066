//! Model response types
//!
//! These are the shapes the external model is asked to produce, before any
//! sanitization. They are backend-agnostic and deliberately permissive:
//! every field is optional or defaulted so a partially-conforming response
//! still deserializes, and the sanitizer in `crate::enrich` decides what
//! survives.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::Trend;

/// Strict single-field classification response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub category: String,
}

/// Unvalidated per-transaction enrichment as returned by the model.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelEnrichment {
    #[serde(default)]
    pub suggested_category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_recurring: Option<bool>,
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub merchant_info: Option<ModelMerchantInfo>,
    #[serde(default)]
    pub payment_info: Option<ModelPaymentInfo>,
}

/// Merchant sub-object as the model emits it (snake_case wire form).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelMerchantInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub mcc: Option<String>,
}

/// Payment sub-object as the model emits it (snake_case wire form).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelPaymentInfo {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub pix_key: Option<String>,
    #[serde(default)]
    pub end_to_end_id: Option<String>,
}

/// Aggregate-only payload sent to the model for insight generation. Carries
/// no per-transaction free text beyond category names.
#[derive(Debug, Clone, Serialize)]
pub struct SpendingDigest {
    pub total_amount: Decimal,
    pub current_period_amount: Decimal,
    pub average_per_record: Decimal,
    pub record_count: usize,
    pub trend: Trend,
    /// Category name and summed amount, largest first.
    pub top_categories: Vec<(String, Decimal)>,
}

/// Loosely-parsed narrative response for insight generation.
#[derive(Debug, Clone, Deserialize)]
pub struct InsightText {
    pub summary: String,
    #[serde(default)]
    pub tips: Vec<String>,
}
