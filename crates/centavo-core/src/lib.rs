//! Centavo Core Library
//!
//! Shared functionality for the Centavo personal finance backend:
//! - Database access and migrations (SQLCipher-encrypted SQLite)
//! - Normalization of raw stored rows into canonical records
//! - Spending metrics, trend classification, and category breakdowns
//! - Pluggable model backends (Ollama, mock) for category suggestion,
//!   transaction enrichment, and insight narration

pub mod ai;
pub mod categories;
pub mod db;
pub mod enrich;
pub mod error;
pub mod insight;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod prompts;

/// Test utilities including the mock model server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, CategorySuggestion, MockBackend, OllamaBackend};
pub use categories::{CATEGORIES, FALLBACK_CATEGORY};
pub use db::{Account, Database};
pub use enrich::{enrich, sanitize_enrichment};
pub use error::{Error, Result};
pub use insight::{fallback_insight, generate_insight, FALLBACK_SUMMARY, FALLBACK_TIPS};
pub use metrics::{build_breakdown, classify_trend, compute_metrics, TREND_THRESHOLD};
pub use models::{
    CanonicalRecord, CategoryBreakdown, EnrichmentResult, Insight, MerchantInfo, MetricsSnapshot,
    NewExpense, PaymentInfo, RawAccount, RawAmount, RawFlag, RawRecord, RiskLevel, Trend,
};
pub use normalize::normalize;
