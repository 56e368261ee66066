//! Prompt construction for the three model call sites
//!
//! Prompts are plain functions over domain values. Each asks for a bare JSON
//! object so the parsing helpers in `ai::parsing` can extract it even when
//! the model adds prose around it.

use crate::ai::types::SpendingDigest;
use crate::categories::CATEGORIES;
use crate::models::CanonicalRecord;

/// Prompt for single-field category classification of free text.
pub fn category_suggestion(description: &str) -> String {
    format!(
        "Classify this expense description into exactly one category.\n\
         Description: \"{}\"\n\
         Available categories: {}\n\
         The description may be in Portuguese.\n\
         Respond with ONLY a JSON object: {{\"category\": \"<one of the categories>\"}}",
        description,
        CATEGORIES.join(", ")
    )
}

/// Prompt for per-transaction enrichment.
pub fn enrichment(record: &CanonicalRecord) -> String {
    format!(
        "Enrich this financial transaction with structured metadata.\n\
         Description: \"{}\"\n\
         Amount: {}\n\
         Date: {}\n\
         Current category: {}\n\
         Available categories: {}\n\
         Respond with ONLY a JSON object with these fields:\n\
         {{\"suggested_category\": \"<category>\", \"tags\": [\"<tag>\"], \
         \"notes\": \"<short note>\", \"is_recurring\": <bool>, \
         \"risk_level\": \"low|medium|high\", \
         \"merchant_info\": {{\"name\": \"\", \"category\": \"\", \"mcc\": \"\"}}, \
         \"payment_info\": {{\"method\": \"\", \"pix_key\": \"\", \"end_to_end_id\": \"\"}}}}\n\
         Omit merchant_info or payment_info entirely if you cannot infer them.",
        record.description,
        record.amount,
        record.date,
        record.category,
        CATEGORIES.join(", ")
    )
}

/// Prompt for the aggregate spending insight. Only aggregates are sent, never
/// per-transaction free text.
pub fn insight(digest: &SpendingDigest) -> String {
    let categories_block = digest
        .top_categories
        .iter()
        .map(|(name, amount)| format!("{}: {}", name, amount))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a personal finance assistant. Write a short spending insight\n\
         summary in Portuguese for this aggregated data.\n\
         Total spent: {}\n\
         Spent this month: {}\n\
         Average per expense: {}\n\
         Number of expenses: {}\n\
         Trend versus last month: {}\n\
         Spending by category: {}\n\
         Respond with ONLY a JSON object: {{\"summary\": \"<2-3 sentences>\", \
         \"tips\": [\"<actionable tip>\", \"...\"]}}",
        digest.total_amount,
        digest.current_period_amount,
        digest.average_per_record,
        digest.record_count,
        digest.trend,
        categories_block
    )
}
