//! The fixed expense category vocabulary
//!
//! This module is the single owner of the category list. Validation, the
//! category suggester, and clients all reference it; adding a category means
//! editing exactly this file.

/// Catch-all category for anything the vocabulary does not cover.
pub const FALLBACK_CATEGORY: &str = "Outros";

/// The full category vocabulary, in display order.
pub const CATEGORIES: &[&str] = &[
    "Alimentação",
    "Transporte",
    "Moradia",
    "Saúde",
    "Educação",
    "Lazer",
    "Compras",
    "Serviços",
    "Viagem",
    "Outros",
];

/// Whether `name` is part of the vocabulary (case-sensitive).
pub fn is_valid(name: &str) -> bool {
    CATEGORIES.contains(&name)
}

/// Coerce an arbitrary category string into the vocabulary.
///
/// Matching is case-insensitive so model output like "alimentação" still
/// resolves; anything unrecognized collapses to [`FALLBACK_CATEGORY`].
pub fn coerce(name: &str) -> &'static str {
    let lowered = name.trim().to_lowercase();
    CATEGORIES
        .iter()
        .find(|c| c.to_lowercase() == lowered)
        .copied()
        .unwrap_or(FALLBACK_CATEGORY)
}
