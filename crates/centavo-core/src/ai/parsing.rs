//! JSON parsing helpers for model responses
//!
//! Models often wrap the JSON payload in prose or code fences; these helpers
//! locate the first balanced JSON object and parse it against the expected
//! shape. Anything unparseable is an [`Error::ExternalModel`] so callers can
//! apply their failure policy (fallback or surfaced error).

use crate::error::{Error, Result};

use super::types::{CategorySuggestion, InsightText, ModelEnrichment};

/// Extract the first balanced `{...}` object from a response.
fn extract_json(response: &str) -> Result<&str> {
    let response = response.trim();

    if let Some(start) = response.find('{') {
        let mut depth = 0;
        for (i, c) in response[start..].char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(&response[start..start + i + 1]);
                    }
                }
                _ => {}
            }
        }
    }

    Err(Error::ExternalModel(format!(
        "no JSON found in model response | Raw: {}",
        truncate(response)
    )))
}

fn truncate(s: &str) -> String {
    if s.len() > 200 {
        let mut end = 200;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    } else {
        s.to_string()
    }
}

/// Parse a category suggestion (strict: `category` must be present).
pub fn parse_category_suggestion(response: &str) -> Result<CategorySuggestion> {
    let json = extract_json(response)?;
    serde_json::from_str(json).map_err(|e| {
        Error::ExternalModel(format!(
            "invalid category JSON from model: {} | Raw: {}",
            e,
            truncate(json)
        ))
    })
}

/// Parse a transaction enrichment (strict against the expected field set;
/// individual fields are defaulted, the object itself must parse).
pub fn parse_enrichment(response: &str) -> Result<ModelEnrichment> {
    let json = extract_json(response)?;
    serde_json::from_str(json).map_err(|e| {
        Error::ExternalModel(format!(
            "invalid enrichment JSON from model: {} | Raw: {}",
            e,
            truncate(json)
        ))
    })
}

/// Parse an insight narrative (loose: only `summary` is required, `tips`
/// defaults to empty).
pub fn parse_insight_text(response: &str) -> Result<InsightText> {
    let json = extract_json(response)?;
    serde_json::from_str(json)
        .map_err(|e| Error::ExternalModel(format!("invalid insight JSON from model: {}", e)))
}
