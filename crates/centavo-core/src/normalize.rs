//! Raw record normalization
//!
//! The storage layer hands back rows in whatever encoding they were written
//! with: amounts as fixed-point text, integer centavos, or floats; booleans
//! as 0/1 integers or "true"/"false" text; dates with or without a time
//! suffix; account details as an embedded join relation. This module is the
//! single boundary that decodes all of that into [`CanonicalRecord`], so no
//! downstream component ever special-cases a storage representation.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::categories;
use crate::error::{Error, Result};
use crate::models::{CanonicalRecord, RawAmount, RawRecord, MAX_DESCRIPTION_LEN};

/// Convert a raw persisted record into its canonical form.
///
/// Total on well-formed database output. Malformed input (missing id,
/// undecodable amount, bad date) yields [`Error::Normalization`] naming the
/// offending field; callers on read-only aggregation paths log and skip such
/// rows instead of failing the whole request.
pub fn normalize(raw: &RawRecord) -> Result<CanonicalRecord> {
    let id = raw
        .id
        .ok_or_else(|| Error::normalization("id", "missing"))?;

    let amount = decode_amount(
        raw.amount
            .as_ref()
            .ok_or_else(|| Error::normalization("amount", "missing"))?,
    )?;
    if amount < Decimal::ZERO {
        return Err(Error::normalization("amount", "negative magnitude"));
    }

    let description = raw
        .description
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::normalization("description", "missing or empty"))?;
    // Oversized stored text is capped rather than rejecting the row.
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        tracing::warn!(id, "Truncating oversized expense description");
    }
    let description: String = description.chars().take(MAX_DESCRIPTION_LEN).collect();

    let category = raw
        .category
        .as_deref()
        .map(categories::coerce)
        .unwrap_or(categories::FALLBACK_CATEGORY)
        .to_string();

    let date = decode_date(
        raw.date
            .as_deref()
            .ok_or_else(|| Error::normalization("date", "missing"))?,
    )?;

    // Flatten the embedded relation: copy the presentation fields, drop the
    // object. The canonical record never carries a nested account.
    let (account_name, account_type) = match &raw.account {
        Some(acc) => (
            acc.name.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(String::from),
            acc.account_type
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
        ),
        None => (None, None),
    };

    let is_synced_from_bank = raw
        .is_synced_from_bank
        .as_ref()
        .map(|f| f.resolve())
        .unwrap_or(false);

    Ok(CanonicalRecord {
        id,
        amount,
        description,
        category,
        date,
        account_name,
        account_type,
        is_synced_from_bank,
    })
}

/// Decode an amount without going through floating point where the source
/// representation allows it.
fn decode_amount(raw: &RawAmount) -> Result<Decimal> {
    match raw {
        // Already-decimal values pass through untouched.
        RawAmount::Decimal(d) => Ok(*d),
        RawAmount::Fixed(s) => s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| Error::normalization("amount", format!("not a number: {:?}", s))),
        // Integer columns store minor units (centavos); lossless for all i64.
        RawAmount::Cents(v) => Ok(Decimal::new(*v, 2)),
        // Legacy float rows: refuse NaN/inf, flag values the decimal type
        // cannot represent instead of silently drifting.
        RawAmount::Float(f) => {
            if !f.is_finite() {
                return Err(Error::normalization("amount", "not finite"));
            }
            Decimal::try_from(*f)
                .map(|d| {
                    let mut d = d.round_dp(2);
                    // uniform currency scale so "15.9" rows render as "15.90"
                    d.rescale(2);
                    d
                })
                .map_err(|_| Error::normalization("amount", "precision loss decoding float"))
        }
    }
}

/// Decode a stored date, truncating any time-of-day component.
///
/// Expense dates are calendar dates, not instants; no timezone conversion is
/// applied.
fn decode_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    // Take the date prefix from "YYYY-MM-DD", "YYYY-MM-DD HH:MM:SS" or
    // "YYYY-MM-DDTHH:MM:SS".
    let date_part = raw
        .split(|c| c == ' ' || c == 'T')
        .next()
        .unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| Error::normalization("date", format!("not a calendar date: {:?}", raw)))
}
