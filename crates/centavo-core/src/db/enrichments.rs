//! Persisted enrichment results
//!
//! One row per expense; re-enriching the same expense overwrites the prior
//! row. List-valued and structured fields are stored as JSON text.

use rusqlite::params;

use super::Database;
use crate::error::Result;
use crate::models::{EnrichmentResult, MerchantInfo, PaymentInfo, RiskLevel};

impl Database {
    /// Save an enrichment for an expense, replacing any prior result.
    pub fn save_enrichment(&self, expense_id: i64, result: &EnrichmentResult) -> Result<()> {
        let conn = self.conn()?;

        let tags = serde_json::to_string(&result.tags)?;
        let merchant_info = result
            .merchant_info
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let payment_info = result
            .payment_info
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            "INSERT OR REPLACE INTO enrichments
                (expense_id, suggested_category, tags, notes, is_recurring, risk_level, merchant_info, payment_info)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                expense_id,
                result.suggested_category,
                tags,
                result.notes,
                result.is_recurring,
                result.risk_level.as_str(),
                merchant_info,
                payment_info,
            ],
        )?;
        Ok(())
    }

    /// Get the stored enrichment for an expense, if any.
    pub fn get_enrichment(&self, expense_id: i64) -> Result<Option<EnrichmentResult>> {
        let conn = self.conn()?;

        let row = conn
            .query_row(
                "SELECT suggested_category, tags, notes, is_recurring, risk_level, merchant_info, payment_info
                 FROM enrichments WHERE expense_id = ?",
                params![expense_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, bool>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Option<String>>(5)?,
                        row.get::<_, Option<String>>(6)?,
                    ))
                },
            )
            .ok();

        let Some((suggested_category, tags, notes, is_recurring, risk_level, merchant, payment)) =
            row
        else {
            return Ok(None);
        };

        let tags: Vec<String> = serde_json::from_str(&tags)?;
        let merchant_info: Option<MerchantInfo> =
            merchant.map(|s| serde_json::from_str(&s)).transpose()?;
        let payment_info: Option<PaymentInfo> =
            payment.map(|s| serde_json::from_str(&s)).transpose()?;

        Ok(Some(EnrichmentResult {
            suggested_category,
            tags,
            notes,
            is_recurring,
            risk_level: risk_level.parse().unwrap_or(RiskLevel::Low),
            merchant_info,
            payment_info,
        }))
    }
}
