//! Mock backend for testing
//!
//! Returns predictable responses for all model operations so unit tests and
//! development never need a running model server.

use async_trait::async_trait;

use crate::categories::FALLBACK_CATEGORY;
use crate::error::{Error, Result};
use crate::models::CanonicalRecord;

use super::types::{
    CategorySuggestion, InsightText, ModelEnrichment, ModelMerchantInfo, ModelPaymentInfo,
    SpendingDigest,
};
use super::AIBackend;

/// Mock model backend
///
/// Classifies by keyword and produces deterministic enrichments. An
/// unhealthy mock fails every call, which is how tests exercise the
/// fallback and surfaced-error policies.
#[derive(Clone)]
pub struct MockBackend {
    /// Whether calls succeed and health_check returns true
    pub healthy: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self { healthy: true }
    }

    /// Create a mock backend whose every call fails
    pub fn unhealthy() -> Self {
        Self { healthy: false }
    }

    fn check(&self) -> Result<()> {
        if self.healthy {
            Ok(())
        } else {
            Err(Error::ExternalModel("mock backend is offline".to_string()))
        }
    }

    fn classify(description: &str) -> &'static str {
        let d = description.to_lowercase();
        if d.contains("uber") || d.contains("99app") || d.contains("metrô") || d.contains("posto") {
            "Transporte"
        } else if d.contains("ifood")
            || d.contains("mercado")
            || d.contains("padaria")
            || d.contains("restaurante")
            || d.contains("supermercado")
        {
            "Alimentação"
        } else if d.contains("farmácia") || d.contains("drogaria") || d.contains("consulta") {
            "Saúde"
        } else if d.contains("netflix") || d.contains("spotify") || d.contains("cinema") {
            "Lazer"
        } else if d.contains("aluguel") || d.contains("condomínio") || d.contains("energia") {
            "Moradia"
        } else if d.contains("curso") || d.contains("faculdade") {
            "Educação"
        } else {
            FALLBACK_CATEGORY
        }
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn suggest_category(&self, description: &str) -> Result<CategorySuggestion> {
        self.check()?;
        Ok(CategorySuggestion {
            category: Self::classify(description).to_string(),
        })
    }

    async fn enrich_transaction(&self, record: &CanonicalRecord) -> Result<ModelEnrichment> {
        self.check()?;
        let description = record.description.to_lowercase();
        let recurring = description.contains("netflix")
            || description.contains("spotify")
            || description.contains("aluguel")
            || description.contains("assinatura");
        let pix = description.contains("pix");

        Ok(ModelEnrichment {
            suggested_category: Some(Self::classify(&record.description).to_string()),
            tags: vec!["mock".to_string()],
            notes: Some(format!("Enriched \"{}\"", record.description)),
            is_recurring: Some(recurring),
            risk_level: Some("low".to_string()),
            merchant_info: Some(ModelMerchantInfo {
                name: Some(record.description.clone()),
                category: None,
                mcc: None,
            }),
            payment_info: if pix {
                Some(ModelPaymentInfo {
                    method: Some("pix".to_string()),
                    pix_key: None,
                    end_to_end_id: None,
                })
            } else {
                None
            },
        })
    }

    async fn summarize_spending(&self, digest: &SpendingDigest) -> Result<InsightText> {
        self.check()?;
        Ok(InsightText {
            summary: format!(
                "Você registrou {} despesas, totalizando {}. Sua tendência de gastos está {}.",
                digest.record_count, digest.total_amount, digest.trend
            ),
            tips: vec![
                "Acompanhe suas maiores categorias de gasto.".to_string(),
                "Considere definir um limite mensal.".to_string(),
            ],
        })
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
