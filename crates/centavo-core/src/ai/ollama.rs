//! Ollama backend implementation
//!
//! HTTP client for the Ollama generate API. Every call carries a bounded
//! timeout so a hung model server cannot stall a request indefinitely;
//! transport and status failures surface as [`Error::ExternalModel`] and the
//! call site decides whether that becomes a fallback or a surfaced error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::CanonicalRecord;
use crate::prompts;

use super::parsing::{parse_category_suggestion, parse_enrichment, parse_insight_text};
use super::types::{CategorySuggestion, InsightText, ModelEnrichment, SpendingDigest};
use super::AIBackend;

/// Per-call timeout for model requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Ollama backend
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables (`OLLAMA_HOST`, `OLLAMA_MODEL`)
    pub fn from_env() -> Option<Self> {
        let host = std::env::var("OLLAMA_HOST").ok()?;
        let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
        Some(Self::new(&host, &model))
    }

    /// Send a prompt to the generate endpoint and return the raw response.
    async fn generate(&self, prompt: String) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
        };

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::ExternalModel(format!("model request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::ExternalModel(format!(
                "model returned status {}",
                response.status()
            )));
        }

        let body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| Error::ExternalModel(format!("unreadable model response: {}", e)))?;

        debug!(model = %self.model, "Model response: {}", body.response);
        Ok(body.response)
    }
}

/// Request to the Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// Response from the Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

#[async_trait]
impl AIBackend for OllamaBackend {
    async fn suggest_category(&self, description: &str) -> Result<CategorySuggestion> {
        let response = self
            .generate(prompts::category_suggestion(description))
            .await?;
        parse_category_suggestion(&response)
    }

    async fn enrich_transaction(&self, record: &CanonicalRecord) -> Result<ModelEnrichment> {
        let response = self.generate(prompts::enrichment(record)).await?;
        parse_enrichment(&response)
    }

    async fn summarize_spending(&self, digest: &SpendingDigest) -> Result<InsightText> {
        let response = self.generate(prompts::insight(digest)).await?;
        parse_insight_text(&response)
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
