//! Pluggable model backend abstraction
//!
//! Backend-agnostic interface for the three external-model call sites:
//! category suggestion, transaction enrichment, and spending insight
//! narration.
//!
//! # Architecture
//!
//! - `AIBackend` trait: defines the interface for all model operations
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, mock). Default: ollama
//! - `OLLAMA_HOST`: Ollama server URL (required for ollama backend)
//! - `OLLAMA_MODEL`: Model name (default: llama3.2)

mod mock;
mod ollama;
pub mod parsing;
pub mod types;

pub use mock::MockBackend;
pub use ollama::OllamaBackend;
pub use types::*;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::CanonicalRecord;

/// Trait defining the interface for all model backends
///
/// Backends must be Send + Sync for use across async tasks.
#[async_trait]
pub trait AIBackend: Send + Sync {
    /// Classify a free-text expense description into one category
    async fn suggest_category(&self, description: &str) -> Result<CategorySuggestion>;

    /// Produce structured enrichment metadata for a single transaction
    async fn enrich_transaction(&self, record: &CanonicalRecord) -> Result<ModelEnrichment>;

    /// Narrate a spending digest into a summary plus tips
    async fn summarize_spending(&self, digest: &SpendingDigest) -> Result<InsightText>;

    /// Check if the backend is available
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete model client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create a model client from environment variables
    ///
    /// Returns None when the required variables are not set; the pipeline
    /// then runs with the deterministic fallbacks only.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => OllamaBackend::from_env().map(AIClient::Ollama),
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                OllamaBackend::from_env().map(AIClient::Ollama)
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        AIClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Create a mock backend whose calls always fail
    pub fn mock_unhealthy() -> Self {
        AIClient::Mock(MockBackend::unhealthy())
    }
}

#[async_trait]
impl AIBackend for AIClient {
    async fn suggest_category(&self, description: &str) -> Result<CategorySuggestion> {
        match self {
            AIClient::Ollama(b) => b.suggest_category(description).await,
            AIClient::Mock(b) => b.suggest_category(description).await,
        }
    }

    async fn enrich_transaction(&self, record: &CanonicalRecord) -> Result<ModelEnrichment> {
        match self {
            AIClient::Ollama(b) => b.enrich_transaction(record).await,
            AIClient::Mock(b) => b.enrich_transaction(record).await,
        }
    }

    async fn summarize_spending(&self, digest: &SpendingDigest) -> Result<InsightText> {
        match self {
            AIClient::Ollama(b) => b.summarize_spending(digest).await,
            AIClient::Mock(b) => b.summarize_spending(digest).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}
