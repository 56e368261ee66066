//! Test utilities for centavo-core
//!
//! Provides a mock Ollama-compatible server for development and integration
//! tests. The generate handler sniffs the prompt to decide which call site
//! is being exercised and answers with a canned, parseable response.

use axum::{
    extract::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock model server for testing and development
pub struct MockModelServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockModelServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockModelServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
            modified_at: "2026-01-01T00:00:00Z".to_string(),
            size: 4_000_000_000,
        }],
    })
}

/// Generate endpoint, dispatching on the prompt's call-site marker
async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<GenerateResponse> {
    let response = if request.prompt.contains("Classify this expense description") {
        classify_mock(&request.prompt)
    } else if request.prompt.contains("Enrich this financial transaction") {
        enrich_mock(&request.prompt)
    } else if request.prompt.contains("spending insight") {
        // Prose around the JSON exercises the brace-scan extraction
        "Here is your insight: {\"summary\": \"Seus gastos estão sob controle este mês.\", \
         \"tips\": [\"Revise a categoria Alimentação.\", \"Considere uma meta de economia.\"]}"
            .to_string()
    } else {
        classify_mock(&request.prompt)
    };

    Json(GenerateResponse {
        model: request.model,
        response,
        done: true,
    })
}

fn classify_mock(prompt: &str) -> String {
    let description = extract_description(prompt).to_uppercase();

    let category = if description.contains("UBER") || description.contains("POSTO") {
        "Transporte"
    } else if description.contains("IFOOD") || description.contains("MERCADO") {
        "Alimentação"
    } else if description.contains("NETFLIX") || description.contains("SPOTIFY") {
        "Lazer"
    } else if description.contains("FARMÁCIA") || description.contains("FARMACIA") {
        "Saúde"
    } else {
        "Outros"
    };

    format!(r#"{{"category": "{}"}}"#, category)
}

fn enrich_mock(prompt: &str) -> String {
    let description = extract_description(prompt).to_uppercase();
    let is_recurring = description.contains("NETFLIX")
        || description.contains("SPOTIFY")
        || description.contains("ALUGUEL");

    if description.contains("PIX") {
        return r#"{"suggested_category": "Outros", "tags": ["pix", "transferência"],
             "notes": "Transferência Pix", "is_recurring": false, "risk_level": "medium",
             "payment_info": {"method": "pix", "pix_key": "+5511999990000",
             "end_to_end_id": "E60701190202608291200abcdef123456"}}"#
            .to_string();
    }

    format!(
        r#"{{"suggested_category": "Lazer", "tags": ["assinatura"], "notes": "Cobrança identificada",
             "is_recurring": {}, "risk_level": "low",
             "merchant_info": {{"name": "Mock Merchant", "category": "retail", "mcc": "5999"}}}}"#,
        is_recurring
    )
}

/// Extract the quoted description following the `Description: "` marker
fn extract_description(prompt: &str) -> String {
    if let Some(start) = prompt.find("Description: \"") {
        let after = &prompt[start + 14..];
        if let Some(end) = after.find('"') {
            return after[..end].to_string();
        }
    }
    String::new()
}

// Request/Response types for the mock server

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    #[allow(dead_code)]
    stream: bool,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}
