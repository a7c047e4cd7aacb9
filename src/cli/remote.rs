//! Remote execution against a running Demografi server.

use anyhow::{anyhow, Result};
use demografi::plan::RawPlan;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::types::{AskResult, EvaluateResult, RetrieveResult};

#[derive(Debug, Deserialize)]
struct RemoteError {
    error: String,
    code: String,
}

/// HTTP client for a remote server.
pub struct RemoteClient {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: url.trim_end_matches('/').to_string(),
        }
    }

    /// POST a JSON body and parse the JSON response.
    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<RemoteError>(&text) {
                Ok(err) => anyhow!("{} ({}, HTTP {})", err.error, err.code, status.as_u16()),
                Err(_) => anyhow!("Server returned HTTP {}: {}", status.as_u16(), text),
            });
        }

        response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse response: {}", e))
    }
}

/// Ask a question via a remote server.
pub async fn ask(url: &str, question: String) -> Result<AskResult> {
    RemoteClient::new(url)
        .post("/ask", &serde_json::json!({ "user_query": question }))
        .await
}

/// Evaluate a plan via a remote server.
pub async fn evaluate(url: &str, plan: RawPlan) -> Result<EvaluateResult> {
    RemoteClient::new(url)
        .post("/evaluate", &serde_json::json!({ "plan": plan }))
        .await
}

/// Retrieve row descriptions via a remote server.
pub async fn retrieve(url: &str, query: String, top_k: Option<usize>) -> Result<RetrieveResult> {
    RemoteClient::new(url)
        .post(
            "/retrieve",
            &serde_json::json!({ "user_query": query, "top_k": top_k }),
        )
        .await
}
