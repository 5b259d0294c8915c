//! Cloudflare Workers AI model client.
//!
//! Implements [`ModelClient`] over the Workers AI REST endpoint, so the same
//! client serves both embedding and text-generation models; the caller picks
//! the behavior through the model id.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use gitchat_embed::ModelClient;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct RunResponse {
    #[serde(default)]
    result: Value,
    success: bool,
    #[serde(default)]
    errors: Vec<Value>,
}

/// HTTP client for the Workers AI `run` endpoint.
#[derive(Debug, Clone)]
pub struct WorkersAiClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl WorkersAiClient {
    pub fn new(account_id: &str, api_token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!(
                "https://api.cloudflare.com/client/v4/accounts/{account_id}/ai/run"
            ),
            api_token: api_token.into(),
        }
    }
}

#[async_trait]
impl ModelClient for WorkersAiClient {
    async fn run(&self, model_id: &str, input: Value) -> Result<Value> {
        let url = format!("{}/{model_id}", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&input)
            .send()
            .await
            .with_context(|| format!("Workers AI request failed: {model_id}"))?
            .error_for_status()
            .with_context(|| format!("Workers AI returned an error status: {model_id}"))?;

        let body: RunResponse = response
            .json()
            .await
            .with_context(|| format!("malformed Workers AI response: {model_id}"))?;

        if !body.success {
            bail!(
                "Workers AI call unsuccessful for {model_id}: {}",
                serde_json::to_string(&body.errors).unwrap_or_default()
            );
        }
        Ok(body.result)
    }
}
