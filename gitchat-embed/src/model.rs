//! Remote model invocation contract.

use async_trait::async_trait;
use serde_json::Value;

/// An opaque remote model endpoint.
///
/// Both the embedding model and the generation model are reached through this
/// single contract: a model identifier plus a JSON payload in, a JSON payload
/// out. Callers own the interpretation of both payloads — embedding callers go
/// through [`parse_embedding_response`](crate::response::parse_embedding_response),
/// generation callers read the response text out of the returned value.
///
/// Implementations must be safe to share across tasks; batch embedding issues
/// up to ten concurrent calls against the same client.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Invoke `model_id` with the given input payload.
    async fn run(&self, model_id: &str, input: Value) -> anyhow::Result<Value>;
}
