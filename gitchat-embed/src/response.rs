//! Shape-polymorphic parsing of embedding model responses.
//!
//! Embedding endpoints do not agree on a response envelope. The ones this system
//! talks to return one of three equivalent shapes for a single-text request:
//!
//! - a wrapped list: `{"data": [[0.1, 0.2, ...]]}`
//! - a bare list: `[[0.1, 0.2, ...]]`
//! - an object exposing the vector directly: `{"embedding": [0.1, 0.2, ...]}`
//!
//! Detection is an ordered set of rules with an explicit failure arm; a response
//! matching none of the shapes is an [`EmbedError::InvalidResponseShape`], never
//! a silent coercion.

use crate::error::{EmbedError, Result};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct WrappedShape {
    data: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct FlatShape {
    embedding: Vec<f32>,
}

/// Extract the query/chunk vector from a model response of any known shape.
pub fn parse_embedding_response(response: Value) -> Result<Vec<f32>> {
    if let Ok(WrappedShape { mut data }) = serde_json::from_value::<WrappedShape>(response.clone())
    {
        if !data.is_empty() {
            return Ok(data.swap_remove(0));
        }
    }

    if let Ok(mut rows) = serde_json::from_value::<Vec<Vec<f32>>>(response.clone()) {
        if !rows.is_empty() {
            return Ok(rows.swap_remove(0));
        }
    }

    if let Ok(FlatShape { embedding }) = serde_json::from_value::<FlatShape>(response.clone()) {
        return Ok(embedding);
    }

    Err(EmbedError::invalid_shape(describe(&response)))
}

/// Short, bounded description of an unrecognized payload for error messages.
fn describe(value: &Value) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() > 120 {
        let prefix: String = rendered.chars().take(120).collect();
        format!("{prefix}...")
    } else {
        rendered
    }
}
