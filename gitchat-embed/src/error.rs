//! Error types for the embedding pipeline

/// Result type for embedding operations.
pub type Result<T> = std::result::Result<T, EmbedError>;

/// Error type for remote embedding generation.
///
/// The remote model's response shape is not guaranteed, so shape mismatches get
/// their own variant rather than being folded into a generic call failure: a
/// reachable model returning garbage is a different situation from a model that
/// cannot be reached at all.
#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    /// The model responded, but with none of the known embedding shapes.
    #[error("embedding response did not match any known shape: {detail}")]
    InvalidResponseShape { detail: String },

    /// The model invocation itself failed (network, auth, remote error).
    #[error("embedding model call failed: {source}")]
    ModelCall {
        #[source]
        source: anyhow::Error,
    },
}

impl EmbedError {
    /// Create an [`EmbedError::InvalidResponseShape`] with a descriptive detail.
    pub fn invalid_shape<S: Into<String>>(detail: S) -> Self {
        Self::InvalidResponseShape {
            detail: detail.into(),
        }
    }

    /// Wrap a failed model invocation.
    pub fn model_call(source: anyhow::Error) -> Self {
        Self::ModelCall { source }
    }
}
