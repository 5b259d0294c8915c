//! Errors surfaced by the two exposed operations.

/// Error type for `index_repository` and `answer`.
///
/// Only two conditions reach callers: malformed input, reported immediately
/// without retry, and an upstream collaborator being unavailable at a point
/// where no degraded result exists. Everything else — a failed blob fetch, a
/// dropped chunk embedding, a vector query error, a failed second-round
/// generation — degrades inside the pipeline instead of propagating.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Missing or malformed repository identifier or message.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A required upstream call (repository browser, model, store) failed.
    #[error("upstream service unavailable: {source}")]
    Upstream {
        #[from]
        source: anyhow::Error,
    },
}

impl RequestError {
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput(message.into())
    }
}
