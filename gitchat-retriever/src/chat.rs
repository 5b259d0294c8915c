//! Context-augmented answer generation.
//!
//! Each user turn runs the adaptive protocol: retrieve code context, generate
//! an answer, and when the model reports it lacked enough material, retrieve a
//! wider set of chunks and generate once more. A turn never issues more than
//! two generation calls, and the first answer is always a usable fallback.

use crate::error::RequestError;
use crate::retrieval::{Retriever, format_matches};
use crate::retrieval::retriever::RetrievalMatch;
use crate::storage::{IndexStatus, StatusStore, status_key};
use gitchat_embed::{EmbeddingGenerator, ModelClient};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

const FIRST_ROUND_TOP_K: usize = 5;
const SECOND_ROUND_TOP_K: usize = 10;

/// History turns kept when the prompt carries no code context.
const UNGROUNDED_HISTORY_WINDOW: usize = 10;
/// Smaller window once snippets consume prompt budget.
const GROUNDED_HISTORY_WINDOW: usize = 8;

const FIRST_ROUND_MAX_TOKENS: u32 = 1000;
const SECOND_ROUND_MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.7;

/// Phrases a model uses to report it lacked the material to answer.
const INSUFFICIENCY_MARKERS: &[&str] = &[
    "need more",
    "don't have",
    "can't find",
    "not available",
    "missing",
    "insufficient",
];

/// Whether `answer` reads as the model reporting inadequate context.
///
/// Purely textual and deliberately fuzzy: a code comment containing "missing"
/// trips it too. The cost of a false positive is one extra retrieval and
/// generation round, never a wrong final answer.
pub fn needs_more_context(answer: &str) -> bool {
    let lowered = answer.to_lowercase();
    INSUFFICIENCY_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a chat conversation, in the wire shape generation models
/// accept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

impl ConversationTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

fn system_prompt(repo_id: &str, indexed: bool) -> String {
    let mut prompt = format!(
        "You are an AI assistant specialized in analyzing GitHub repositories. \
         You help developers understand codebases, answer questions about code \
         structure, dependencies, architecture, and provide insights about the \
         repository.\n\n\
         Current Repository: {repo_id}\n\n\
         Instructions:\n\
         - Be helpful and informative about the repository\n\
         - When code snippets are provided, ground your answer in them and cite files and line ranges\n\
         - Provide insights about common patterns, best practices, or potential improvements\n\
         - Keep responses concise but comprehensive\n\
         - Focus on practical, actionable advice\n\
         - When asked questions not about this repository, give a small response \
         limited to two sentences, and say that you are not an expert in it and \
         that the person should ask somewhere else."
    );
    if !indexed {
        prompt.push_str(
            "\n\nNote: this repository has not been indexed yet, so no code \
             content is available. Say so when asked about specific files or \
             code, and describe what analysis would be possible once it is \
             indexed.",
        );
    }
    prompt
}

/// Drives retrieval and generation for one chat turn.
pub struct ChatEngine {
    model: Arc<dyn ModelClient>,
    generation_model: String,
    embedder: EmbeddingGenerator,
    retriever: Retriever,
    status: Arc<dyn StatusStore>,
}

impl ChatEngine {
    pub fn new(
        model: Arc<dyn ModelClient>,
        generation_model: impl Into<String>,
        embedder: EmbeddingGenerator,
        retriever: Retriever,
        status: Arc<dyn StatusStore>,
    ) -> Self {
        Self {
            model,
            generation_model: generation_model.into(),
            embedder,
            retriever,
            status,
        }
    }

    /// Answer `message` about `repo_id`, given the prior conversation.
    ///
    /// Returns the final answer text. The only hard failures are invalid input
    /// and a failed first generation call; every other problem degrades to an
    /// answer with less (or no) code context.
    pub async fn answer(
        &self,
        message: &str,
        repo_id: &str,
        history: &[ConversationTurn],
    ) -> Result<String, RequestError> {
        if message.trim().is_empty() {
            return Err(RequestError::invalid_input("message must not be empty"));
        }
        if repo_id.trim().is_empty() {
            return Err(RequestError::invalid_input("repository id must not be empty"));
        }

        let indexed = match self.status.get(&status_key(repo_id)).await {
            Ok(value) => IndexStatus::from_value(value.as_deref()) == IndexStatus::Indexed,
            Err(error) => {
                warn!("status lookup failed, answering without context: {error:#}");
                false
            }
        };

        let mut query_vector: Option<Vec<f32>> = None;
        let mut first_matches: Vec<RetrievalMatch> = Vec::new();
        if indexed {
            match self.embedder.embed_query(message).await {
                Ok(vector) => {
                    first_matches = self
                        .retriever
                        .retrieve(&vector, repo_id, FIRST_ROUND_TOP_K)
                        .await;
                    query_vector = Some(vector);
                }
                Err(error) => {
                    warn!("query embedding failed, answering without context: {error:#}");
                }
            }
        }

        let context = format_matches(&first_matches);
        let grounded = !context.is_empty();

        let user_content = if grounded {
            format!(
                "{message}{context}\n\nAnswer using the code context above and \
                 cite the file and line range for each claim."
            )
        } else {
            message.to_string()
        };

        let window = if grounded {
            GROUNDED_HISTORY_WINDOW
        } else {
            UNGROUNDED_HISTORY_WINDOW
        };
        let start = history.len().saturating_sub(window);

        let mut messages: Vec<ConversationTurn> =
            Vec::with_capacity(history.len() - start + 2);
        messages.push(ConversationTurn::system(system_prompt(repo_id, indexed)));
        messages.extend(history[start..].iter().cloned());
        messages.push(ConversationTurn::user(user_content));

        let first_answer = self.generate(&messages, FIRST_ROUND_MAX_TOKENS).await?;

        if !(needs_more_context(&first_answer) && indexed && !first_matches.is_empty()) {
            return Ok(first_answer);
        }

        debug!(repo_id, "first answer reported insufficient context, widening retrieval");
        match self
            .second_round(&mut messages, &first_answer, &first_matches, query_vector, repo_id)
            .await
        {
            Some(second_answer) => Ok(second_answer),
            None => Ok(first_answer),
        }
    }

    /// Widened retrieval plus one more generation call. Any failure here
    /// returns `None` and the first answer stands.
    async fn second_round(
        &self,
        messages: &mut Vec<ConversationTurn>,
        first_answer: &str,
        first_matches: &[RetrievalMatch],
        query_vector: Option<Vec<f32>>,
        repo_id: &str,
    ) -> Option<String> {
        let vector = query_vector?;
        let wider = self
            .retriever
            .retrieve(&vector, repo_id, SECOND_ROUND_TOP_K)
            .await;

        let seen: HashSet<(String, usize)> = first_matches
            .iter()
            .map(|m| (m.chunk.file_path.clone(), m.chunk.start_line))
            .collect();
        let incremental: Vec<RetrievalMatch> = wider
            .into_iter()
            .filter(|m| !seen.contains(&(m.chunk.file_path.clone(), m.chunk.start_line)))
            .collect();

        if incremental.is_empty() {
            debug!(repo_id, "no new chunks beyond the first round");
            return None;
        }

        let incremental_context = format_matches(&incremental);
        messages.push(ConversationTurn::assistant(first_answer));
        messages.push(ConversationTurn::user(format!(
            "Here is additional code context from the repository.{incremental_context}\n\n\
             Using it together with everything above, give a complete answer to \
             my original question, citing files and line ranges."
        )));

        match self.generate(messages, SECOND_ROUND_MAX_TOKENS).await {
            Ok(answer) => Some(answer),
            Err(error) => {
                warn!("second-round generation failed, keeping first answer: {error:#}");
                None
            }
        }
    }

    async fn generate(
        &self,
        messages: &[ConversationTurn],
        max_tokens: u32,
    ) -> Result<String, RequestError> {
        let result = self
            .model
            .run(
                &self.generation_model,
                json!({
                    "messages": messages,
                    "max_tokens": max_tokens,
                    "temperature": TEMPERATURE,
                }),
            )
            .await?;

        result
            .get("response")
            .and_then(|value| value.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                RequestError::from(anyhow::anyhow!(
                    "generation response missing text field"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_self_reported_insufficiency() {
        assert!(needs_more_context("I don't have enough information."));
        assert!(needs_more_context("The relevant file seems to be MISSING."));
        assert!(needs_more_context("I would need more context to say."));
        assert!(!needs_more_context("The parser lives in src/parse.rs."));
    }

    #[test]
    fn marker_matching_is_substring_based() {
        // Accepted imprecision: ordinary prose can trip the heuristic.
        assert!(needs_more_context("the config key is missingno_mode"));
    }

    #[test]
    fn turns_serialize_with_lowercase_roles() {
        let turn = ConversationTurn::assistant("hi");
        let rendered = serde_json::to_string(&turn).unwrap();
        assert_eq!(rendered, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn system_prompt_discloses_unindexed_repositories() {
        let indexed = system_prompt("o/r", true);
        let unindexed = system_prompt("o/r", false);
        assert!(indexed.contains("Current Repository: o/r"));
        assert!(!indexed.contains("has not been indexed"));
        assert!(unindexed.contains("has not been indexed"));
    }
}
