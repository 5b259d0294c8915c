//! Repository browsing: the external source-control collaborator.
//!
//! The indexing pipeline only needs three operations from the source-control
//! host — resolve the default branch, enumerate the file tree, fetch a blob —
//! captured by [`RepoBrowser`]. [`GithubClient`] implements the trait against
//! the GitHub REST API; tests substitute canned implementations.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;

const USER_AGENT: &str = "gitchat-app";

/// One entry of a repository tree listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    /// `"blob"` for files, `"tree"` for directories.
    #[serde(rename = "type")]
    pub kind: String,
    pub sha: String,
    /// Blob size in bytes; directories have none.
    pub size: Option<u64>,
}

impl TreeEntry {
    pub fn is_blob(&self) -> bool {
        self.kind == "blob"
    }
}

/// Read-only view of a hosted repository.
#[async_trait]
pub trait RepoBrowser: Send + Sync {
    /// Name of the repository's default branch.
    async fn default_branch(&self, owner: &str, repo: &str) -> Result<String>;

    /// The full recursive file tree at `git_ref`.
    async fn list_tree(&self, owner: &str, repo: &str, git_ref: &str) -> Result<Vec<TreeEntry>>;

    /// Raw blob content, base64-or-plain; callers decode via the extractor.
    async fn get_blob(&self, owner: &str, repo: &str, sha: &str) -> Result<String>;
}

/// Split an `owner/name` repository identifier into its parts.
pub fn split_repo_id(repo_id: &str) -> Option<(&str, &str)> {
    let (owner, name) = repo_id.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner, name))
}

/// Extract `(owner, name)` from a GitHub repository URL.
///
/// Accepts `https://github.com/owner/repo` (optionally `www.`, optionally with
/// extra path segments or a trailing `.git`); anything else is rejected.
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let (host, path) = rest.split_once('/')?;
    if host != "github.com" && host != "www.github.com" {
        return None;
    }

    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let name = segments.next()?.trim_end_matches(".git");
    if owner.is_empty() || name.is_empty() {
        return None;
    }
    Some((owner.to_string(), name.to_string()))
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
}

#[derive(Debug, Deserialize)]
struct BlobResponse {
    content: String,
    encoding: String,
}

/// [`RepoBrowser`] over the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url("https://api.github.com", token)
    }

    /// Point the client at a different API root (used by tests).
    pub fn with_base_url(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut request = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("GitHub request failed: {url}"))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            bail!("GitHub resource not found: {url}");
        }
        let response = response
            .error_for_status()
            .with_context(|| format!("GitHub API error: {url}"))?;

        response
            .json()
            .await
            .with_context(|| format!("malformed GitHub response: {url}"))
    }
}

#[async_trait]
impl RepoBrowser for GithubClient {
    async fn default_branch(&self, owner: &str, repo: &str) -> Result<String> {
        let url = format!("{}/repos/{owner}/{repo}", self.base_url);
        let info: RepoResponse = self.get_json(&url).await?;
        Ok(info.default_branch)
    }

    async fn list_tree(&self, owner: &str, repo: &str, git_ref: &str) -> Result<Vec<TreeEntry>> {
        let url = format!(
            "{}/repos/{owner}/{repo}/git/trees/{git_ref}?recursive=1",
            self.base_url
        );
        let listing: TreeResponse = self.get_json(&url).await?;
        Ok(listing.tree)
    }

    async fn get_blob(&self, owner: &str, repo: &str, sha: &str) -> Result<String> {
        let url = format!("{}/repos/{owner}/{repo}/git/blobs/{sha}", self.base_url);
        let blob: BlobResponse = self.get_json(&url).await?;

        // The API wraps base64 payloads at 60 columns; strip the transport
        // newlines so downstream base64 detection sees a pure payload.
        if blob.encoding == "base64" {
            Ok(blob.content.chars().filter(|c| !c.is_whitespace()).collect())
        } else {
            Ok(blob.content)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_repository_urls() {
        assert_eq!(
            parse_github_url("https://github.com/octocat/hello-world"),
            Some(("octocat".to_string(), "hello-world".to_string()))
        );
        assert_eq!(
            parse_github_url("https://www.github.com/octocat/hello-world/tree/main"),
            Some(("octocat".to_string(), "hello-world".to_string()))
        );
        assert_eq!(
            parse_github_url("https://github.com/octocat/hello.git"),
            Some(("octocat".to_string(), "hello".to_string()))
        );
    }

    #[test]
    fn rejects_non_github_urls() {
        assert_eq!(parse_github_url("https://gitlab.com/a/b"), None);
        assert_eq!(parse_github_url("https://github.com/onlyowner"), None);
        assert_eq!(parse_github_url("not a url"), None);
    }

    #[test]
    fn splits_repository_identifiers() {
        assert_eq!(split_repo_id("octocat/hello"), Some(("octocat", "hello")));
        assert_eq!(split_repo_id("octocat"), None);
        assert_eq!(split_repo_id("a/b/c"), None);
        assert_eq!(split_repo_id("/b"), None);
        assert_eq!(split_repo_id("a/"), None);
    }
}
