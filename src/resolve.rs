//! Branch/tag resolution for repository references.
//!
//! When the caller pins anything other than the two conventional defaults
//! (`main`, `master`), that reference is used verbatim. Otherwise the hosting
//! service's branch listing decides which default actually exists. Resolution
//! never fails the run: any transport or parse problem falls back to `main`
//! with a warning.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use tracing::{debug, info, warn};

use crate::fetch::{host_of, FetchError, RepoHost};

/// Lists branch names for a repository. Implemented by the HTTP client and by
/// mocks in tests.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait BranchLister: Send + Sync {
    async fn list_branches<'a>(
        &self,
        repo_url: &str,
        token: Option<&'a str>,
    ) -> Result<Vec<String>, FetchError>;
}

/// Resolve the concrete reference to fetch.
///
/// Must never return an error; the worst outcome is the `main` fallback.
pub async fn resolve_reference<L>(
    lister: &L,
    repo_url: &str,
    requested: Option<&str>,
    token: Option<&str>,
) -> String
where
    L: BranchLister + ?Sized,
{
    if let Some(reference) = requested {
        if reference != "main" && reference != "master" {
            debug!(reference, "Using explicitly requested reference");
            return reference.to_string();
        }
    }

    match lister.list_branches(repo_url, token).await {
        Ok(branches) => {
            if branches.iter().any(|b| b == "main") {
                info!(repo_url, "Resolved default branch to 'main'");
                "main".to_string()
            } else if branches.iter().any(|b| b == "master") {
                info!(repo_url, "Resolved default branch to 'master'");
                "master".to_string()
            } else {
                warn!(
                    repo_url,
                    branches = branches.len(),
                    "Neither 'main' nor 'master' found in branch listing, assuming 'main'"
                );
                "main".to_string()
            }
        }
        Err(e) => {
            warn!(
                repo_url,
                error = %e,
                "Branch listing unavailable, falling back to 'main'"
            );
            "main".to_string()
        }
    }
}

/// Branch lister backed by the hosting service's REST API.
pub struct HttpBranchLister {
    client: reqwest::Client,
}

impl HttpBranchLister {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpBranchLister {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BranchLister for HttpBranchLister {
    async fn list_branches<'a>(
        &self,
        repo_url: &str,
        token: Option<&'a str>,
    ) -> Result<Vec<String>, FetchError> {
        let url = branch_listing_url(repo_url)?;
        debug!(url = %url, "Querying branch listing endpoint");

        let mut request = self
            .client
            .get(&url)
            .header("User-Agent", "repo2doc");
        if let Some(token) = token {
            request = match host_of(repo_url)? {
                RepoHost::Github => request.header("Authorization", format!("token {token}")),
                RepoHost::Gitlab => request.header("PRIVATE-TOKEN", token.to_string()),
            };
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let listing = response.json::<serde_json::Value>().await?;
        let branches = listing
            .as_array()
            .ok_or_else(|| FetchError::Other("branch listing was not a JSON array".to_string()))?
            .iter()
            .filter_map(|b| b.get("name").and_then(|n| n.as_str()))
            .map(str::to_string)
            .collect();
        Ok(branches)
    }
}

/// Branch-listing endpoint for the supported hosts.
fn branch_listing_url(repo_url: &str) -> Result<String, FetchError> {
    let trimmed = repo_url.trim_end_matches('/').trim_end_matches(".git");
    match host_of(repo_url)? {
        RepoHost::Github => {
            let path = trimmed
                .splitn(2, "github.com/")
                .nth(1)
                .ok_or_else(|| FetchError::Other(format!("malformed GitHub URL: {repo_url}")))?;
            Ok(format!("https://api.github.com/repos/{path}/branches?per_page=100"))
        }
        RepoHost::Gitlab => {
            let path = trimmed
                .splitn(2, "gitlab.com/")
                .nth(1)
                .ok_or_else(|| FetchError::Other(format!("malformed GitLab URL: {repo_url}")))?;
            let encoded = path.replace('/', "%2F");
            Ok(format!(
                "https://gitlab.com/api/v4/projects/{encoded}/repository/branches"
            ))
        }
    }
}
