//! Archive download: URL construction and the HTTP transport seam.
//!
//! Only GitHub and GitLab are supported; anything else is a fatal
//! `UnsupportedHost`. The transport sits behind [`ArchiveFetcher`] so the
//! pipeline can run against mocks in tests.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unsupported repository host: {0} (only GitHub and GitLab are supported)")]
    UnsupportedHost(String),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("{0}")]
    Other(String),
}

/// The hosting services the compiler knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoHost {
    Github,
    Gitlab,
}

pub fn host_of(repo_url: &str) -> Result<RepoHost, FetchError> {
    if repo_url.contains("github.com") {
        Ok(RepoHost::Github)
    } else if repo_url.contains("gitlab.com") {
        Ok(RepoHost::Gitlab)
    } else {
        Err(FetchError::UnsupportedHost(repo_url.to_string()))
    }
}

/// Short repository name, used for output file naming.
pub fn repo_name(repo_url: &str) -> String {
    repo_url
        .trim_end_matches('/')
        .trim_end_matches(".git")
        .rsplit('/')
        .next()
        .unwrap_or("repository")
        .to_string()
}

/// Build the zip-archive download URL for the given reference.
pub fn construct_download_url(repo_url: &str, reference: &str) -> Result<String, FetchError> {
    let trimmed = repo_url.trim_end_matches('/').trim_end_matches(".git");
    match host_of(repo_url)? {
        RepoHost::Github => Ok(format!("{trimmed}/archive/refs/heads/{reference}.zip")),
        RepoHost::Gitlab => {
            let name = repo_name(repo_url);
            Ok(format!("{trimmed}/-/archive/{reference}/{name}-{reference}.zip"))
        }
    }
}

/// Fetches the raw archive bytes for a repository reference.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    async fn fetch_archive<'a>(
        &self,
        repo_url: &str,
        reference: &str,
        token: Option<&'a str>,
    ) -> Result<Vec<u8>, FetchError>;
}

/// Production fetcher: one blocking-style GET per run, no retries.
pub struct HttpArchiveFetcher {
    client: reqwest::Client,
}

impl HttpArchiveFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpArchiveFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArchiveFetcher for HttpArchiveFetcher {
    async fn fetch_archive<'a>(
        &self,
        repo_url: &str,
        reference: &str,
        token: Option<&'a str>,
    ) -> Result<Vec<u8>, FetchError> {
        let url = construct_download_url(repo_url, reference)?;
        info!(url = %url, "Downloading repository archive");

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

        let bytes = response.bytes().await?;
        debug!(size = bytes.len(), "Archive downloaded");
        Ok(bytes.to_vec())
    }
}
