//! GitHub release creation
//!
//! The release is the last, externally visible step of a run. It goes
//! through [ReleaseHost] so runs can be tested without the network.

pub mod client;
pub mod mock;

pub use client::GitHubClient;
pub use mock::MockReleaseHost;

use crate::error::{ReleaseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `owner/name` of a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl RepoSlug {
    /// Parse `owner/name`
    pub fn parse(slug: &str) -> Result<Self> {
        let mut parts = slug.trim().splitn(2, '/');
        match (parts.next(), parts.next()) {
            (Some(owner), Some(name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(RepoSlug {
                    owner: owner.to_string(),
                    name: name.trim_end_matches(".git").to_string(),
                })
            }
            _ => Err(ReleaseError::config(format!(
                "Invalid GitHub repository '{}': expected owner/name",
                slug
            ))),
        }
    }

    /// Parse a GitHub remote URL:
    /// `https://github.com/owner/name(.git)`, `git@github.com:owner/name.git`
    /// or `ssh://git@github.com/owner/name.git`.
    pub fn from_remote_url(url: &str) -> Option<Self> {
        let url = url.trim();
        let path = if let Some(rest) = url.strip_prefix("git@github.com:") {
            rest
        } else {
            let idx = url.find("github.com/")?;
            &url[idx + "github.com/".len()..]
        };

        Self::parse(path.trim_end_matches('/')).ok()
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Body of `POST /repos/{owner}/{repo}/releases`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReleaseRequest {
    pub tag_name: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub prerelease: bool,
}

/// The fields of the created release the pipeline reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedRelease {
    pub id: u64,
    pub html_url: String,
}

/// Somewhere a release object can be created for a pushed tag
pub trait ReleaseHost {
    fn create_release(
        &self,
        repository: &RepoSlug,
        request: &ReleaseRequest,
        token: &str,
    ) -> Result<PublishedRelease>;
}
