use crate::error::{ReleaseError, Result};
use crate::github::{PublishedRelease, ReleaseHost, ReleaseRequest, RepoSlug};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};

const API_VERSION: &str = "2022-11-28";

/// GitHub REST client for release creation
pub struct GitHubClient {
    http: Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(GitHubClient {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn releases_url(&self, repository: &RepoSlug) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.api_url, repository.owner, repository.name
        )
    }
}

impl ReleaseHost for GitHubClient {
    fn create_release(
        &self,
        repository: &RepoSlug,
        request: &ReleaseRequest,
        token: &str,
    ) -> Result<PublishedRelease> {
        let url = self.releases_url(repository);
        log::info!("Creating release {} on {}", request.tag_name, repository);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, concat!("pyrelease/", env!("CARGO_PKG_VERSION")))
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ReleaseError::GitHub {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<PublishedRelease>()?)
    }
}
