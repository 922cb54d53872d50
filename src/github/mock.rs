use crate::error::{ReleaseError, Result};
use crate::github::{PublishedRelease, ReleaseHost, ReleaseRequest, RepoSlug};
use std::cell::{Cell, RefCell};

/// Records release requests instead of calling GitHub
#[derive(Default)]
pub struct MockReleaseHost {
    releases: RefCell<Vec<(RepoSlug, ReleaseRequest)>>,
    fail_with: Cell<Option<u16>>,
}

impl MockReleaseHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request with this HTTP status
    pub fn fail_with_status(&self, status: u16) {
        self.fail_with.set(Some(status));
    }

    pub fn releases(&self) -> Vec<(RepoSlug, ReleaseRequest)> {
        self.releases.borrow().clone()
    }
}

impl ReleaseHost for MockReleaseHost {
    fn create_release(
        &self,
        repository: &RepoSlug,
        request: &ReleaseRequest,
        token: &str,
    ) -> Result<PublishedRelease> {
        if let Some(status) = self.fail_with.get() {
            return Err(ReleaseError::GitHub {
                status,
                body: "mock failure".to_string(),
            });
        }
        if token.is_empty() {
            return Err(ReleaseError::GitHub {
                status: 401,
                body: "Bad credentials".to_string(),
            });
        }

        let mut releases = self.releases.borrow_mut();
        releases.push((repository.clone(), request.clone()));

        Ok(PublishedRelease {
            id: releases.len() as u64,
            html_url: format!(
                "https://github.com/{}/releases/tag/{}",
                repository, request.tag_name
            ),
        })
    }
}
