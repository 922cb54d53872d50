use crate::error::{ReleaseError, Result};
use crate::git::relative_to;
use git2::{Oid, Repository as Git2Repo, Signature, Status, StatusOptions};
use std::path::{Path, PathBuf};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    author: Option<(String, String)>,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo, author: None })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo, author: None }
    }

    /// Use a fixed author for release commits instead of `user.name`/`user.email`
    pub fn with_author(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.author = Some((name.into(), email.into()));
        self
    }

    fn signature(&self) -> Result<Signature<'static>> {
        match &self.author {
            Some((name, email)) => Ok(Signature::now(name, email)?),
            None => self.repo.signature().map_err(|e| {
                ReleaseError::config(format!(
                    "No git identity configured (set user.name/user.email or git.author_*): {}",
                    e
                ))
            }),
        }
    }

    fn remote_callbacks<'a>() -> git2::RemoteCallbacks<'a> {
        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|url, username_from_url, allowed_types| {
            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
                {
                    return Ok(cred);
                }
            }

            // CI checkouts authenticate HTTPS pushes with the workflow token
            if allowed_types.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
                if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                    return git2::Cred::userpass_plaintext("x-access-token", &token);
                }
                if let Ok(config) = git2::Config::open_default() {
                    if let Ok(cred) = git2::Cred::credential_helper(&config, url, username_from_url)
                    {
                        return Ok(cred);
                    }
                }
            }

            git2::Cred::default()
        });
        callbacks
    }
}

impl super::Repository for Git2Repository {
    fn workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| ReleaseError::config("Repository is bare: no working tree"))
    }

    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(ReleaseError::remote(
                "HEAD is detached; check out the release branch before releasing",
            ));
        }

        head.shorthand()
            .map(|s| s.to_string())
            .ok_or_else(|| ReleaseError::remote("Branch name is not valid UTF-8"))
    }

    fn head_oid(&self) -> Result<Oid> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(commit.id())
    }

    fn is_worktree_clean(&self) -> Result<bool> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        Ok(statuses.is_empty())
    }

    fn modified_paths(&self) -> Result<Vec<PathBuf>> {
        let workdir = super::Repository::workdir(self)?;
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut options))?;
        let changed = Status::WT_MODIFIED | Status::WT_TYPECHANGE;
        Ok(statuses
            .iter()
            .filter(|entry| entry.status().intersects(changed))
            .filter_map(|entry| entry.path().map(|path| workdir.join(path)))
            .collect())
    }

    fn find_tag_oid(&self, tag_name: &str) -> Result<Option<Oid>> {
        let reference_name = format!("refs/tags/{}", tag_name);

        match self.repo.find_reference(&reference_name) {
            Ok(reference) => {
                let oid = reference
                    .peel(git2::ObjectType::Commit)
                    .map_err(|e| ReleaseError::tag(format!("Cannot peel tag: {}", e)))?
                    .id();

                Ok(Some(oid))
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(ReleaseError::tag(format!(
                "Cannot find tag '{}': {}",
                tag_name, e
            ))),
        }
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn stage_paths(&self, paths: &[PathBuf]) -> Result<()> {
        let workdir = super::Repository::workdir(self)?;
        let mut index = self.repo.index()?;

        for path in paths {
            let relative = relative_to(path, &workdir);
            index.add_path(&relative).map_err(|e| {
                ReleaseError::Git(git2::Error::from_str(&format!(
                    "Cannot stage {}: {}",
                    relative.display(),
                    e
                )))
            })?;
        }

        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<Oid> {
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.signature()?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) => return Err(e.into()),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        Ok(oid)
    }

    fn create_tag(&self, name: &str, oid: Oid) -> Result<()> {
        let object = self
            .repo
            .find_object(oid, None)
            .map_err(|e| ReleaseError::tag(format!("Cannot find object: {}", e)))?;

        self.repo
            .tag_lightweight(name, &object, false)
            .map_err(|e| ReleaseError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

        Ok(())
    }

    fn push(&self, remote: &str, refspecs: &[String]) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote)
            .map_err(|e| ReleaseError::remote(format!("Cannot find remote: {}", e)))?;

        let mut callbacks = Self::remote_callbacks();
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "Remote rejected {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec_strs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();

        remote
            .push(&refspec_strs, Some(&mut push_options))
            .map_err(|e| {
                if e.class() == git2::ErrorClass::Net {
                    ReleaseError::remote(format!("Network error during push: {}", e))
                } else {
                    ReleaseError::remote(format!("Push failed: {}", e))
                }
            })?;

        Ok(())
    }

    fn fetch_tags(&self, remote: &str) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote)
            .map_err(|e| ReleaseError::remote(format!("Cannot find remote: {}", e)))?;

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(Self::remote_callbacks());

        remote
            .fetch(&["+refs/tags/*:refs/tags/*"], Some(&mut fetch_options), None)
            .map_err(|e| ReleaseError::remote(format!("Fetch failed: {}", e)))?;

        Ok(())
    }

    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        match self.repo.find_remote(remote) {
            Ok(remote) => Ok(remote.url().map(|s| s.to_string())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
