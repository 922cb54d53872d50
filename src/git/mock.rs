use crate::error::{ReleaseError, Result};
use crate::git::{relative_to, Repository};
use git2::Oid;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;

/// A commit recorded by [MockRepository]
#[derive(Debug, Clone, PartialEq)]
pub struct MockCommit {
    pub oid: Oid,
    pub message: String,
    pub paths: Vec<PathBuf>,
}

/// Mock repository for testing without actual git operations
pub struct MockRepository {
    workdir: PathBuf,
    branch: String,
    head: Cell<Oid>,
    clean: Cell<bool>,
    tags: RefCell<HashMap<String, Oid>>,
    staged: RefCell<Vec<PathBuf>>,
    modified: RefCell<Vec<PathBuf>>,
    commits: RefCell<Vec<MockCommit>>,
    pushes: RefCell<Vec<(String, Vec<String>)>>,
    fetches: Cell<usize>,
    remotes: HashMap<String, String>,
    reject_push: Cell<bool>,
}

impl MockRepository {
    /// Create an empty mock repository rooted at `workdir` on branch `main`
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        MockRepository {
            workdir: workdir.into(),
            branch: "main".to_string(),
            head: Cell::new(Oid::zero()),
            clean: Cell::new(true),
            tags: RefCell::new(HashMap::new()),
            staged: RefCell::new(Vec::new()),
            modified: RefCell::new(Vec::new()),
            commits: RefCell::new(Vec::new()),
            pushes: RefCell::new(Vec::new()),
            fetches: Cell::new(0),
            remotes: HashMap::new(),
            reject_push: Cell::new(false),
        }
    }

    /// Add a tag pointing to an OID
    pub fn add_tag(&self, name: impl Into<String>, oid: Oid) {
        self.tags.borrow_mut().insert(name.into(), oid);
    }

    pub fn add_remote(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.remotes.insert(name.into(), url.into());
    }

    pub fn set_clean(&self, clean: bool) {
        self.clean.set(clean);
    }

    /// Mark a tracked file as changed in the work tree until it is staged
    pub fn touch(&self, path: impl Into<PathBuf>) {
        let path = relative_to(&path.into(), &self.workdir);
        let mut modified = self.modified.borrow_mut();
        if !modified.contains(&path) {
            modified.push(path);
        }
    }

    /// Paths staged since the last commit
    pub fn staged(&self) -> Vec<PathBuf> {
        self.staged.borrow().clone()
    }

    /// Make every following push fail as if the remote rejected it
    pub fn reject_pushes(&self) {
        self.reject_push.set(true);
    }

    pub fn commits(&self) -> Vec<MockCommit> {
        self.commits.borrow().clone()
    }

    pub fn tags(&self) -> HashMap<String, Oid> {
        self.tags.borrow().clone()
    }

    pub fn pushes(&self) -> Vec<(String, Vec<String>)> {
        self.pushes.borrow().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl Repository for MockRepository {
    fn workdir(&self) -> Result<PathBuf> {
        Ok(self.workdir.clone())
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn head_oid(&self) -> Result<Oid> {
        Ok(self.head.get())
    }

    fn is_worktree_clean(&self) -> Result<bool> {
        Ok(self.clean.get() && self.modified.borrow().is_empty())
    }

    fn modified_paths(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .modified
            .borrow()
            .iter()
            .map(|path| self.workdir.join(path))
            .collect())
    }

    fn find_tag_oid(&self, tag_name: &str) -> Result<Option<Oid>> {
        Ok(self.tags.borrow().get(tag_name).copied())
    }

    fn list_tags(&self) -> Result<Vec<String>> {
        let mut tags: Vec<String> = self.tags.borrow().keys().cloned().collect();
        tags.sort();
        Ok(tags)
    }

    fn stage_paths(&self, paths: &[PathBuf]) -> Result<()> {
        let mut staged = self.staged.borrow_mut();
        let mut modified = self.modified.borrow_mut();
        for path in paths {
            let path = relative_to(path, &self.workdir);
            modified.retain(|m| *m != path);
            if !staged.contains(&path) {
                staged.push(path);
            }
        }
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<Oid> {
        let mut commits = self.commits.borrow_mut();
        let seed = format!("{}:{}", commits.len(), message);
        let oid = Oid::hash_object(git2::ObjectType::Blob, seed.as_bytes())?;

        commits.push(MockCommit {
            oid,
            message: message.to_string(),
            paths: self.staged.borrow_mut().drain(..).collect(),
        });
        self.head.set(oid);
        Ok(oid)
    }

    fn create_tag(&self, name: &str, oid: Oid) -> Result<()> {
        let mut tags = self.tags.borrow_mut();
        if tags.contains_key(name) {
            return Err(ReleaseError::tag(format!("Tag '{}' already exists", name)));
        }
        tags.insert(name.to_string(), oid);
        Ok(())
    }

    fn push(&self, remote: &str, refspecs: &[String]) -> Result<()> {
        if self.reject_push.get() {
            return Err(ReleaseError::remote(format!(
                "Remote '{}' rejected {}",
                remote,
                refspecs.join(" ")
            )));
        }
        self.pushes
            .borrow_mut()
            .push((remote.to_string(), refspecs.to_vec()));
        Ok(())
    }

    fn fetch_tags(&self, remote: &str) -> Result<()> {
        if !self.remotes.is_empty() && !self.remotes.contains_key(remote) {
            return Err(ReleaseError::remote(format!("Cannot find remote: {}", remote)));
        }
        self.fetches.set(self.fetches.get() + 1);
        Ok(())
    }

    fn remote_url(&self, remote: &str) -> Result<Option<String>> {
        Ok(self.remotes.get(remote).cloned())
    }
}
