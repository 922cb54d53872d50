//! Git operations abstraction layer
//!
//! The release pipeline only talks to git through the [Repository] trait so
//! the whole run can be exercised against [mock::MockRepository] in tests.
//!
//! - [repository::Git2Repository]: real implementation using the `git2` crate
//! - [mock::MockRepository]: in-memory implementation recording every mutation

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use git2::Oid;
use std::path::{Path, PathBuf};

/// Common git operation trait for abstraction
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying errors (like `git2::Error`) to the appropriate
/// [crate::error::ReleaseError] variants.
pub trait Repository {
    /// Root of the working tree
    fn workdir(&self) -> Result<PathBuf>;

    /// Short name of the checked-out branch. Errors on a detached HEAD.
    fn current_branch(&self) -> Result<String>;

    /// Commit HEAD points to
    fn head_oid(&self) -> Result<Oid>;

    /// True when no tracked file has staged or unstaged changes.
    /// Untracked files are ignored.
    fn is_worktree_clean(&self) -> Result<bool>;

    /// Tracked files whose work tree content differs from the index, as
    /// absolute paths. Untracked files are not listed.
    fn modified_paths(&self) -> Result<Vec<PathBuf>>;

    /// Find a tag by name and get the commit it points to
    ///
    /// # Returns
    /// * `Ok(Some(Oid))` - Commit the tag resolves to
    /// * `Ok(None)` - If the tag doesn't exist
    fn find_tag_oid(&self, tag_name: &str) -> Result<Option<Oid>>;

    /// Get all tag names in the repository
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Add files to the index. Paths may be absolute (inside the work tree)
    /// or relative to it.
    fn stage_paths(&self, paths: &[PathBuf]) -> Result<()>;

    /// Commit the index on top of HEAD and return the new commit
    fn commit(&self, message: &str) -> Result<Oid>;

    /// Create a lightweight tag at given OID. Fails if the tag exists.
    fn create_tag(&self, name: &str, oid: Oid) -> Result<()>;

    /// Push refspecs to a remote in a single push. A rejected reference is
    /// an error.
    fn push(&self, remote: &str, refspecs: &[String]) -> Result<()>;

    /// Fetch all tags from a remote
    fn fetch_tags(&self, remote: &str) -> Result<()>;

    /// Configured URL of a remote, if the remote exists
    fn remote_url(&self, remote: &str) -> Result<Option<String>>;
}

/// Make `path` relative to `workdir` when it lives inside it.
pub fn relative_to(path: &Path, workdir: &Path) -> PathBuf {
    path.strip_prefix(workdir).unwrap_or(path).to_path_buf()
}
