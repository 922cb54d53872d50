//! Version resolution: compute the next version (dry run) and apply it to
//! the tracked files (real bump).

pub mod marker;

pub use marker::VersionMarker;

use crate::domain::{TagPattern, Version, VersionBump};
use crate::error::{ReleaseError, Result};
use regex::{Captures, Regex};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A dotted run of digits. The current version is only replaced where it
/// is a whole token, so `11.2.34` is left alone when bumping `1.2.3`.
const VERSION_TOKEN_PATTERN: &str = r"\d+(?:\.\d+)*";

/// Outcome of the dry-run bump, consumed by [VersionResolver::apply]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BumpPlan {
    pub bump: VersionBump,
    pub current: Version,
    pub next: Version,
    pub tag: String,
    /// Absolute paths of the files whose version string will change,
    /// marker first
    pub files: Vec<PathBuf>,
}

/// Reads and rewrites the version marker and the files it tracks
pub struct VersionResolver {
    workdir: PathBuf,
    marker: PathBuf,
    extra_files: Vec<PathBuf>,
    pattern: TagPattern,
}

impl VersionResolver {
    pub fn new(
        workdir: impl Into<PathBuf>,
        marker: impl AsRef<Path>,
        extra_files: &[PathBuf],
        pattern: TagPattern,
    ) -> Self {
        let workdir = workdir.into();
        VersionResolver {
            marker: workdir.join(marker),
            extra_files: extra_files.to_vec(),
            workdir,
            pattern,
        }
    }

    /// Tracked files other than the marker, deduplicated, in order
    fn tracked_files(&self, marker: &VersionMarker) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = Vec::new();
        for file in marker.files.iter().chain(self.extra_files.iter()) {
            let path = self.workdir.join(file);
            if path != self.marker && !files.contains(&path) {
                files.push(path);
            }
        }
        files
    }

    /// Compute the next version without writing anything.
    ///
    /// Fails if a tracked file does not contain the current version, since
    /// the real bump could not update it.
    pub fn plan(&self, bump: VersionBump) -> Result<BumpPlan> {
        let marker = VersionMarker::load(&self.marker)?;
        let current = marker.current_version;
        let next = current.bump(bump)?;
        let needle = current.to_string();
        let tokens = token_regex()?;

        let tracked = self.tracked_files(&marker);
        for path in &tracked {
            let content = read_tracked(path)?;
            if !contains_version(&tokens, &content, &needle) {
                return Err(ReleaseError::version(format!(
                    "Did not find current version {} in {}",
                    needle,
                    path.display()
                )));
            }
        }

        let mut files = Vec::with_capacity(tracked.len() + 1);
        files.push(self.marker.clone());
        files.extend(tracked);

        Ok(BumpPlan {
            bump,
            current,
            next,
            tag: self.pattern.format(&next),
            files,
        })
    }

    /// Apply a plan computed by [VersionResolver::plan].
    ///
    /// The version is recomputed from the marker first; if it no longer
    /// matches the plan (the repository changed in between) nothing is
    /// written and a consistency error is returned.
    pub fn apply(&self, plan: &BumpPlan) -> Result<Vec<PathBuf>> {
        let recomputed = self.plan(plan.bump)?;
        if recomputed.current != plan.current || recomputed.next != plan.next {
            return Err(ReleaseError::inconsistent(format!(
                "Dry run computed {} -> {} but the repository now gives {} -> {}",
                plan.current, plan.next, recomputed.current, recomputed.next
            )));
        }

        let marker = VersionMarker::load(&self.marker)?;
        let old = plan.current.to_string();
        let new = plan.next.to_string();
        let tokens = token_regex()?;

        // Render everything before writing so a failure leaves files untouched
        let mut writes = Vec::with_capacity(recomputed.files.len());
        writes.push((self.marker.clone(), marker.render(&plan.next)?));
        for path in recomputed.files.iter().skip(1) {
            let content = read_tracked(path)?;
            writes.push((path.clone(), replace_version(&tokens, &content, &old, &new)));
        }

        for (path, content) in &writes {
            fs::write(path, content)?;
            log::info!("Updated {} to {}", path.display(), new);
        }

        Ok(writes.into_iter().map(|(path, _)| path).collect())
    }

    /// Read the version currently recorded in the marker
    pub fn current_version(&self) -> Result<Version> {
        Ok(VersionMarker::load(&self.marker)?.current_version)
    }
}

fn token_regex() -> Result<Regex> {
    Regex::new(VERSION_TOKEN_PATTERN)
        .map_err(|e| ReleaseError::version(format!("Invalid version pattern: {}", e)))
}

fn contains_version(tokens: &Regex, content: &str, version: &str) -> bool {
    tokens.find_iter(content).any(|m| m.as_str() == version)
}

/// Replace whole-token occurrences of `old`. Pins equal to the current
/// version (`dep==1.2.3`) are rewritten too, as bumpversion does.
fn replace_version(tokens: &Regex, content: &str, old: &str, new: &str) -> String {
    tokens
        .replace_all(content, |caps: &Captures| {
            if &caps[0] == old {
                new.to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn read_tracked(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        ReleaseError::version(format!("Cannot read {}: {}", path.display(), e))
    })
}
