use crate::domain::Version;
use crate::error::{ReleaseError, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

const CURRENT_VERSION_PATTERN: &str = r"(?m)^([ \t]*current_version[ \t]*=[ \t]*)([^\s#;]+)";
const FILE_SECTION_PATTERN: &str = r"(?m)^[ \t]*\[bumpversion:file:([^\]]+)\]";

/// A bumpversion-style marker file:
///
/// ```text
/// [bumpversion]
/// current_version = 1.2.3
///
/// [bumpversion:file:pyproject.toml]
/// ```
#[derive(Debug, Clone)]
pub struct VersionMarker {
    pub path: PathBuf,
    pub current_version: Version,
    /// Files listed in `[bumpversion:file:...]` sections, as written
    pub files: Vec<PathBuf>,
    content: String,
}

impl VersionMarker {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ReleaseError::version(format!(
                "Cannot read version marker {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(path, content)
    }

    pub fn parse(path: &Path, content: String) -> Result<Self> {
        let current_re = version_regex()?;
        let captures = current_re.captures(&content).ok_or_else(|| {
            ReleaseError::version(format!(
                "No current_version found in {}",
                path.display()
            ))
        })?;

        let raw = captures.get(2).map_or("", |m| m.as_str());
        let current_version = Version::parse(raw)?;

        let file_re = Regex::new(FILE_SECTION_PATTERN)
            .map_err(|e| ReleaseError::version(format!("Invalid marker pattern: {}", e)))?;
        let files = file_re
            .captures_iter(&content)
            .filter_map(|c| c.get(1))
            .map(|m| PathBuf::from(m.as_str().trim()))
            .collect();

        Ok(VersionMarker {
            path: path.to_path_buf(),
            current_version,
            files,
            content,
        })
    }

    /// Marker content with `current_version` replaced. Other lines are kept
    /// byte for byte.
    pub fn render(&self, new_version: &Version) -> Result<String> {
        let replacement = format!("${{1}}{}", new_version);
        Ok(version_regex()?
            .replacen(&self.content, 1, replacement.as_str())
            .into_owned())
    }
}

fn version_regex() -> Result<Regex> {
    Regex::new(CURRENT_VERSION_PATTERN)
        .map_err(|e| ReleaseError::version(format!("Invalid marker pattern: {}", e)))
}
