use crate::domain::Version;
use crate::error::{ReleaseError, Result};

/// Tag naming pattern (e.g., "v{version}", "release-{version}")
#[derive(Debug, Clone)]
pub struct TagPattern {
    pub pattern: String,
}

impl TagPattern {
    /// Create a new tag pattern
    pub fn new(pattern: impl Into<String>) -> Self {
        TagPattern {
            pattern: pattern.into(),
        }
    }

    /// Check the pattern has exactly one `{version}` placeholder
    pub fn validate(&self) -> Result<()> {
        match self.pattern.matches("{version}").count() {
            1 => Ok(()),
            0 => Err(ReleaseError::tag(format!(
                "Pattern '{}' must contain a {{version}} placeholder",
                self.pattern
            ))),
            _ => Err(ReleaseError::tag(format!(
                "Pattern '{}' should have exactly one {{version}} placeholder",
                self.pattern
            ))),
        }
    }

    /// Format a version according to pattern
    /// Example: pattern="v{version}", version=1.2.3 -> "v1.2.3"
    pub fn format(&self, version: &Version) -> String {
        self.pattern.replace("{version}", &version.to_string())
    }

    fn regex(&self) -> Result<regex::Regex> {
        self.validate()?;
        let escaped = regex::escape(&self.pattern);
        let regex_pattern = escaped.replace(r"\{version\}", r"(\d+\.\d+\.\d+)");

        regex::Regex::new(&format!("^{}$", regex_pattern))
            .map_err(|e| ReleaseError::tag(format!("Invalid pattern: {}", e)))
    }

    /// Validate if a tag matches this pattern
    pub fn matches(&self, tag: &str) -> Result<bool> {
        Ok(self.regex()?.is_match(tag))
    }

    /// Extract the version from a tag produced by this pattern
    pub fn parse_version(&self, tag: &str) -> Result<Option<Version>> {
        let re = self.regex()?;
        match re.captures(tag).and_then(|c| c.get(1)) {
            Some(m) => Ok(Version::parse(m.as_str()).ok()),
            None => Ok(None),
        }
    }
}

/// Find the newest release tag strictly below `below`.
///
/// Tags that don't follow the pattern are ignored.
pub fn latest_release_tag(
    tags: &[String],
    pattern: &TagPattern,
    below: &Version,
) -> Result<Option<String>> {
    let mut best: Option<(Version, &String)> = None;

    for tag in tags {
        if let Some(version) = pattern.parse_version(tag)? {
            if version >= *below {
                continue;
            }
            if best.as_ref().map_or(true, |(v, _)| version > *v) {
                best = Some((version, tag));
            }
        }
    }

    Ok(best.map(|(_, tag)| tag.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_format() {
        let pattern = TagPattern::new("v{version}");
        assert_eq!(pattern.format(&Version::new(1, 2, 4)), "v1.2.4");
    }

    #[test]
    fn test_pattern_format_with_suffix() {
        let pattern = TagPattern::new("release-{version}");
        assert_eq!(pattern.format(&Version::new(1, 2, 3)), "release-1.2.3");
    }

    #[test]
    fn test_pattern_matches() {
        let pattern = TagPattern::new("v{version}");
        assert!(pattern.matches("v1.2.3").unwrap());
        assert!(!pattern.matches("release-1.2.3").unwrap());
        assert!(!pattern.matches("v1.2.3-rc1").unwrap());
    }

    #[test]
    fn test_pattern_validate() {
        assert!(TagPattern::new("v{version}").validate().is_ok());
        assert!(TagPattern::new("latest").validate().is_err());
        assert!(TagPattern::new("{version}-{version}").validate().is_err());
    }

    #[test]
    fn test_parse_version_from_tag() {
        let pattern = TagPattern::new("v{version}");
        assert_eq!(
            pattern.parse_version("v0.4.10").unwrap(),
            Some(Version::new(0, 4, 10))
        );
        assert_eq!(pattern.parse_version("nightly").unwrap(), None);
    }

    #[test]
    fn test_latest_release_tag_picks_highest_below() {
        let tags = vec![
            "v1.2.3".to_string(),
            "v1.10.0".to_string(),
            "v1.9.9".to_string(),
            "nightly".to_string(),
            "v2.0.0".to_string(),
        ];
        let pattern = TagPattern::new("v{version}");

        let previous = latest_release_tag(&tags, &pattern, &Version::new(2, 0, 0)).unwrap();
        assert_eq!(previous, Some("v1.10.0".to_string()));
    }

    #[test]
    fn test_latest_release_tag_none() {
        let tags = vec!["nightly".to_string()];
        let pattern = TagPattern::new("v{version}");
        assert_eq!(
            latest_release_tag(&tags, &pattern, &Version::new(0, 1, 0)).unwrap(),
            None
        );
    }
}
