use crate::error::{ReleaseError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Semantic version representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    /// Create a new version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
        }
    }

    /// Parse a plain `X.Y.Z` version, optionally prefixed with 'v' or 'V'.
    ///
    /// Pre-release and build metadata are rejected: releases are always plain
    /// three-component versions.
    pub fn parse(text: &str) -> Result<Self> {
        let clean = text
            .trim()
            .trim_start_matches('v')
            .trim_start_matches('V');

        let parsed = semver::Version::parse(clean).map_err(|e| {
            ReleaseError::version(format!(
                "Invalid version format: '{}' - expected X.Y.Z ({})",
                text, e
            ))
        })?;

        if !parsed.pre.is_empty() || !parsed.build.is_empty() {
            return Err(ReleaseError::version(format!(
                "Pre-release or build metadata is not supported: '{}'",
                text
            )));
        }

        Ok(Version::new(parsed.major, parsed.minor, parsed.patch))
    }

    /// Bump version according to bump type, resetting lower components.
    pub fn bump(&self, bump: VersionBump) -> Result<Self> {
        let overflow = || ReleaseError::version(format!("Cannot {} bump {}: overflow", bump, self));

        let next = match bump {
            VersionBump::Major => Version {
                major: self.major.checked_add(1).ok_or_else(overflow)?,
                minor: 0,
                patch: 0,
            },
            VersionBump::Minor => Version {
                major: self.major,
                minor: self.minor.checked_add(1).ok_or_else(overflow)?,
                patch: 0,
            },
            VersionBump::Patch => Version {
                major: self.major,
                minor: self.minor,
                patch: self.patch.checked_add(1).ok_or_else(overflow)?,
            },
        };

        Ok(next)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Which version component a release increments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VersionBump {
    Major,
    Minor,
    #[default]
    Patch,
}

impl VersionBump {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
        }
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionBump {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "major" => Ok(VersionBump::Major),
            "minor" => Ok(VersionBump::Minor),
            "patch" => Ok(VersionBump::Patch),
            other => Err(ReleaseError::input(format!(
                "Unknown bump kind '{}': expected one of major, minor, patch",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = Version::parse("v1.2.3").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
    }

    #[test]
    fn test_version_parse_without_v() {
        assert_eq!(Version::parse("1.2.3").unwrap(), Version::new(1, 2, 3));
        assert_eq!(Version::parse("V0.1.0").unwrap(), Version::new(0, 1, 0));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("v1.2.3.4").is_err());
        assert!(Version::parse("one.two.three").is_err());
    }

    #[test]
    fn test_version_parse_rejects_prerelease() {
        assert!(Version::parse("1.2.3-rc.1").is_err());
        assert!(Version::parse("1.2.3+build5").is_err());
    }

    #[test]
    fn test_version_bump_major_resets_lower() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(VersionBump::Major).unwrap(), Version::new(2, 0, 0));
    }

    #[test]
    fn test_version_bump_minor() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(VersionBump::Minor).unwrap(), Version::new(1, 3, 0));
    }

    #[test]
    fn test_version_bump_patch() {
        let v = Version::new(1, 2, 3);
        assert_eq!(v.bump(VersionBump::Patch).unwrap(), Version::new(1, 2, 4));
    }

    #[test]
    fn test_bump_is_strictly_greater() {
        let versions = [
            Version::new(0, 0, 0),
            Version::new(0, 9, 9),
            Version::new(1, 2, 3),
            Version::new(9, 0, 42),
        ];
        for v in versions {
            for bump in [VersionBump::Major, VersionBump::Minor, VersionBump::Patch] {
                assert!(v.bump(bump).unwrap() > v, "{} {} not greater", v, bump);
            }
        }
    }

    #[test]
    fn test_bump_overflow_is_error() {
        let v = Version::new(u64::MAX, 0, 0);
        assert!(v.bump(VersionBump::Major).is_err());
        assert!(v.bump(VersionBump::Minor).is_ok());
    }

    #[test]
    fn test_version_ordering_is_by_component() {
        assert!(Version::new(1, 10, 0) > Version::new(1, 9, 99));
        assert!(Version::new(2, 0, 0) > Version::new(1, 99, 99));
    }

    #[test]
    fn test_version_display() {
        assert_eq!(Version::new(1, 2, 3).to_string(), "1.2.3");
    }

    #[test]
    fn test_bump_from_str() {
        assert_eq!("major".parse::<VersionBump>().unwrap(), VersionBump::Major);
        assert_eq!("patch".parse::<VersionBump>().unwrap(), VersionBump::Patch);
        let err = "huge".parse::<VersionBump>().unwrap_err();
        assert!(matches!(err, ReleaseError::Input(_)));
    }

    #[test]
    fn test_bump_default_is_patch() {
        assert_eq!(VersionBump::default(), VersionBump::Patch);
    }
}
