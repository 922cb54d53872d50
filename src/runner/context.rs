use crate::domain::{Version, VersionBump};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// What the pipeline knows so far, exposed to every external command
#[derive(Debug, Clone)]
pub struct StepContext {
    pub bump: VersionBump,
    pub dry_run: bool,
    pub current_version: Option<Version>,
    pub version: Option<Version>,
    pub tag: Option<String>,
    pub previous_tag: Option<String>,
    pub notes_path: Option<PathBuf>,
}

impl StepContext {
    pub fn new(bump: VersionBump, dry_run: bool) -> Self {
        StepContext {
            bump,
            dry_run,
            current_version: None,
            version: None,
            tag: None,
            previous_tag: None,
            notes_path: None,
        }
    }

    /// Convert context to environment variables for step commands
    ///
    /// `VERSION_NAME` and `version_number` keep the names release workflows
    /// already read; the rest are `RELEASE_*`.
    pub fn to_env_vars(&self) -> BTreeMap<String, String> {
        let mut env = BTreeMap::new();

        env.insert("VERSION_NAME".to_string(), self.bump.to_string());
        env.insert("RELEASE_DRY_RUN".to_string(), self.dry_run.to_string());

        if let Some(version) = self.version {
            env.insert("version_number".to_string(), version.to_string());
        }
        if let Some(ref tag) = self.tag {
            env.insert("RELEASE_TAG".to_string(), tag.clone());
        }
        if let Some(ref previous) = self.previous_tag {
            env.insert("RELEASE_PREVIOUS_TAG".to_string(), previous.clone());
        }
        if let Some(ref path) = self.notes_path {
            env.insert(
                "RELEASE_NOTES_PATH".to_string(),
                path.display().to_string(),
            );
        }

        env
    }

    /// Expand `{placeholder}` references in a command argument.
    /// Unknown values expand to an empty string.
    pub fn expand(&self, arg: &str) -> String {
        let show = |v: Option<Version>| v.map(|v| v.to_string()).unwrap_or_default();

        arg.replace("{version}", &show(self.version))
            .replace("{current_version}", &show(self.current_version))
            .replace("{tag}", self.tag.as_deref().unwrap_or(""))
            .replace("{previous_tag}", self.previous_tag.as_deref().unwrap_or(""))
            .replace(
                "{notes_path}",
                &self
                    .notes_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            )
            .replace("{bump}", self.bump.as_str())
    }
}
