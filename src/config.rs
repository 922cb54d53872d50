use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::TagPattern;
use crate::error::{ReleaseError, Result};

/// File name looked up in the working directory and the user config directory.
pub const CONFIG_FILE_NAME: &str = "pyrelease.toml";

/// Represents the complete configuration for pyrelease.
///
/// Every section has defaults matching a typical Python project released
/// from GitHub Actions, so an empty file (or no file) is a valid config.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub version: VersionConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub commands: CommandsConfig,

    #[serde(default)]
    pub notes: NotesConfig,

    #[serde(default)]
    pub publish: PublishConfig,

    #[serde(default)]
    pub github: GitHubConfig,
}

fn default_marker() -> PathBuf {
    PathBuf::from(".bumpversion.cfg")
}

fn default_tag_pattern() -> String {
    "v{version}".to_string()
}

fn default_bump_message() -> String {
    "Bump version: {current_version} → {new_version}".to_string()
}

/// Where the current version lives and how a bump is recorded.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct VersionConfig {
    /// bumpversion-style marker holding `current_version`
    #[serde(default = "default_marker")]
    pub marker: PathBuf,

    /// Files to rewrite in addition to the marker's `[bumpversion:file:...]` sections
    #[serde(default)]
    pub files: Vec<PathBuf>,

    #[serde(default = "default_tag_pattern")]
    pub tag_pattern: String,

    #[serde(default = "default_bump_message")]
    pub commit_message: String,

    #[serde(default)]
    pub allow_dirty: bool,
}

impl Default for VersionConfig {
    fn default() -> Self {
        VersionConfig {
            marker: default_marker(),
            files: Vec::new(),
            tag_pattern: default_tag_pattern(),
            commit_message: default_bump_message(),
            allow_dirty: false,
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_true() -> bool {
    true
}

/// Remote and authorship settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_true")]
    pub fetch_tags: bool,

    /// Overrides `user.name` for release commits (CI runners often have none)
    #[serde(default)]
    pub author_name: Option<String>,

    #[serde(default)]
    pub author_email: Option<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote: default_remote(),
            fetch_tags: true,
            author_name: None,
            author_email: None,
        }
    }
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn default_install() -> Vec<String> {
    argv(&["pip", "install", "-e", "."])
}

fn default_notes_command() -> Vec<String> {
    argv(&["llamabot", "git", "write-release-notes"])
}

fn default_lint() -> Option<Vec<String>> {
    Some(argv(&["pre-commit", "run", "--all-files"]))
}

fn default_build() -> Vec<String> {
    argv(&["python", "-m", "build"])
}

fn default_publish_command() -> Vec<String> {
    argv(&["twine", "upload"])
}

/// External commands, each as an argv list. Arguments may use the
/// placeholders `{version}`, `{current_version}`, `{tag}`, `{previous_tag}`,
/// `{notes_path}` and `{bump}`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CommandsConfig {
    #[serde(default = "default_install")]
    pub install: Vec<String>,

    #[serde(default = "default_notes_command")]
    pub notes: Vec<String>,

    /// Formatting pass run before committing notes; `[]` disables it
    #[serde(default = "default_lint")]
    pub lint: Option<Vec<String>>,

    #[serde(default = "default_build")]
    pub build: Vec<String>,

    /// Upload command; the built artifacts are appended as arguments
    #[serde(default = "default_publish_command")]
    pub publish: Vec<String>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        CommandsConfig {
            install: default_install(),
            notes: default_notes_command(),
            lint: default_lint(),
            build: default_build(),
            publish: default_publish_command(),
        }
    }
}

impl CommandsConfig {
    /// The lint command, unless it is unset or empty
    pub fn lint_command(&self) -> Option<&Vec<String>> {
        self.lint.as_ref().filter(|argv| !argv.is_empty())
    }
}

fn default_notes_dir() -> PathBuf {
    PathBuf::from("docs/releases")
}

fn default_notes_message() -> String {
    "Add release notes for {tag}".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotesConfig {
    #[serde(default = "default_notes_dir")]
    pub dir: PathBuf,

    #[serde(default = "default_notes_message")]
    pub commit_message: String,
}

impl Default for NotesConfig {
    fn default() -> Self {
        NotesConfig {
            dir: default_notes_dir(),
            commit_message: default_notes_message(),
        }
    }
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_pypi_token_env() -> String {
    "PYPI_API_TOKEN".to_string()
}

fn default_username() -> String {
    "__token__".to_string()
}

fn default_username_env() -> String {
    "TWINE_USERNAME".to_string()
}

fn default_password_env() -> String {
    "TWINE_PASSWORD".to_string()
}

/// Package index upload settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PublishConfig {
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,

    /// Environment variable holding the index token
    #[serde(default = "default_pypi_token_env")]
    pub token_env: String,

    #[serde(default = "default_username")]
    pub username: String,

    /// Variables the upload command reads its credentials from
    #[serde(default = "default_username_env")]
    pub username_env: String,

    #[serde(default = "default_password_env")]
    pub password_env: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            dist_dir: default_dist_dir(),
            token_env: default_pypi_token_env(),
            username: default_username(),
            username_env: default_username_env(),
            password_env: default_password_env(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitHubConfig {
    /// `owner/name`; falls back to `GITHUB_REPOSITORY`, then the remote URL
    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_github_token_env")]
    pub token_env: String,

    #[serde(default)]
    pub draft: bool,

    #[serde(default)]
    pub prerelease: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            repository: None,
            api_url: default_api_url(),
            token_env: default_github_token_env(),
            draft: false,
            prerelease: false,
        }
    }
}

impl Config {
    pub fn tag_pattern(&self) -> TagPattern {
        TagPattern::new(self.version.tag_pattern.clone())
    }

    /// Reject configurations that would fail halfway through a release.
    pub fn validate(&self) -> Result<()> {
        self.tag_pattern().validate()?;

        let commands = [
            ("install", Some(&self.commands.install)),
            ("notes", Some(&self.commands.notes)),
            ("lint", self.commands.lint_command()),
            ("build", Some(&self.commands.build)),
            ("publish", Some(&self.commands.publish)),
        ];
        for (name, command) in commands {
            if let Some(argv) = command {
                if argv.first().map_or(true, |p| p.trim().is_empty()) {
                    return Err(ReleaseError::config(format!(
                        "commands.{} must name a program",
                        name
                    )));
                }
            }
        }

        if self.git.remote.trim().is_empty() {
            return Err(ReleaseError::config("git.remote must not be empty"));
        }

        if self.git.author_name.is_some() != self.git.author_email.is_some() {
            return Err(ReleaseError::config(
                "git.author_name and git.author_email must be set together",
            ));
        }

        Ok(())
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `pyrelease.toml` in `workdir`
/// 3. `pyrelease.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration, validated
/// * `Err` - If a file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&Path>, workdir: &Path) -> Result<Config> {
    let local = workdir.join(CONFIG_FILE_NAME);

    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path).map_err(|e| {
            ReleaseError::config(format!("Cannot read {}: {}", path.display(), e))
        })?
    } else if local.exists() {
        fs::read_to_string(&local)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let user_path = config_dir.join(CONFIG_FILE_NAME);
        if user_path.exists() {
            fs::read_to_string(user_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    config.validate()?;
    log::debug!("Loaded configuration: {:?}", config);
    Ok(config)
}
