//! Credential file loading and run settings

use crate::error::{Error, Result};
use crate::types::PushPolicy;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::debug;

/// Default credential file name, looked up in the current directory
pub const DEFAULT_CREDENTIALS_FILE: &str = "creds.json";

/// GitLab API access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitLabCredentials {
    /// Instance base URL (e.g., "https://gitlab.example.com")
    pub url: String,

    /// Personal access token
    pub token: String,
}

/// Gitea API access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiteaCredentials {
    /// Instance base URL
    pub url: String,

    /// Access token
    pub token: String,
}

/// GitHub API access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCredentials {
    pub username: String,

    /// Password or personal access token
    pub password: String,

    /// API base URL, overridable for GitHub Enterprise
    #[serde(default = "default_github_url")]
    pub url: String,
}

fn default_github_url() -> String {
    "https://api.github.com".to_string()
}

/// Run settings, all optional in the credential file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Local working root; one sub-directory per project
    #[serde(default = "default_work_dir")]
    pub work_dir: Utf8PathBuf,

    /// Maximum simultaneous per-project operations
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Page size used when listing provider projects
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Branch fetched from the source and pushed to the destination
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Name of the remote a fresh clone points at
    #[serde(default = "default_source_remote")]
    pub source_remote: String,

    /// Tag a public project must carry to be mirrored in publish mode
    #[serde(default = "default_mirror_tag")]
    pub mirror_tag: String,

    #[serde(default)]
    pub push_policy: PushPolicy,

    /// Directory in which the SSH agent creates its socket.
    /// `None` lets ssh-agent pick a private temporary directory.
    #[serde(default)]
    pub agent_socket_dir: Option<Utf8PathBuf>,
}

fn default_work_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("tmp")
}

fn default_concurrency() -> usize {
    8
}

fn default_page_size() -> u32 {
    10
}

fn default_branch() -> String {
    "master".to_string()
}

fn default_source_remote() -> String {
    "origin".to_string()
}

fn default_mirror_tag() -> String {
    "githubmirror".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            concurrency: default_concurrency(),
            page_size: default_page_size(),
            branch: default_branch(),
            source_remote: default_source_remote(),
            mirror_tag: default_mirror_tag(),
            push_policy: PushPolicy::default(),
            agent_socket_dir: None,
        }
    }
}

/// Parsed credential file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub gitlab: Option<GitLabCredentials>,

    #[serde(default)]
    pub gitea: Option<GiteaCredentials>,

    #[serde(default)]
    pub github: Option<GitHubCredentials>,

    /// Path to the SSH private key loaded into the agent
    #[serde(default)]
    pub identity: Option<Utf8PathBuf>,

    #[serde(default)]
    pub settings: Settings,
}

/// Loaded credential file together with its location
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    pub credentials: Credentials,

    /// Path the credentials were read from
    pub path: Utf8PathBuf,
}

impl MirrorConfig {
    /// Load the credential file at `path`, or `creds.json` in the current directory
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let path = path
            .map(Utf8Path::to_owned)
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_CREDENTIALS_FILE));

        let content = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config_not_found(path.as_str())
            } else {
                Error::Io(e)
            }
        })?;

        let credentials = Self::parse(&path, &content)?;
        credentials.validate()?;

        debug!("Loaded credentials from {}", path);
        Ok(Self { credentials, path })
    }

    fn parse(path: &Utf8Path, content: &str) -> Result<Credentials> {
        match path.extension() {
            Some("json") => Ok(serde_json::from_str(content)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml_ng::from_str(content)?),
            _ => Err(Error::unsupported_format(path.as_str())),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.credentials.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.credentials.settings
    }

    pub fn gitlab(&self) -> Result<&GitLabCredentials> {
        self.credentials
            .gitlab
            .as_ref()
            .ok_or_else(|| Error::missing_field("gitlab"))
    }

    pub fn gitea(&self) -> Result<&GiteaCredentials> {
        self.credentials
            .gitea
            .as_ref()
            .ok_or_else(|| Error::missing_field("gitea"))
    }

    pub fn github(&self) -> Result<&GitHubCredentials> {
        self.credentials
            .github
            .as_ref()
            .ok_or_else(|| Error::missing_field("github"))
    }

    /// SSH identity required by every command that talks to a git remote
    pub fn identity(&self) -> Result<&Utf8Path> {
        self.credentials
            .identity
            .as_deref()
            .ok_or_else(|| Error::missing_field("identity"))
    }
}

impl Credentials {
    /// Reject values that would only fail later, after network activity
    fn validate(&self) -> Result<()> {
        if let Some(gitlab) = &self.gitlab {
            require_url("gitlab.url", &gitlab.url)?;
            require_non_empty("gitlab.token", &gitlab.token)?;
        }
        if let Some(gitea) = &self.gitea {
            require_url("gitea.url", &gitea.url)?;
            require_non_empty("gitea.token", &gitea.token)?;
        }
        if let Some(github) = &self.github {
            require_non_empty("github.username", &github.username)?;
            require_non_empty("github.password", &github.password)?;
            require_url("github.url", &github.url)?;
        }
        if let Some(identity) = &self.identity {
            require_non_empty("identity", identity.as_str())?;
        }

        let settings = &self.settings;
        if settings.concurrency == 0 {
            return Err(Error::invalid_config("settings.concurrency must be at least 1"));
        }
        if settings.page_size == 0 {
            return Err(Error::invalid_config("settings.page_size must be at least 1"));
        }
        require_non_empty("settings.branch", &settings.branch)?;
        require_non_empty("settings.source_remote", &settings.source_remote)?;

        Ok(())
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::missing_field(field));
    }
    Ok(())
}

/// Provider base URLs must be absolute http(s) URLs
fn require_url(field: &str, value: &str) -> Result<()> {
    require_non_empty(field, value)?;
    let parsed = url::Url::parse(value)
        .map_err(|e| Error::invalid_config(format!("{} is not a valid URL: {}", field, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::invalid_config(format!(
            "{} must use http or https, not {}",
            field, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_json_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "creds.json",
            r#"{
                "gitlab": {"url": "https://gitlab.example.com", "token": "glpat"},
                "github": {"username": "dave", "password": "ghp"},
                "identity": "/home/dave/.ssh/id_mirror"
            }"#,
        );

        let config = MirrorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.gitlab().unwrap().token, "glpat");
        assert_eq!(config.github().unwrap().url, "https://api.github.com");
        assert_eq!(config.identity().unwrap(), "/home/dave/.ssh/id_mirror");
        assert!(config.gitea().is_err());

        let settings = config.settings();
        assert_eq!(settings.work_dir, "tmp");
        assert_eq!(settings.concurrency, 8);
        assert_eq!(settings.page_size, 10);
        assert_eq!(settings.branch, "master");
        assert_eq!(settings.mirror_tag, "githubmirror");
        assert_eq!(settings.push_policy, PushPolicy::Force);
    }

    #[test]
    fn test_load_yaml_settings() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "creds.yaml",
            "gitea:\n  url: https://gitea.example.com\n  token: abc\nsettings:\n  concurrency: 2\n  branch: main\n  push_policy: fast-forward\n",
        );

        let config = MirrorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.gitea().unwrap().url, "https://gitea.example.com");
        assert_eq!(config.settings().concurrency, 2);
        assert_eq!(config.settings().branch, "main");
        assert_eq!(config.settings().push_policy, PushPolicy::FastForward);
        assert!(matches!(
            config.identity(),
            Err(Error::MissingField { field }) if field == "identity"
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("nope.json")).unwrap();
        let err = MirrorConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "creds.toml", "x = 1");
        let err = MirrorConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_empty_token_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "creds.json",
            r#"{"gitlab": {"url": "https://gitlab.example.com", "token": "  "}}"#,
        );
        let err = MirrorConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::MissingField { field } if field == "gitlab.token"));
    }

    #[test]
    fn test_invalid_provider_url_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "creds.json",
            r#"{"gitea": {"url": "gitea.example.com", "token": "abc"}}"#,
        );
        let err = MirrorConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { message } if message.contains("gitea.url")));

        let path = write(
            &dir,
            "ssh.json",
            r#"{"gitlab": {"url": "ssh://gitlab.example.com", "token": "abc"}}"#,
        );
        let err = MirrorConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "creds.json", r#"{"settings": {"concurrency": 0}}"#);
        let err = MirrorConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }
}
