//! Hosting provider adapters for repomirror
//!
//! This crate provides the provider abstraction used to enumerate and create
//! repositories on a source or destination host:
//!
//! - GitLab (API v4)
//! - Gitea (API v1)
//! - GitHub (REST v3)
//!
//! A [`Catalog`] is built by paging through a [`ProjectHost`] until it returns
//! an empty page, keeping only the projects admitted by an [`EligibilityFilter`].
//!
//! The [`hooks`] module migrates project webhooks from GitLab to Gitea.

pub mod catalog;
pub mod error;
pub mod gitea;
pub mod github;
pub mod gitlab;
pub mod hooks;
mod http;
pub mod traits;

pub use catalog::{list_owned_projects, Catalog, EligibilityFilter};
pub use error::{Error, Result};
pub use hooks::{export_gitlab_hooks, import_gitea_hooks, HookMap, HookOutcome, HookStatus};
pub use traits::{CreateProject, ProjectHost};

use repomirror_core::MirrorConfig;
use std::sync::Arc;

/// Supported hosting providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    GitLab,
    Gitea,
    GitHub,
}

impl ProviderKind {
    /// Name used for logging and as the destination remote name
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::GitLab => "gitlab",
            ProviderKind::Gitea => "gitea",
            ProviderKind::GitHub => "github",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gitlab" => Ok(Self::GitLab),
            "gitea" => Ok(Self::Gitea),
            "github" => Ok(Self::GitHub),
            other => Err(Error::unsupported_provider(other)),
        }
    }
}

/// Create a provider client from the matching credential section
pub fn create_host(kind: ProviderKind, config: &MirrorConfig) -> Result<Arc<dyn ProjectHost>> {
    match kind {
        ProviderKind::GitLab => {
            let creds = config.gitlab()?;
            Ok(Arc::new(gitlab::GitLabHost::new(&creds.url, &creds.token)?))
        }
        ProviderKind::Gitea => {
            let creds = config.gitea()?;
            Ok(Arc::new(gitea::GiteaHost::new(&creds.url, &creds.token)?))
        }
        ProviderKind::GitHub => {
            let creds = config.github()?;
            Ok(Arc::new(github::GitHubHost::new(
                &creds.url,
                &creds.username,
                &creds.password,
            )?))
        }
    }
}
