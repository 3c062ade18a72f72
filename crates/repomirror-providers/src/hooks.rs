//! Webhook migration: export GitLab project hooks to a JSON file, then
//! recreate them on the Gitea repositories of the same name.
//!
//! The file maps project names to hook URLs, sorted by name:
//!
//! ```json
//! {
//!   "site": ["https://ci.example.com/hook"]
//! }
//! ```

use crate::error::Result;
use crate::gitea::GiteaHost;
use crate::gitlab::GitLabHost;
use crate::traits::ProjectHost;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Hook URLs per project name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HookMap(BTreeMap<String, Vec<String>>);

impl HookMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the hooks of `project`. Projects without hooks are not kept.
    pub fn insert(&mut self, project: impl Into<String>, urls: Vec<String>) {
        if !urls.is_empty() {
            self.0.insert(project.into(), urls);
        }
    }

    pub fn get(&self, project: &str) -> Option<&[String]> {
        self.0.get(project).map(Vec::as_slice)
    }

    pub fn contains(&self, project: &str) -> bool {
        self.0.contains_key(project)
    }

    /// Number of projects with hooks
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of hooks across all projects
    pub fn hook_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Collect the hooks of every owned GitLab project.
///
/// Any failed request aborts the export so a partial file is never written.
pub async fn export_gitlab_hooks(host: &GitLabHost, page_size: u32) -> Result<HookMap> {
    let mut hooks = HookMap::new();
    let mut page = host.first_page();
    let mut projects_seen = 0usize;

    loop {
        let projects = host.list_project_refs(page, page_size).await?;
        if projects.is_empty() {
            break;
        }
        projects_seen += projects.len();

        for project in &projects {
            if hooks.contains(&project.name) {
                debug!("Ignoring duplicate gitlab project: {}", project.name);
                continue;
            }
            let urls = host.list_hooks(project).await?;
            debug!("{}: {} hooks", project.name, urls.len());
            hooks.insert(project.name.clone(), urls);
        }

        page += 1;
    }

    info!(
        "{} hooks on {} of {} gitlab projects",
        hooks.hook_count(),
        hooks.len(),
        projects_seen
    );
    Ok(hooks)
}

/// What happened to one hook during import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStatus {
    Created,
    AlreadyPresent,
}

/// Result of importing one hook
#[derive(Debug)]
pub struct HookOutcome {
    pub project: String,
    pub url: String,
    pub result: Result<HookStatus>,
}

/// Create every hook in `hooks` on `owner`'s Gitea repositories.
///
/// Hooks whose URL is already configured on the repository are skipped.
/// A failed hook does not stop the others.
pub async fn import_gitea_hooks(
    host: &GiteaHost,
    owner: &str,
    hooks: &HookMap,
) -> Vec<HookOutcome> {
    let mut outcomes = Vec::with_capacity(hooks.hook_count());

    for (project, urls) in hooks.iter() {
        let mut existing = match host.list_hooks(owner, project).await {
            Ok(existing) => existing,
            Err(e) => {
                warn!("{}", e);
                Vec::new()
            }
        };

        for url in urls {
            let result = if existing.contains(url) {
                debug!("{}: hook already present: {}", project, url);
                Ok(HookStatus::AlreadyPresent)
            } else {
                host.create_hook(owner, project, url).await.map(|_| {
                    existing.push(url.clone());
                    HookStatus::Created
                })
            };
            outcomes.push(HookOutcome {
                project: project.to_string(),
                url: url.clone(),
                result,
            });
        }
    }

    outcomes
}
