//! GitLab provider implementation (API v4)

use crate::error::{Error, Result};
use crate::http::{build_client, fetch_page, normalize_base_url, send_create, send_json};
use crate::traits::{CreateProject, ProjectHost};
use async_trait::async_trait;
use repomirror_core::{Project, Visibility};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// GitLab project as returned by `/api/v4/projects`
#[derive(Debug, Clone, Deserialize)]
struct GitLabProject {
    #[serde(default)]
    id: u64,
    name: String,
    ssh_url_to_repo: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    web_url: Option<String>,
    /// "public", "internal" or "private"
    visibility: String,
    #[serde(default)]
    topics: Option<Vec<String>>,
    /// Deprecated since 14.0 but still sent next to `topics`; the only tag field on older instances
    #[serde(default)]
    tag_list: Option<Vec<String>>,
    #[serde(default)]
    empty_repo: bool,
}

impl From<GitLabProject> for Project {
    fn from(p: GitLabProject) -> Self {
        Project {
            name: p.name,
            clone_url: p.ssh_url_to_repo,
            description: p.description.unwrap_or_default(),
            homepage_url: p.web_url.unwrap_or_default(),
            // Internal projects are only visible to instance users
            visibility: Visibility::from_private(p.visibility != "public"),
            tags: p
                .topics
                .into_iter()
                .chain(p.tag_list)
                .flatten()
                .collect(),
            empty: p.empty_repo,
        }
    }
}

/// Project hook as returned by `/api/v4/projects/:id/hooks`
#[derive(Debug, Deserialize)]
struct GitLabHook {
    url: String,
}

/// A project's numeric id next to its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Serialize)]
struct GitLabCreateRequest<'a> {
    name: &'a str,
    description: &'a str,
    visibility: &'a str,
}

/// GitLab project listing and creation
pub struct GitLabHost {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl GitLabHost {
    /// Create a client for the instance at `url`
    pub fn new(url: &str, token: &str) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: normalize_base_url(url),
            token: token.to_string(),
        })
    }

    async fn fetch_projects(&self, page: u32, page_size: u32) -> Result<Vec<GitLabProject>> {
        let url = format!(
            "{}/api/v4/projects?owned=true&per_page={}&page={}",
            self.base_url, page_size, page
        );
        debug!("Fetching GitLab projects from: {}", url);

        let request = self.client.get(&url).header("PRIVATE-TOKEN", &self.token);
        fetch_page(request, "gitlab", page).await
    }

    /// One page of owned projects as id and name. An empty page marks the end.
    pub async fn list_project_refs(&self, page: u32, page_size: u32) -> Result<Vec<ProjectRef>> {
        let projects = self.fetch_projects(page, page_size).await?;
        Ok(projects
            .into_iter()
            .map(|p| ProjectRef { id: p.id, name: p.name })
            .collect())
    }

    /// Webhook URLs configured on a project
    pub async fn list_hooks(&self, project: &ProjectRef) -> Result<Vec<String>> {
        let url = format!("{}/api/v4/projects/{}/hooks", self.base_url, project.id);
        debug!("Fetching GitLab hooks from: {}", url);

        let request = self.client.get(&url).header("PRIVATE-TOKEN", &self.token);
        let hooks: Vec<GitLabHook> = send_json(request)
            .await
            .map_err(|message| Error::hook_fetch("gitlab", &project.name, message))?;

        Ok(hooks.into_iter().map(|h| h.url).collect())
    }
}

#[async_trait]
impl ProjectHost for GitLabHost {
    fn name(&self) -> &'static str {
        "gitlab"
    }

    async fn list_page(&self, page: u32, page_size: u32) -> Result<Vec<Project>> {
        let projects = self.fetch_projects(page, page_size).await?;
        Ok(projects.into_iter().map(Project::from).collect())
    }

    async fn create_project(&self, request: &CreateProject) -> Result<Project> {
        info!("Creating GitLab project: {}", request.name);

        let url = format!("{}/api/v4/projects", self.base_url);
        let body = GitLabCreateRequest {
            name: &request.name,
            description: &request.description,
            visibility: if request.private { "private" } else { "public" },
        };

        let http = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .json(&body);
        let created: GitLabProject = send_create(http, self.name(), &request.name).await?;

        Ok(created.into())
    }
}
