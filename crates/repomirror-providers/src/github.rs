//! GitHub provider implementation (REST v3)

use crate::error::Result;
use crate::http::{build_client, fetch_page, normalize_base_url, send_create};
use crate::traits::{CreateProject, ProjectHost};
use async_trait::async_trait;
use repomirror_core::{Project, Visibility};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// GitHub repository as returned by `/user/repos`
#[derive(Debug, Clone, Deserialize)]
struct GitHubRepo {
    name: String,
    ssh_url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    topics: Vec<String>,
    /// Size in KB; zero for a repository without commits
    #[serde(default)]
    size: u64,
}

impl From<GitHubRepo> for Project {
    fn from(r: GitHubRepo) -> Self {
        Project {
            name: r.name,
            clone_url: r.ssh_url,
            description: r.description.unwrap_or_default(),
            homepage_url: r.html_url.unwrap_or_default(),
            visibility: Visibility::from_private(r.private),
            tags: r.topics.into_iter().collect(),
            empty: r.size == 0,
        }
    }
}

#[derive(Debug, Serialize)]
struct GitHubCreateRequest<'a> {
    name: &'a str,
    description: &'a str,
    homepage: &'a str,
    private: bool,
}

/// GitHub repository listing and creation for the authenticated user
pub struct GitHubHost {
    client: reqwest::Client,
    api_url: String,
    username: String,
    password: String,
}

impl GitHubHost {
    /// Create a client against `api_url` (usually `https://api.github.com`)
    pub fn new(api_url: &str, username: &str, password: &str) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            api_url: normalize_base_url(api_url),
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

#[async_trait]
impl ProjectHost for GitHubHost {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn list_page(&self, page: u32, page_size: u32) -> Result<Vec<Project>> {
        let url = format!(
            "{}/user/repos?affiliation=owner&per_page={}&page={}",
            self.api_url, page_size, page
        );
        debug!("Fetching GitHub repositories from: {}", url);

        let request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .basic_auth(&self.username, Some(&self.password));
        let repos: Vec<GitHubRepo> = fetch_page(request, self.name(), page).await?;

        Ok(repos.into_iter().map(Project::from).collect())
    }

    async fn create_project(&self, request: &CreateProject) -> Result<Project> {
        info!("Creating GitHub repository: {}", request.name);

        let url = format!("{}/user/repos", self.api_url);
        let body = GitHubCreateRequest {
            name: &request.name,
            description: &request.description,
            homepage: &request.homepage,
            private: request.private,
        };

        let http = self
            .client
            .post(&url)
            .header("Accept", "application/vnd.github+json")
            .basic_auth(&self.username, Some(&self.password))
            .json(&body);
        let created: GitHubRepo = send_create(http, self.name(), &request.name).await?;

        Ok(created.into())
    }
}
