//! Gitea provider implementation (API v1)

use crate::error::{Error, Result};
use crate::http::{build_client, fetch_page, normalize_base_url, send_create, send_json};
use crate::traits::{CreateProject, ProjectHost};
use async_trait::async_trait;
use repomirror_core::{Project, Visibility};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Gitea repository as returned by `/api/v1/user/repos`
#[derive(Debug, Clone, Deserialize)]
struct GiteaRepo {
    name: String,
    ssh_url: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    html_url: Option<String>,
    #[serde(default)]
    private: bool,
    #[serde(default)]
    empty: bool,
    #[serde(default)]
    topics: Option<Vec<String>>,
}

impl From<GiteaRepo> for Project {
    fn from(r: GiteaRepo) -> Self {
        Project {
            name: r.name,
            clone_url: r.ssh_url,
            description: r.description.unwrap_or_default(),
            homepage_url: r.html_url.unwrap_or_default(),
            visibility: Visibility::from_private(r.private),
            tags: r.topics.unwrap_or_default().into_iter().collect(),
            empty: r.empty,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GiteaUser {
    login: String,
}

/// Repository hook as returned by `/api/v1/repos/:owner/:repo/hooks`
#[derive(Debug, Deserialize)]
struct GiteaHook {
    #[serde(default)]
    config: GiteaHookConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct GiteaHookConfig {
    #[serde(default)]
    url: String,
    #[serde(default)]
    content_type: String,
}

#[derive(Debug, Serialize)]
struct GiteaCreateHookRequest<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    config: GiteaHookConfig,
    events: &'a [&'a str],
    active: bool,
}

#[derive(Debug, Serialize)]
struct GiteaCreateRequest<'a> {
    name: &'a str,
    description: &'a str,
    private: bool,
    auto_init: bool,
}

/// Gitea repository listing and creation for the token's user
pub struct GiteaHost {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl GiteaHost {
    /// Create a client for the instance at `url`
    pub fn new(url: &str, token: &str) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: normalize_base_url(url),
            token: token.to_string(),
        })
    }

    fn auth_header(&self) -> String {
        format!("token {}", self.token)
    }

    /// Login of the user owning the token
    pub async fn current_user(&self) -> Result<String> {
        let url = format!("{}/api/v1/user", self.base_url);
        let request = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header());
        let user: GiteaUser = send_json(request)
            .await
            .map_err(|message| Error::user_fetch("gitea", message))?;
        Ok(user.login)
    }

    fn hooks_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/api/v1/repos/{}/{}/hooks", self.base_url, owner, repo)
    }

    /// Target URLs of the hooks configured on `owner/repo`
    pub async fn list_hooks(&self, owner: &str, repo: &str) -> Result<Vec<String>> {
        let url = self.hooks_url(owner, repo);
        debug!("Fetching Gitea hooks from: {}", url);

        let request = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header());
        let hooks: Vec<GiteaHook> = send_json(request)
            .await
            .map_err(|message| Error::hook_fetch("gitea", repo, message))?;

        Ok(hooks.into_iter().map(|h| h.config.url).collect())
    }

    /// Add an active push hook delivering JSON to `target`
    pub async fn create_hook(&self, owner: &str, repo: &str, target: &str) -> Result<()> {
        info!("Creating Gitea hook on {}/{}: {}", owner, repo, target);

        let body = GiteaCreateHookRequest {
            kind: "gitea",
            config: GiteaHookConfig {
                url: target.to_string(),
                content_type: "json".to_string(),
            },
            events: &["push"],
            active: true,
        };
        let request = self
            .client
            .post(self.hooks_url(owner, repo))
            .header("Authorization", self.auth_header())
            .json(&body);

        send_json::<serde_json::Value>(request)
            .await
            .map_err(|message| Error::hook_create("gitea", repo, target, message))?;
        Ok(())
    }
}

#[async_trait]
impl ProjectHost for GiteaHost {
    fn name(&self) -> &'static str {
        "gitea"
    }

    async fn list_page(&self, page: u32, page_size: u32) -> Result<Vec<Project>> {
        let url = format!(
            "{}/api/v1/user/repos?page={}&limit={}",
            self.base_url, page, page_size
        );
        debug!("Fetching Gitea repositories from: {}", url);

        let request = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header());
        let repos: Vec<GiteaRepo> = fetch_page(request, self.name(), page).await?;

        Ok(repos.into_iter().map(Project::from).collect())
    }

    async fn create_project(&self, request: &CreateProject) -> Result<Project> {
        info!("Creating Gitea repository: {}", request.name);

        let url = format!("{}/api/v1/user/repos", self.base_url);
        let body = GiteaCreateRequest {
            name: &request.name,
            description: &request.description,
            private: request.private,
            auto_init: false,
        };

        let http = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&body);
        let created: GiteaRepo = send_create(http, self.name(), &request.name).await?;

        Ok(created.into())
    }
}
