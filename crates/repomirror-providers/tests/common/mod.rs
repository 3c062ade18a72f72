//! Common test helpers for repomirror-providers integration tests
//!
//! - JSON fixtures shaped like each provider's listing endpoint
//! - An in-memory paged `ProjectHost` for pagination behavior

#![allow(dead_code)]

use async_trait::async_trait;
use repomirror_core::{Project, Visibility};
use repomirror_providers::{CreateProject, Error, ProjectHost, Result};
use serde_json::{json, Value};
use std::sync::Mutex;

/// GitLab `/projects` record as sent by 14.0 and later, with both `topics`
/// and the deprecated `tag_list`
pub fn gitlab_project(name: &str, visibility: &str, topics: &[&str]) -> Value {
    json!({
        "id": gitlab_id(name),
        "name": name,
        "ssh_url_to_repo": format!("git@gitlab.example.com:dave/{}.git", name),
        "description": format!("{} description", name),
        "web_url": format!("https://gitlab.example.com/dave/{}", name),
        "visibility": visibility,
        "topics": topics,
        "tag_list": topics,
    })
}

/// Stable project id derived from the name
pub fn gitlab_id(name: &str) -> u64 {
    name.bytes().fold(7u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64)) % 100_000
}

/// A page of `count` private GitLab projects named `{prefix}-{i}`
pub fn gitlab_page(prefix: &str, count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| gitlab_project(&format!("{}-{}", prefix, i), "private", &[]))
            .collect(),
    )
}

/// Gitea `/user/repos` record
pub fn gitea_repo(name: &str, private: bool, empty: bool) -> Value {
    json!({
        "name": name,
        "ssh_url": format!("git@gitea.example.com:dave/{}.git", name),
        "description": "",
        "html_url": format!("https://gitea.example.com/dave/{}", name),
        "private": private,
        "empty": empty,
        "topics": ["githubmirror"],
    })
}

/// GitHub `/user/repos` record
pub fn github_repo(name: &str) -> Value {
    json!({
        "name": name,
        "ssh_url": format!("git@github.com:dave/{}.git", name),
        "description": null,
        "html_url": format!("https://github.com/dave/{}", name),
        "private": false,
        "size": 12,
    })
}

/// In-memory host serving pre-built pages. Pages past the end are empty.
pub struct PagedHost {
    pub pages: Vec<Vec<Project>>,
    pub fail_on_page: Option<u32>,
    pub requested: Mutex<Vec<u32>>,
}

impl PagedHost {
    pub fn new(pages: Vec<Vec<Project>>) -> Self {
        Self {
            pages,
            fail_on_page: None,
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProjectHost for PagedHost {
    fn name(&self) -> &'static str {
        "paged"
    }

    async fn list_page(&self, page: u32, _page_size: u32) -> Result<Vec<Project>> {
        self.requested.lock().unwrap().push(page);
        if self.fail_on_page == Some(page) {
            return Err(Error::catalog_fetch("paged", page, "boom"));
        }
        let index = (page - self.first_page()) as usize;
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }

    async fn create_project(&self, request: &CreateProject) -> Result<Project> {
        Ok(Project::new(
            &request.name,
            format!("git@paged:{}.git", request.name),
            Visibility::Public,
        ))
    }
}

/// `count` private projects named `{prefix}-{i}`
pub fn private_projects(prefix: &str, count: usize) -> Vec<Project> {
    (0..count)
        .map(|i| {
            Project::new(
                format!("{}-{}", prefix, i),
                format!("git@paged:{}-{}.git", prefix, i),
                Visibility::Private,
            )
        })
        .collect()
}
