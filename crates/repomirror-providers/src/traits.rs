//! Provider trait definitions

use crate::error::Result;
use async_trait::async_trait;
use repomirror_core::Project;

/// Metadata for a repository created on a destination provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProject {
    pub name: String,

    /// May be empty; providers accept repositories without a description
    pub description: String,

    /// Link back to the source project
    pub homepage: String,

    pub private: bool,
}

impl CreateProject {
    /// Creation request carrying over a source project's metadata
    pub fn mirror_of(source: &Project) -> Self {
        Self {
            name: source.name.clone(),
            description: source.description.clone(),
            homepage: source.homepage_url.clone(),
            private: false,
        }
    }
}

/// A hosting provider that can list the caller's repositories and create new ones
#[async_trait]
pub trait ProjectHost: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Index of the first page of the listing endpoint
    fn first_page(&self) -> u32 {
        1
    }

    /// Fetch one page of owned projects. An empty page marks the end of results.
    async fn list_page(&self, page: u32, page_size: u32) -> Result<Vec<Project>>;

    /// Create a repository and return it, including its push URL
    async fn create_project(&self, request: &CreateProject) -> Result<Project>;
}
