//! Error types for repomirror-providers

use thiserror::Error;

/// Result type alias using repomirror-providers's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Provider error types
#[derive(Error, Debug)]
pub enum Error {
    /// Listing a page of projects failed. Fatal: reconciliation never starts
    /// from a partial catalog.
    #[error("Failed to fetch {provider} projects (page {page}): {message}")]
    CatalogFetch {
        provider: String,
        page: u32,
        message: String,
    },

    /// Repository creation failed
    #[error("Failed to create {provider} repository '{name}': {message}")]
    CreateFailed {
        provider: String,
        name: String,
        message: String,
    },

    /// Listing a project's webhooks failed
    #[error("Failed to list {provider} hooks for '{project}': {message}")]
    HookFetch {
        provider: String,
        project: String,
        message: String,
    },

    /// Webhook creation failed
    #[error("Failed to create {provider} hook {url} on '{project}': {message}")]
    HookCreate {
        provider: String,
        project: String,
        url: String,
        message: String,
    },

    /// The token's user could not be looked up
    #[error("Failed to look up the {provider} user: {message}")]
    UserFetch { provider: String, message: String },

    /// Malformed hooks file
    #[error("Invalid hooks file: {0}")]
    HookFile(#[from] serde_json::Error),

    /// Unknown provider name
    #[error("Unknown provider: {provider}. Valid providers: gitlab, gitea, github")]
    UnsupportedProvider { provider: String },

    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] repomirror_core::Error),
}

impl Error {
    /// Create a catalog fetch error
    pub fn catalog_fetch(provider: impl Into<String>, page: u32, message: impl Into<String>) -> Self {
        Self::CatalogFetch {
            provider: provider.into(),
            page,
            message: message.into(),
        }
    }

    /// Create a repository creation error
    pub fn create_failed(
        provider: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::CreateFailed {
            provider: provider.into(),
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a hook listing error
    pub fn hook_fetch(
        provider: impl Into<String>,
        project: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::HookFetch {
            provider: provider.into(),
            project: project.into(),
            message: message.into(),
        }
    }

    /// Create a hook creation error
    pub fn hook_create(
        provider: impl Into<String>,
        project: impl Into<String>,
        url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::HookCreate {
            provider: provider.into(),
            project: project.into(),
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a user lookup error
    pub fn user_fetch(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UserFetch {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported provider error
    pub fn unsupported_provider(provider: impl Into<String>) -> Self {
        Self::UnsupportedProvider {
            provider: provider.into(),
        }
    }
}
