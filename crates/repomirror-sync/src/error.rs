//! Error types for repomirror-sync

use thiserror::Error;

/// Result type alias using repomirror-sync's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Sync engine error types
///
/// Session-level errors (`AgentStartup`, `IdentityAdd`, `Catalog`) abort the
/// run. The `Project*` variants are captured per project and reported at the
/// end without stopping other projects.
#[derive(Error, Debug)]
pub enum Error {
    /// ssh-agent could not be started or its output could not be parsed
    #[error("Failed to start ssh-agent: {message}")]
    AgentStartup { message: String },

    /// ssh-add rejected the identity
    #[error("Failed to add identity {identity} to ssh-agent: {message}")]
    IdentityAdd { identity: String, message: String },

    /// The agent process could not be signaled
    #[error("Failed to stop ssh-agent (pid {pid}): {message}")]
    AgentShutdown { pid: i32, message: String },

    /// A git subprocess exited unsuccessfully
    #[error("git {command} failed: {message}")]
    GitCommand { command: String, message: String },

    /// Remote already registered. Expected on re-runs and never reported.
    #[error("Remote '{remote}' already exists")]
    RemoteExists { remote: String },

    /// Project name cannot be used as a directory name
    #[error("Invalid project name: '{name}'")]
    InvalidProjectName { name: String },

    /// Destination repository could not be created
    #[error("{project}: failed to create destination repository: {message}")]
    ProjectCreate { project: String, message: String },

    /// Fresh clone failed (partial directory removed)
    #[error("{project}: clone failed: {message}")]
    ProjectClone { project: String, message: String },

    /// Fetch or merge of an existing clone failed
    #[error("{project}: sync failed: {message}")]
    ProjectSync { project: String, message: String },

    /// Push to the destination failed
    #[error("{project}: push failed: {message}")]
    ProjectPush { project: String, message: String },

    /// A pool task panicked
    #[error("{label}: worker panicked: {message}")]
    Worker { label: String, message: String },

    /// Provider catalog error
    #[error(transparent)]
    Catalog(#[from] repomirror_providers::Error),

    /// Regex error
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an agent startup error
    pub fn agent_startup(message: impl Into<String>) -> Self {
        Self::AgentStartup {
            message: message.into(),
        }
    }

    /// Create an identity add error
    pub fn identity_add(identity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::IdentityAdd {
            identity: identity.into(),
            message: message.into(),
        }
    }

    /// Create a git command error
    pub fn git_command(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::GitCommand {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a remote exists error
    pub fn remote_exists(remote: impl Into<String>) -> Self {
        Self::RemoteExists {
            remote: remote.into(),
        }
    }

    /// Create an invalid project name error
    pub fn invalid_project_name(name: impl Into<String>) -> Self {
        Self::InvalidProjectName { name: name.into() }
    }

    /// Create a project create error
    pub fn project_create(project: impl Into<String>, message: impl ToString) -> Self {
        Self::ProjectCreate {
            project: project.into(),
            message: message.to_string(),
        }
    }

    /// Create a project clone error
    pub fn project_clone(project: impl Into<String>, message: impl ToString) -> Self {
        Self::ProjectClone {
            project: project.into(),
            message: message.to_string(),
        }
    }

    /// Create a project sync error
    pub fn project_sync(project: impl Into<String>, message: impl ToString) -> Self {
        Self::ProjectSync {
            project: project.into(),
            message: message.to_string(),
        }
    }

    /// Create a project push error
    pub fn project_push(project: impl Into<String>, message: impl ToString) -> Self {
        Self::ProjectPush {
            project: project.into(),
            message: message.to_string(),
        }
    }

    /// Create a worker panic error
    pub fn worker(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Worker {
            label: label.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a per-project failure rather than a run-level one
    pub fn is_project_failure(&self) -> bool {
        matches!(
            self,
            Self::ProjectCreate { .. }
                | Self::ProjectClone { .. }
                | Self::ProjectSync { .. }
                | Self::ProjectPush { .. }
                | Self::InvalidProjectName { .. }
                | Self::Worker { .. }
        )
    }
}
