//! Git transport used by the reconciler
//!
//! [`GitTransport`] is the seam between the engine and git itself. [`GitCli`]
//! runs the `git` binary; tests substitute a recording implementation.
//!
//! Operations that reach a remote (clone, fetch, merge, push) receive the
//! agent socket explicitly and set it only on their own child process.

mod cli;

pub use cli::GitCli;

use crate::agent::AgentSocket;
use crate::error::Result;
use async_trait::async_trait;
use camino::Utf8Path;
use repomirror_core::PushPolicy;

/// Git operations needed to mirror one project
#[async_trait]
pub trait GitTransport: Send + Sync {
    /// Clone `url` into `destination`
    async fn clone_repo(&self, url: &str, destination: &Utf8Path, auth: &AgentSocket)
        -> Result<()>;

    /// Fetch all remotes of the repository at `repo`
    async fn fetch(&self, repo: &Utf8Path, auth: &AgentSocket) -> Result<()>;

    /// Fast-forward `branch` from `remote`
    async fn merge(
        &self,
        repo: &Utf8Path,
        remote: &str,
        branch: &str,
        auth: &AgentSocket,
    ) -> Result<()>;

    /// Register a remote. Fails with `Error::RemoteExists` if `name` is taken.
    async fn add_remote(&self, repo: &Utf8Path, name: &str, url: &str) -> Result<()>;

    /// URL of remote `name`, `None` if it is not registered
    async fn remote_url(&self, repo: &Utf8Path, name: &str) -> Result<Option<String>>;

    /// Push `branch` to `remote`
    async fn push(
        &self,
        repo: &Utf8Path,
        remote: &str,
        branch: &str,
        policy: PushPolicy,
        auth: &AgentSocket,
    ) -> Result<()>;
}
