//! `git` command-line transport

use super::GitTransport;
use crate::agent::AgentSocket;
use crate::error::{Error, Result};
use async_trait::async_trait;
use camino::Utf8Path;
use repomirror_core::PushPolicy;
use tokio::process::Command;
use tracing::{debug, info};

/// Runs the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self, repo: Option<&Utf8Path>, auth: Option<&AgentSocket>) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(repo) = repo {
            cmd.current_dir(repo);
        }
        if let Some(auth) = auth {
            auth.apply(&mut cmd);
        }
        // Never block a worker on a credential prompt
        cmd.env("GIT_TERMINAL_PROMPT", "0");
        cmd
    }

    async fn run(&self, mut cmd: Command, name: &str) -> Result<String> {
        debug!("Running: git {}", name);
        let output = cmd
            .output()
            .await
            .map_err(|e| Error::git_command(name, e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::git_command(name, stderr.trim()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl GitTransport for GitCli {
    async fn clone_repo(
        &self,
        url: &str,
        destination: &Utf8Path,
        auth: &AgentSocket,
    ) -> Result<()> {
        info!("Cloning repository: {} -> {}", url, destination);

        let mut cmd = self.command(None, Some(auth));
        cmd.arg("clone").arg(url).arg(destination.as_str());
        self.run(cmd, "clone").await?;
        Ok(())
    }

    async fn fetch(&self, repo: &Utf8Path, auth: &AgentSocket) -> Result<()> {
        info!("Fetching: {}", repo);

        let mut cmd = self.command(Some(repo), Some(auth));
        cmd.args(["fetch", "--all"]);
        self.run(cmd, "fetch").await?;
        Ok(())
    }

    async fn merge(
        &self,
        repo: &Utf8Path,
        remote: &str,
        branch: &str,
        auth: &AgentSocket,
    ) -> Result<()> {
        debug!("Pulling {}/{} into {}", remote, branch, repo);

        let mut cmd = self.command(Some(repo), Some(auth));
        cmd.args(["pull", "--ff-only", remote, branch]);
        self.run(cmd, "pull").await?;
        Ok(())
    }

    async fn add_remote(&self, repo: &Utf8Path, name: &str, url: &str) -> Result<()> {
        if self.remote_url(repo, name).await?.is_some() {
            return Err(Error::remote_exists(name));
        }

        info!("Adding remote '{}': {}", name, url);
        let mut cmd = self.command(Some(repo), None);
        cmd.args(["remote", "add", name, url]);

        match self.run(cmd, "remote add").await {
            Err(Error::GitCommand { message, .. }) if message.contains("already exists") => {
                Err(Error::remote_exists(name))
            }
            other => other.map(|_| ()),
        }
    }

    async fn remote_url(&self, repo: &Utf8Path, name: &str) -> Result<Option<String>> {
        let mut cmd = self.command(Some(repo), None);
        cmd.args(["remote", "get-url", name]);

        let output = cmd
            .output()
            .await
            .map_err(|e| Error::git_command("remote get-url", e.to_string()))?;

        if !output.status.success() {
            // Remote doesn't exist
            return Ok(None);
        }

        Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
    }

    async fn push(
        &self,
        repo: &Utf8Path,
        remote: &str,
        branch: &str,
        policy: PushPolicy,
        auth: &AgentSocket,
    ) -> Result<()> {
        info!("Pushing {} to '{}' ({})", branch, remote, policy);

        let mut cmd = self.command(Some(repo), Some(auth));
        cmd.arg("push");
        if policy.is_force() {
            cmd.arg("--force");
        }
        cmd.args(["--set-upstream", remote, branch]);
        self.run(cmd, "push").await?;
        Ok(())
    }
}
