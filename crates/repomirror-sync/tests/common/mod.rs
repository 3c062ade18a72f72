//! Common test helpers for repomirror-sync integration tests
//!
//! - `RecordingTransport`: a `GitTransport` that logs every call, keeps an
//!   in-memory remote table and fails on demand
//! - `MemoryHost`: a destination `ProjectHost` recording created repositories

#![allow(dead_code)]

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use repomirror_core::{Project, PushPolicy, Visibility};
use repomirror_providers::{Catalog, CreateProject, ProjectHost};
use repomirror_sync::{AgentSocket, Error, GitTransport, LocalCloneState, Result};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;

/// A git operation seen by the recording transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Clone { url: String, project: String },
    Fetch { project: String },
    Merge { project: String, remote: String, branch: String },
    AddRemote { project: String, name: String, url: String },
    Push { project: String, remote: String, branch: String, policy: PushPolicy },
}

impl GitCall {
    pub fn project(&self) -> &str {
        match self {
            GitCall::Clone { project, .. }
            | GitCall::Fetch { project }
            | GitCall::Merge { project, .. }
            | GitCall::AddRemote { project, .. }
            | GitCall::Push { project, .. } => project,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GitCall::Clone { .. } => "clone",
            GitCall::Fetch { .. } => "fetch",
            GitCall::Merge { .. } => "merge",
            GitCall::AddRemote { .. } => "add_remote",
            GitCall::Push { .. } => "push",
        }
    }
}

/// Recording transport. Clones create the target directory, like git does,
/// before an injected failure is reported.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<GitCall>>,
    remotes: Mutex<HashMap<(String, String), String>>,
    failures: Mutex<HashSet<(&'static str, String)>>,
    auth_seen: Mutex<Vec<Utf8PathBuf>>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every clone and push sleeps for `delay`, to observe concurrency
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Make operation `kind` fail for `project`
    pub fn fail(&self, kind: &'static str, project: &str) {
        self.failures
            .lock()
            .unwrap()
            .insert((kind, project.to_string()));
    }

    /// Pretend `project` already has remote `name` pointing at `url`
    pub fn preset_remote(&self, project: &str, name: &str, url: &str) {
        self.remotes
            .lock()
            .unwrap()
            .insert((project.to_string(), name.to_string()), url.to_string());
    }

    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, project: &str) -> Vec<GitCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.project() == project)
            .collect()
    }

    pub fn kinds_for(&self, project: &str) -> Vec<&'static str> {
        self.calls_for(project).iter().map(GitCall::kind).collect()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.calls().iter().filter(|c| c.kind() == kind).count()
    }

    pub fn auth_seen(&self) -> Vec<Utf8PathBuf> {
        self.auth_seen.lock().unwrap().clone()
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn record(&self, call: GitCall) -> Result<()> {
        let kind = call.kind();
        let project = call.project().to_string();
        self.calls.lock().unwrap().push(call);

        if self.failures.lock().unwrap().contains(&(kind, project.clone())) {
            return Err(Error::git_command(kind, format!("injected failure for {}", project)));
        }
        Ok(())
    }

    async fn busy(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

fn project_of(path: &Utf8Path) -> String {
    path.file_name().unwrap_or_default().to_string()
}

#[async_trait]
impl GitTransport for RecordingTransport {
    async fn clone_repo(
        &self,
        url: &str,
        destination: &Utf8Path,
        auth: &AgentSocket,
    ) -> Result<()> {
        self.auth_seen.lock().unwrap().push(auth.path().to_owned());
        self.busy().await;
        std::fs::create_dir_all(destination.join(".git"))?;
        self.record(GitCall::Clone {
            url: url.to_string(),
            project: project_of(destination),
        })
    }

    async fn fetch(&self, repo: &Utf8Path, auth: &AgentSocket) -> Result<()> {
        self.auth_seen.lock().unwrap().push(auth.path().to_owned());
        self.record(GitCall::Fetch {
            project: project_of(repo),
        })
    }

    async fn merge(
        &self,
        repo: &Utf8Path,
        remote: &str,
        branch: &str,
        _auth: &AgentSocket,
    ) -> Result<()> {
        self.record(GitCall::Merge {
            project: project_of(repo),
            remote: remote.to_string(),
            branch: branch.to_string(),
        })
    }

    async fn add_remote(&self, repo: &Utf8Path, name: &str, url: &str) -> Result<()> {
        let project = project_of(repo);
        self.record(GitCall::AddRemote {
            project: project.clone(),
            name: name.to_string(),
            url: url.to_string(),
        })?;

        let mut remotes = self.remotes.lock().unwrap();
        let key = (project, name.to_string());
        if remotes.contains_key(&key) {
            return Err(Error::remote_exists(name));
        }
        remotes.insert(key, url.to_string());
        Ok(())
    }

    async fn remote_url(&self, repo: &Utf8Path, name: &str) -> Result<Option<String>> {
        let remotes = self.remotes.lock().unwrap();
        Ok(remotes.get(&(project_of(repo), name.to_string())).cloned())
    }

    async fn push(
        &self,
        repo: &Utf8Path,
        remote: &str,
        branch: &str,
        policy: PushPolicy,
        auth: &AgentSocket,
    ) -> Result<()> {
        self.auth_seen.lock().unwrap().push(auth.path().to_owned());
        self.busy().await;
        self.record(GitCall::Push {
            project: project_of(repo),
            remote: remote.to_string(),
            branch: branch.to_string(),
            policy,
        })
    }
}

/// Destination host that records creation requests
#[derive(Default)]
pub struct MemoryHost {
    created: Mutex<Vec<CreateProject>>,
    fail_create: Mutex<HashSet<String>>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_create(&self, name: &str) {
        self.fail_create.lock().unwrap().insert(name.to_string());
    }

    pub fn created(&self) -> Vec<CreateProject> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProjectHost for MemoryHost {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_page(&self, _page: u32, _page_size: u32) -> repomirror_providers::Result<Vec<Project>> {
        Ok(Vec::new())
    }

    async fn create_project(&self, request: &CreateProject) -> repomirror_providers::Result<Project> {
        if self.fail_create.lock().unwrap().contains(&request.name) {
            return Err(repomirror_providers::Error::create_failed(
                "memory",
                &request.name,
                "HTTP 422: name already exists",
            ));
        }
        self.created.lock().unwrap().push(request.clone());
        Ok(Project::new(
            &request.name,
            dest_url(&request.name),
            Visibility::from_private(request.private),
        ))
    }
}

/// Push URL the memory host hands out for `name`
pub fn dest_url(name: &str) -> String {
    format!("git@memory.example.com:dave/{}.git", name)
}

/// Public source project tagged for mirroring
pub fn source_project(name: &str) -> Project {
    Project::new(
        name,
        format!("git@gitlab.example.com:dave/{}.git", name),
        Visibility::Public,
    )
    .with_description(format!("{} description", name))
    .with_homepage(format!("https://gitlab.example.com/dave/{}", name))
    .with_tag("githubmirror")
}

pub fn catalog_of(names: &[&str]) -> Catalog {
    names.iter().map(|n| source_project(n)).collect()
}

/// Destination catalog where every name already has a mirror
pub fn destination_catalog(names: &[&str]) -> Catalog {
    names
        .iter()
        .map(|n| Project::new(*n, dest_url(n), Visibility::Public))
        .collect()
}

pub fn test_socket() -> AgentSocket {
    AgentSocket::new("/tmp/repomirror-test/agent.sock")
}

/// Temp work root plus the clone state over it
pub fn work_root() -> (TempDir, LocalCloneState) {
    let dir = TempDir::new().unwrap();
    let root = Utf8Path::from_path(dir.path()).unwrap().join("work");
    (dir, LocalCloneState::new(root))
}
