//! Mirror reconciliation
//!
//! For every project of the source catalog the reconciler:
//!
//! 1. resolves the destination repository by name, creating it when missing
//! 2. clones the project into the work root, or fetches and fast-forwards an
//!    existing clone
//! 3. pushes the branch to the destination remote
//!
//! Projects run concurrently through a [`WorkPool`]; a failure is recorded
//! for its project and the others carry on.
//!
//! Destination repositories are matched by name only. An unrelated
//! destination repository that happens to share a source project's name is
//! treated as its mirror and, with [`PushPolicy::Force`], overwritten.

use crate::agent::AgentSocket;
use crate::error::{Error, Result};
use crate::git::GitTransport;
use crate::local::LocalCloneState;
use crate::pool::WorkPool;
use camino::Utf8Path;
use repomirror_core::{Project, PushPolicy};
use repomirror_providers::{Catalog, CreateProject, ProjectHost};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A step taken for one project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorAction {
    /// Destination repository was created
    CreateDestination,
    /// No local directory existed; the project was cloned
    CloneFresh,
    /// Existing clone was fetched and fast-forwarded
    SyncExisting,
    /// Branch was pushed to the destination
    Push,
    /// Description sidecar was written
    WriteDescription,
}

impl std::fmt::Display for MirrorAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MirrorAction::CreateDestination => write!(f, "create"),
            MirrorAction::CloneFresh => write!(f, "clone"),
            MirrorAction::SyncExisting => write!(f, "sync"),
            MirrorAction::Push => write!(f, "push"),
            MirrorAction::WriteDescription => write!(f, "describe"),
        }
    }
}

/// Reconciler settings
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    /// Branch merged from the source and pushed to the destination
    pub branch: String,

    /// Remote name of the source in a fresh clone
    pub source_remote: String,

    /// Remote name registered for the destination
    pub destination_remote: String,

    pub push_policy: PushPolicy,

    /// Maximum projects processed at once
    pub concurrency: usize,

    /// Fetch and fast-forward existing clones. When off, existing clones are
    /// pushed as they are.
    pub refresh_existing: bool,

    /// Write `<name>.txt` with the project description
    pub write_descriptions: bool,

    /// Visibility of repositories created on the destination
    pub create_private: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            branch: "master".to_string(),
            source_remote: "origin".to_string(),
            destination_remote: "mirror".to_string(),
            push_policy: PushPolicy::Force,
            concurrency: 8,
            refresh_existing: true,
            write_descriptions: false,
            create_private: false,
        }
    }
}

/// Destination provider and its current catalog
#[derive(Clone, Copy)]
pub struct DestinationSide<'a> {
    pub host: &'a dyn ProjectHost,
    pub catalog: &'a Catalog,
}

impl<'a> DestinationSide<'a> {
    pub fn new(host: &'a dyn ProjectHost, catalog: &'a Catalog) -> Self {
        Self { host, catalog }
    }
}

/// Result for one project
#[derive(Debug)]
pub struct ProjectOutcome {
    pub name: String,
    pub result: Result<Vec<MirrorAction>>,
}

/// Per-project results of one run, in source catalog order
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub outcomes: Vec<ProjectOutcome>,
}

impl ReconcileReport {
    /// Number of projects attempted
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.result.is_ok())
            .map(|o| o.name.as_str())
            .collect()
    }

    pub fn failures(&self) -> Vec<(&str, &Error)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Actions recorded for `name`, `None` if it failed or was not attempted
    pub fn actions_for(&self, name: &str) -> Option<&[MirrorAction]> {
        self.outcomes
            .iter()
            .find(|o| o.name == name)
            .and_then(|o| o.result.as_ref().ok())
            .map(Vec::as_slice)
    }
}

/// Mirrors a source catalog into the work root and onto a destination
pub struct Reconciler {
    transport: Arc<dyn GitTransport>,
    local: LocalCloneState,
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(
        transport: Arc<dyn GitTransport>,
        local: LocalCloneState,
        options: ReconcileOptions,
    ) -> Self {
        Self {
            transport,
            local,
            options,
        }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    pub fn local(&self) -> &LocalCloneState {
        &self.local
    }

    /// Reconcile every source project once.
    ///
    /// `source` is usually a `&Catalog`; any other listing may repeat a
    /// name, in which case only its first project is processed.
    /// Without a destination, projects are only cloned or refreshed locally.
    /// Only a work root that cannot be created fails the whole run.
    pub async fn run<'s>(
        &self,
        source: impl IntoIterator<Item = &'s Project>,
        destination: Option<DestinationSide<'_>>,
        auth: &AgentSocket,
    ) -> Result<ReconcileReport> {
        self.local.ensure_root().await?;

        let mut seen = HashSet::new();
        let mut tasks = Vec::new();

        for project in source {
            if !seen.insert(project.name.as_str()) {
                debug!("Skipping repeated project: {}", project.name);
                continue;
            }
            tasks.push((project.name.clone(), move || {
                self.mirror_project(project, destination, auth)
            }));
        }

        let total = tasks.len();
        info!("{} projects to check", total);
        let outcomes = WorkPool::new(self.options.concurrency)
            .submit_all(tasks)
            .await;

        let report = ReconcileReport {
            outcomes: outcomes
                .into_iter()
                .map(|o| ProjectOutcome {
                    name: o.label,
                    result: o.result,
                })
                .collect(),
        };

        info!(
            "{} of {} projects mirrored",
            report.succeeded().len(),
            total
        );
        Ok(report)
    }

    /// Steps for one project, strictly in order
    async fn mirror_project(
        &self,
        project: &Project,
        destination: Option<DestinationSide<'_>>,
        auth: &AgentSocket,
    ) -> Result<Vec<MirrorAction>> {
        let name = project.name.as_str();
        let repo_dir = self.local.path_for(name)?;
        let mut actions = Vec::new();

        let push_url = match destination {
            Some(dest) => Some(self.resolve_destination(project, dest, &mut actions).await?),
            None => None,
        };

        if !self.local.exists(name) {
            actions.push(MirrorAction::CloneFresh);
            if let Err(e) = self
                .transport
                .clone_repo(&project.clone_url, &repo_dir, auth)
                .await
            {
                if let Err(cleanup) = self.local.remove_partial(name).await {
                    warn!("{}: {}", name, cleanup);
                }
                return Err(Error::project_clone(name, e));
            }
        } else if self.options.refresh_existing {
            actions.push(MirrorAction::SyncExisting);
            self.transport
                .fetch(&repo_dir, auth)
                .await
                .map_err(|e| Error::project_sync(name, e))?;
            self.transport
                .merge(
                    &repo_dir,
                    &self.options.source_remote,
                    &self.options.branch,
                    auth,
                )
                .await
                .map_err(|e| Error::project_sync(name, e))?;
        }

        if let Some(push_url) = push_url {
            // Also for existing clones: a directory left by an archive run has no destination remote
            self.register_destination(name, &repo_dir, &push_url).await?;

            actions.push(MirrorAction::Push);
            self.transport
                .push(
                    &repo_dir,
                    &self.options.destination_remote,
                    &self.options.branch,
                    self.options.push_policy,
                    auth,
                )
                .await
                .map_err(|e| Error::project_push(name, e))?;
        }

        if self.options.write_descriptions {
            actions.push(MirrorAction::WriteDescription);
            self.local
                .write_description(name, &project.description)
                .await?;
        }

        info!("Completed {}", name);
        Ok(actions)
    }

    /// Push URL of the destination counterpart, creating it when absent
    async fn resolve_destination(
        &self,
        project: &Project,
        dest: DestinationSide<'_>,
        actions: &mut Vec<MirrorAction>,
    ) -> Result<String> {
        if let Some(existing) = dest.catalog.get(&project.name) {
            return Ok(existing.clone_url.clone());
        }

        info!("{} not found in {}, creating", project.name, dest.host.name());
        actions.push(MirrorAction::CreateDestination);

        let mut request = CreateProject::mirror_of(project);
        request.private = self.options.create_private;

        let created = dest
            .host
            .create_project(&request)
            .await
            .map_err(|e| Error::project_create(&project.name, e))?;
        Ok(created.clone_url)
    }

    /// Register the destination remote; an existing registration is kept
    async fn register_destination(&self, name: &str, repo_dir: &Utf8Path, url: &str) -> Result<()> {
        let remote = &self.options.destination_remote;
        match self.transport.add_remote(repo_dir, remote, url).await {
            Ok(()) => Ok(()),
            Err(Error::RemoteExists { .. }) => {
                if let Ok(Some(existing)) = self.transport.remote_url(repo_dir, remote).await {
                    if existing != url {
                        warn!(
                            "{}: remote '{}' points at {}, expected {}",
                            name, remote, existing, url
                        );
                    }
                }
                Ok(())
            }
            Err(e) => Err(Error::project_push(name, e)),
        }
    }
}
