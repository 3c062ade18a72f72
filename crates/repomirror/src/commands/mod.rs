//! CLI command implementations

pub mod archive;
pub mod check_config;
pub mod hooks;
pub mod mirror;
pub mod publish_local;

use anyhow::{bail, Context, Result};
use repomirror_core::{MirrorConfig, Settings};
use repomirror_providers::{list_owned_projects, Catalog, EligibilityFilter, ProjectHost};
use repomirror_sync::{AgentOptions, AgentSession, ReconcileOptions, ReconcileReport};

use crate::cli::GlobalArgs;
use crate::output;

/// How the process should exit once a command is done
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    ProjectFailures,
}

impl RunStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, RunStatus::Success)
    }

    /// Failed projects fail the run unless `--allow-failures` was given
    pub fn from_report(report: &ReconcileReport, allow_failures: bool) -> Self {
        Self::from_failures(report.failures().len(), allow_failures)
    }

    pub fn from_failures(failed: usize, allow_failures: bool) -> Self {
        if failed == 0 {
            return RunStatus::Success;
        }
        if allow_failures {
            output::warning("Some projects failed; exiting 0 because of --allow-failures");
            return RunStatus::Success;
        }
        RunStatus::ProjectFailures
    }
}

/// Load the credential file and apply command-line overrides
pub(crate) fn load_config(global: &GlobalArgs) -> Result<MirrorConfig> {
    let mut config = MirrorConfig::load(global.creds.as_deref())
        .context("Failed to load credential file")?;
    apply_overrides(config.settings_mut(), global)?;
    Ok(config)
}

fn apply_overrides(settings: &mut Settings, global: &GlobalArgs) -> Result<()> {
    if let Some(work_dir) = &global.work_dir {
        settings.work_dir = work_dir.clone();
    }
    if let Some(concurrency) = global.concurrency {
        if concurrency == 0 {
            bail!("--concurrency must be at least 1");
        }
        settings.concurrency = concurrency;
    }
    if let Some(branch) = &global.branch {
        if branch.trim().is_empty() {
            bail!("--branch must not be empty");
        }
        settings.branch = branch.clone();
    }
    Ok(())
}

/// Start an isolated agent holding the configured identity.
///
/// On failure the half-started session is dropped, which stops its agent.
pub(crate) async fn open_agent(config: &MirrorConfig) -> Result<AgentSession> {
    let identity = config.identity()?;
    let options = AgentOptions {
        socket_dir: config.settings().agent_socket_dir.clone(),
        ..AgentOptions::default()
    };

    let session = AgentSession::open(&options)
        .await
        .context("Failed to start ssh-agent")?;
    session
        .add_identity(identity)
        .await
        .context("Failed to load SSH identity")?;
    Ok(session)
}

/// Reconciler settings derived from the run settings
pub(crate) fn reconcile_options(settings: &Settings, destination_remote: &str) -> ReconcileOptions {
    ReconcileOptions {
        branch: settings.branch.clone(),
        source_remote: settings.source_remote.clone(),
        destination_remote: destination_remote.to_string(),
        push_policy: settings.push_policy,
        concurrency: settings.concurrency,
        ..ReconcileOptions::default()
    }
}

/// List a host's projects with a spinner
pub(crate) async fn fetch_catalog(
    host: &dyn ProjectHost,
    page_size: u32,
    filter: &EligibilityFilter,
) -> Result<Catalog> {
    let spinner = output::spinner(&format!("Listing {} projects...", host.name()));
    let result = list_owned_projects(host, page_size, filter).await;
    spinner.finish_and_clear();

    result.with_context(|| format!("Failed to list {} projects", host.name()))
}

/// Stop the agent, reporting rather than failing when it cannot be signaled
pub(crate) fn close_agent(session: AgentSession) {
    if let Err(e) = session.close() {
        output::warning(&e.to_string());
    }
}
