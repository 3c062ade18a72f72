//! Publish-local command: push archived clones to a destination as private repositories

use anyhow::{Context, Result};
use repomirror_providers::{create_host, EligibilityFilter, ProviderKind};
use repomirror_sync::{local_catalog, DestinationSide, GitCli, LocalCloneState, ReconcileOptions, Reconciler};
use std::sync::Arc;

use super::{close_agent, fetch_catalog, load_config, open_agent, reconcile_options, RunStatus};
use crate::cli::{GlobalArgs, PublishLocalArgs};
use crate::output;

pub async fn run(args: PublishLocalArgs, global: &GlobalArgs) -> Result<RunStatus> {
    let config = load_config(global)?;
    let settings = config.settings().clone();
    let dest_kind = ProviderKind::from(args.dest);

    config.identity()?;
    let dest_host = create_host(dest_kind, &config)?;

    output::header(&format!("Publishing local clones to {}", dest_kind));
    output::kv("Work dir", settings.work_dir.as_str());

    let local = LocalCloneState::new(settings.work_dir.clone());
    let source = local_catalog(&local)
        .await
        .with_context(|| format!("Failed to scan {}", settings.work_dir))?;
    if source.is_empty() {
        output::info("No local clones to publish");
        return Ok(RunStatus::Success);
    }

    let destination = fetch_catalog(dest_host.as_ref(), settings.page_size, &EligibilityFilter::All)
        .await?;

    let session = open_agent(&config).await?;
    let reconciler = Reconciler::new(
        Arc::new(GitCli::default()),
        local,
        ReconcileOptions {
            refresh_existing: false,
            create_private: true,
            ..reconcile_options(&settings, dest_kind.as_str())
        },
    );

    let outcome = reconciler
        .run(
            &source,
            Some(DestinationSide::new(dest_host.as_ref(), &destination)),
            session.socket(),
        )
        .await;
    close_agent(session);
    let report = outcome.context("Publish run failed")?;

    output::report("Publish summary", "All local clones published", &report);
    Ok(RunStatus::from_report(&report, global.allow_failures))
}
