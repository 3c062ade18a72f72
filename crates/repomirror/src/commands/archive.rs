//! Archive command: clone or refresh private projects locally

use anyhow::{Context, Result};
use repomirror_providers::{create_host, EligibilityFilter, ProviderKind};
use repomirror_sync::{GitCli, LocalCloneState, ReconcileOptions, Reconciler};
use std::sync::Arc;

use super::{close_agent, fetch_catalog, load_config, open_agent, reconcile_options, RunStatus};
use crate::cli::{ArchiveArgs, GlobalArgs};
use crate::output;

pub async fn run(args: ArchiveArgs, global: &GlobalArgs) -> Result<RunStatus> {
    let config = load_config(global)?;
    let settings = config.settings().clone();
    let source_kind = ProviderKind::from(args.source);

    config.identity()?;
    let source_host = create_host(source_kind, &config)?;

    output::header(&format!("Archiving {} projects", source_kind));
    output::kv("Work dir", settings.work_dir.as_str());

    let source = fetch_catalog(
        source_host.as_ref(),
        settings.page_size,
        &EligibilityFilter::Archival,
    )
    .await?;

    let session = open_agent(&config).await?;
    let reconciler = Reconciler::new(
        Arc::new(GitCli::default()),
        LocalCloneState::new(settings.work_dir.clone()),
        ReconcileOptions {
            write_descriptions: true,
            ..reconcile_options(&settings, source_kind.as_str())
        },
    );

    let outcome = reconciler.run(&source, None, session.socket()).await;
    close_agent(session);
    let report = outcome.context("Archive run failed")?;

    output::report("Archive summary", "All projects archived", &report);
    Ok(RunStatus::from_report(&report, global.allow_failures))
}
