//! Mirror command: publish tagged public projects to a destination host

use anyhow::{bail, Context, Result};
use repomirror_providers::{create_host, EligibilityFilter, ProviderKind};
use repomirror_sync::{DestinationSide, GitCli, LocalCloneState, Reconciler};
use std::sync::Arc;
use tracing::info;

use super::{close_agent, fetch_catalog, load_config, open_agent, reconcile_options, RunStatus};
use crate::cli::{GlobalArgs, MirrorArgs};
use crate::output;

pub async fn run(args: MirrorArgs, global: &GlobalArgs) -> Result<RunStatus> {
    let source_kind = ProviderKind::from(args.source);
    let dest_kind = ProviderKind::from(args.dest);
    if source_kind == dest_kind {
        bail!("Source and destination are both {}", source_kind);
    }

    let config = load_config(global)?;
    let settings = config.settings().clone();

    // Fail on missing credentials before touching the network
    config.identity()?;
    let source_host = create_host(source_kind, &config)?;
    let dest_host = create_host(dest_kind, &config)?;

    let tag = args.tag.unwrap_or_else(|| settings.mirror_tag.clone());
    output::header(&format!("Mirroring {} -> {}", source_kind, dest_kind));
    output::kv("Tag", &tag);
    output::kv("Work dir", settings.work_dir.as_str());

    let source = fetch_catalog(
        source_host.as_ref(),
        settings.page_size,
        &EligibilityFilter::publish(&tag),
    )
    .await?;
    let destination = fetch_catalog(dest_host.as_ref(), settings.page_size, &EligibilityFilter::All)
        .await?;
    info!(
        "{} eligible {} projects, {} existing {} repositories",
        source.len(),
        source_kind,
        destination.len(),
        dest_kind
    );

    let session = open_agent(&config).await?;
    let reconciler = Reconciler::new(
        Arc::new(GitCli::default()),
        LocalCloneState::new(settings.work_dir.clone()),
        reconcile_options(&settings, dest_kind.as_str()),
    );

    let outcome = reconciler
        .run(
            &source,
            Some(DestinationSide::new(dest_host.as_ref(), &destination)),
            session.socket(),
        )
        .await;
    close_agent(session);
    let report = outcome.context("Mirror run failed")?;

    output::report("Mirror summary", "All projects mirrored", &report);
    Ok(RunStatus::from_report(&report, global.allow_failures))
}
