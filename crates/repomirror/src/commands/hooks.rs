//! Hooks command: export GitLab project webhooks and recreate them on Gitea

use anyhow::{Context, Result};
use repomirror_providers::gitea::GiteaHost;
use repomirror_providers::gitlab::GitLabHost;
use repomirror_providers::{export_gitlab_hooks, import_gitea_hooks, HookMap, HookStatus};
use tracing::info;

use super::{load_config, RunStatus};
use crate::cli::{GlobalArgs, HooksArgs, HooksCommand, HooksExportArgs, HooksImportArgs};
use crate::output;

pub async fn run(args: HooksArgs, global: &GlobalArgs) -> Result<RunStatus> {
    match args.command {
        HooksCommand::Export(args) => export(args, global).await,
        HooksCommand::Import(args) => import(args, global).await,
    }
}

async fn export(args: HooksExportArgs, global: &GlobalArgs) -> Result<RunStatus> {
    let config = load_config(global)?;
    let creds = config.gitlab()?;
    let host = GitLabHost::new(&creds.url, &creds.token)?;

    let spinner = output::spinner("Listing gitlab hooks...");
    let result = export_gitlab_hooks(&host, config.settings().page_size).await;
    spinner.finish_and_clear();
    let hooks = result.context("Failed to export gitlab hooks")?;

    std::fs::write(&args.output, hooks.to_json()?)
        .with_context(|| format!("Failed to write {}", args.output))?;

    output::header("Hook export");
    output::kv("Projects", &hooks.len().to_string());
    output::kv("Hooks", &hooks.hook_count().to_string());
    output::success(&format!("Hooks written to {}", args.output));
    Ok(RunStatus::Success)
}

async fn import(args: HooksImportArgs, global: &GlobalArgs) -> Result<RunStatus> {
    let config = load_config(global)?;
    let creds = config.gitea()?;

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input))?;
    let hooks = HookMap::from_json(&content)
        .with_context(|| format!("Failed to parse {}", args.input))?;

    let host = GiteaHost::new(&creds.url, &creds.token)?;
    let owner = match args.owner {
        Some(owner) => owner,
        None => host.current_user().await?,
    };
    info!(
        "Importing {} hooks for {} projects to {}",
        hooks.hook_count(),
        hooks.len(),
        owner
    );

    let outcomes = import_gitea_hooks(&host, &owner, &hooks).await;

    let count = |status: HookStatus| {
        outcomes
            .iter()
            .filter(|o| matches!(&o.result, Ok(s) if *s == status))
            .count()
    };
    let created = count(HookStatus::Created);
    let present = count(HookStatus::AlreadyPresent);

    output::header("Hook import");
    output::kv("Created", &created.to_string());
    output::kv("Already present", &present.to_string());

    let mut failed = 0;
    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            output::error(&e.to_string());
            failed += 1;
        }
    }
    if failed == 0 {
        output::success("All hooks imported");
    } else {
        output::kv("Failed", &failed.to_string());
    }

    Ok(RunStatus::from_failures(failed, global.allow_failures))
}
