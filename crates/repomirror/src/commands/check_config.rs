//! Check-config command

use anyhow::Result;
use repomirror_core::MirrorConfig;

use super::{load_config, RunStatus};
use crate::cli::GlobalArgs;
use crate::output;

pub fn run(global: &GlobalArgs) -> Result<RunStatus> {
    let config = load_config(global)?;
    output::success(&format!("Configuration is valid: {}", config.path));

    print_config(&config);
    Ok(RunStatus::Success)
}

fn print_config(config: &MirrorConfig) {
    let creds = &config.credentials;

    output::header("Providers");
    match &creds.gitlab {
        Some(gitlab) => output::kv("GitLab", &gitlab.url),
        None => output::kv("GitLab", "not configured"),
    }
    match &creds.gitea {
        Some(gitea) => output::kv("Gitea", &gitea.url),
        None => output::kv("Gitea", "not configured"),
    }
    match &creds.github {
        Some(github) => output::kv("GitHub", &format!("{} ({})", github.url, github.username)),
        None => output::kv("GitHub", "not configured"),
    }

    match config.identity() {
        Ok(identity) => output::kv("Identity", identity.as_str()),
        Err(_) => output::warning("No SSH identity configured; only check-config can run"),
    }

    let settings = config.settings();
    output::header("Settings");
    output::kv("Work dir", settings.work_dir.as_str());
    output::kv("Concurrency", &settings.concurrency.to_string());
    output::kv("Page size", &settings.page_size.to_string());
    output::kv("Branch", &settings.branch);
    output::kv("Source remote", &settings.source_remote);
    output::kv("Mirror tag", &settings.mirror_tag);
    output::kv("Push policy", &settings.push_policy.to_string());
    if settings.push_policy.is_force() {
        output::warning("Force push replaces destination history on every run");
    }
    output::kv(
        "Agent socket dir",
        settings
            .agent_socket_dir
            .as_ref()
            .map(|d| d.as_str())
            .unwrap_or("(ssh-agent default)"),
    );
}
