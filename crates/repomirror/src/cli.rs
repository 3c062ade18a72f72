//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use repomirror_providers::ProviderKind;

/// repomirror - mirror, archive and publish git repositories
#[derive(Parser, Debug)]
#[command(name = "repomirror")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the credential file (JSON or YAML)
    #[arg(long, global = true, env = "REPOMIRROR_CREDS")]
    pub creds: Option<Utf8PathBuf>,

    /// Working directory for local clones (overrides settings.work_dir)
    #[arg(long, global = true)]
    pub work_dir: Option<Utf8PathBuf>,

    /// Maximum projects processed at once (overrides settings.concurrency)
    #[arg(short = 'j', long, global = true)]
    pub concurrency: Option<usize>,

    /// Branch to mirror (overrides settings.branch)
    #[arg(long, global = true)]
    pub branch: Option<String>,

    /// Exit 0 even when some projects failed
    #[arg(long, global = true)]
    pub allow_failures: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Options shared by every command
    pub fn global(&self) -> GlobalArgs {
        GlobalArgs {
            creds: self.creds.clone(),
            work_dir: self.work_dir.clone(),
            concurrency: self.concurrency,
            branch: self.branch.clone(),
            allow_failures: self.allow_failures,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub creds: Option<Utf8PathBuf>,
    pub work_dir: Option<Utf8PathBuf>,
    pub concurrency: Option<usize>,
    pub branch: Option<String>,
    pub allow_failures: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Publish tagged public projects to a destination host
    Mirror(MirrorArgs),

    /// Clone or refresh private projects locally for archival
    Archive(ArchiveArgs),

    /// Push archived local clones to a destination as private repositories
    PublishLocal(PublishLocalArgs),

    /// Migrate project webhooks from GitLab to Gitea
    Hooks(HooksArgs),

    /// Validate the credential file and show the resolved settings
    CheckConfig,
}

/// Hosts projects can be read from
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceHost {
    Gitlab,
    Gitea,
}

impl From<SourceHost> for ProviderKind {
    fn from(host: SourceHost) -> Self {
        match host {
            SourceHost::Gitlab => ProviderKind::GitLab,
            SourceHost::Gitea => ProviderKind::Gitea,
        }
    }
}

/// Hosts projects can be published to
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationHost {
    Github,
    Gitea,
    Gitlab,
}

impl From<DestinationHost> for ProviderKind {
    fn from(host: DestinationHost) -> Self {
        match host {
            DestinationHost::Github => ProviderKind::GitHub,
            DestinationHost::Gitea => ProviderKind::Gitea,
            DestinationHost::Gitlab => ProviderKind::GitLab,
        }
    }
}

#[derive(Args, Debug)]
pub struct MirrorArgs {
    /// Host to read projects from
    #[arg(long, value_enum, default_value = "gitlab")]
    pub source: SourceHost,

    /// Host to publish mirrors to
    #[arg(long, value_enum, default_value = "github")]
    pub dest: DestinationHost,

    /// Tag a public project must carry (overrides settings.mirror_tag)
    #[arg(long)]
    pub tag: Option<String>,
}

#[derive(Args, Debug)]
pub struct ArchiveArgs {
    /// Host to read projects from
    #[arg(long, value_enum, default_value = "gitlab")]
    pub source: SourceHost,
}

#[derive(Args, Debug)]
pub struct PublishLocalArgs {
    /// Host to publish the local clones to
    #[arg(long, value_enum, default_value = "gitea")]
    pub dest: DestinationHost,
}

#[derive(Args, Debug)]
pub struct HooksArgs {
    #[command(subcommand)]
    pub command: HooksCommand,
}

#[derive(Subcommand, Debug)]
pub enum HooksCommand {
    /// Write the hooks of every owned GitLab project to a JSON file
    Export(HooksExportArgs),

    /// Create the hooks from a JSON file on the matching Gitea repositories
    Import(HooksImportArgs),
}

#[derive(Args, Debug)]
pub struct HooksExportArgs {
    /// File to write
    #[arg(short, long, default_value = "hooks.json")]
    pub output: Utf8PathBuf,
}

#[derive(Args, Debug)]
pub struct HooksImportArgs {
    /// File to read
    #[arg(short, long, default_value = "hooks.json")]
    pub input: Utf8PathBuf,

    /// Owner of the Gitea repositories (defaults to the token's user)
    #[arg(long)]
    pub owner: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_mirror_defaults() {
        let cli = Cli::try_parse_from(["repomirror", "mirror"]).unwrap();
        match cli.command {
            Commands::Mirror(args) => {
                assert_eq!(args.source, SourceHost::Gitlab);
                assert_eq!(args.dest, DestinationHost::Github);
                assert!(args.tag.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_overrides_after_subcommand() {
        let cli = Cli::try_parse_from([
            "repomirror",
            "archive",
            "--source",
            "gitea",
            "--work-dir",
            "/srv/archive",
            "-j",
            "2",
            "--allow-failures",
        ])
        .unwrap();

        let global = cli.global();
        assert_eq!(
            global.work_dir.as_deref(),
            Some(camino::Utf8Path::new("/srv/archive"))
        );
        assert_eq!(global.concurrency, Some(2));
        assert!(global.allow_failures);
        assert!(matches!(
            cli.command,
            Commands::Archive(ArchiveArgs {
                source: SourceHost::Gitea
            })
        ));
    }

    #[test]
    fn test_unsupported_destination_rejected() {
        assert!(Cli::try_parse_from(["repomirror", "mirror", "--dest", "bitbucket"]).is_err());
    }

    #[test]
    fn test_gitlab_destination_accepted() {
        let cli =
            Cli::try_parse_from(["repomirror", "mirror", "--source", "gitea", "--dest", "gitlab"])
                .unwrap();
        match cli.command {
            Commands::Mirror(args) => {
                assert_eq!(args.source, SourceHost::Gitea);
                assert_eq!(ProviderKind::from(args.dest), ProviderKind::GitLab);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["repomirror", "publish-local", "--dest", "gitlab"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::PublishLocal(PublishLocalArgs {
                dest: DestinationHost::Gitlab
            })
        ));
    }

    #[test]
    fn test_provider_mapping() {
        assert_eq!(ProviderKind::from(SourceHost::Gitlab), ProviderKind::GitLab);
        assert_eq!(ProviderKind::from(DestinationHost::Gitea), ProviderKind::Gitea);
    }

    #[test]
    fn test_hooks_subcommands() {
        let cli = Cli::try_parse_from(["repomirror", "hooks", "export"]).unwrap();
        match cli.command {
            Commands::Hooks(HooksArgs {
                command: HooksCommand::Export(args),
            }) => assert_eq!(args.output, "hooks.json"),
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from([
            "repomirror",
            "hooks",
            "import",
            "--input",
            "/tmp/exported.json",
            "--owner",
            "dave",
        ])
        .unwrap();
        match cli.command {
            Commands::Hooks(HooksArgs {
                command: HooksCommand::Import(args),
            }) => {
                assert_eq!(args.input, "/tmp/exported.json");
                assert_eq!(args.owner.as_deref(), Some("dave"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
