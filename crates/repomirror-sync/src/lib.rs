//! # repomirror-sync
//!
//! The mirroring engine: reconciles a source catalog against a destination
//! catalog and the local working root, then clones, fetches and pushes each
//! project through a bounded pool.
//!
//! - [`AgentSession`] owns an isolated `ssh-agent` for the length of a run
//! - [`GitTransport`] runs clone/fetch/merge/push with the agent socket passed
//!   explicitly to each child process
//! - [`LocalCloneState`] maps project names to directories under the work root
//! - [`WorkPool`] runs independent tasks with a concurrency ceiling and
//!   collects every outcome
//! - [`Reconciler`] decides and executes the per-project [`MirrorAction`]s
//!
//! Mirrors are force-pushed by default: the destination branch is replaced by
//! the source branch on every run, and commits made only on the destination
//! are lost. See [`repomirror_core::PushPolicy`].
//!
//! # Examples
//!
//! ```no_run
//! use repomirror_providers::{Catalog, EligibilityFilter};
//! use repomirror_sync::{AgentOptions, AgentSession, GitCli, LocalCloneState, ReconcileOptions, Reconciler};
//! use camino::Utf8Path;
//! use std::sync::Arc;
//!
//! # async fn example(source: Catalog) -> Result<(), Box<dyn std::error::Error>> {
//! let session = AgentSession::open(&AgentOptions::default()).await?;
//! session.add_identity(Utf8Path::new("/home/dave/.ssh/id_mirror")).await?;
//!
//! let reconciler = Reconciler::new(
//!     Arc::new(GitCli::default()),
//!     LocalCloneState::new("tmp"),
//!     ReconcileOptions::default(),
//! );
//! let report = reconciler.run(&source, None, session.socket()).await?;
//! println!("{} attempted, {} failed", report.attempted(), report.failures().len());
//!
//! session.close()?;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod error;
pub mod git;
pub mod local;
pub mod pool;
pub mod publish;
pub mod reconciler;

pub use agent::{AgentOptions, AgentSession, AgentSocket};
pub use error::{Error, Result};
pub use git::{GitCli, GitTransport};
pub use local::LocalCloneState;
pub use pool::{Outcome, WorkPool};
pub use publish::local_catalog;
pub use reconciler::{
    DestinationSide, MirrorAction, ProjectOutcome, ReconcileOptions, ReconcileReport, Reconciler,
};
