//! # repomirror-core
//!
//! Core library for repomirror providing:
//! - Credential file parsing (`creds.json` / `creds.yaml`)
//! - Run settings with defaults (work directory, concurrency, push policy)
//! - The provider-neutral `Project` snapshot shared by every crate

pub mod config;
pub mod error;
pub mod types;

pub use config::{Credentials, MirrorConfig, Settings};
pub use error::{Error, Result};
pub use types::{Project, PushPolicy, Visibility};
