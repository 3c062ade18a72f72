//! Provider-neutral types shared by the catalog and the sync engine

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Repository visibility on a hosting provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// Map a boolean `private` flag (Gitea, GitHub) to a visibility
    pub fn from_private(private: bool) -> Self {
        if private {
            Self::Private
        } else {
            Self::Public
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// A repository snapshot on one provider.
///
/// `name` is the only identity shared across providers: a source project and
/// a destination project with the same name are treated as the same mirror,
/// with no check that they are actually related.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Repository name, unique per provider
    pub name: String,

    /// Authenticated transport URL (SSH) used for clone, fetch and push
    pub clone_url: String,

    /// Free-form description, empty when the provider has none
    #[serde(default)]
    pub description: String,

    /// Web page of the project on its provider
    #[serde(default)]
    pub homepage_url: String,

    pub visibility: Visibility,

    /// Topics / tags used for mirror eligibility
    #[serde(default)]
    pub tags: BTreeSet<String>,

    /// Repository has no commits yet
    #[serde(default)]
    pub empty: bool,
}

impl Project {
    /// Create a project with no description, homepage or tags
    pub fn new(
        name: impl Into<String>,
        clone_url: impl Into<String>,
        visibility: Visibility,
    ) -> Self {
        Self {
            name: name.into(),
            clone_url: clone_url.into(),
            description: String::new(),
            homepage_url: String::new(),
            visibility,
            tags: BTreeSet::new(),
            empty: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_homepage(mut self, homepage_url: impl Into<String>) -> Self {
        self.homepage_url = homepage_url.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// How the destination branch is updated.
///
/// `Force` overwrites destination history with the source branch. This is
/// destructive on purpose: the source provider is the source of truth and any
/// commits made directly on the destination are lost on the next run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PushPolicy {
    #[default]
    Force,
    FastForward,
}

impl PushPolicy {
    pub fn is_force(&self) -> bool {
        matches!(self, Self::Force)
    }
}

impl std::fmt::Display for PushPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushPolicy::Force => write!(f, "force"),
            PushPolicy::FastForward => write!(f, "fast-forward"),
        }
    }
}
