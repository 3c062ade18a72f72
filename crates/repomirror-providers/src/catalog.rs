//! Project catalogs built from paginated provider listings

use crate::error::Result;
use crate::traits::ProjectHost;
use repomirror_core::Project;
use std::collections::HashMap;
use tracing::{debug, info};

/// Which projects of a provider take part in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilityFilter {
    /// Every project (destination catalogs)
    All,

    /// Download-for-archival: public projects are skipped
    Archival,

    /// Publish-to-public-host: only public, non-empty projects carrying `tag`
    Publish { tag: String },
}

impl EligibilityFilter {
    pub fn publish(tag: impl Into<String>) -> Self {
        Self::Publish { tag: tag.into() }
    }

    /// Whether `project` is eligible. Independent of how it was fetched.
    pub fn admits(&self, project: &Project) -> bool {
        match self {
            EligibilityFilter::All => true,
            EligibilityFilter::Archival => !project.visibility.is_public(),
            EligibilityFilter::Publish { tag } => {
                project.visibility.is_public() && project.has_tag(tag) && !project.empty
            }
        }
    }
}

/// Projects of one provider keyed by name, in listing order.
///
/// The first project seen under a name wins; later duplicates are dropped.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    projects: Vec<Project>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a project unless one with the same name is already present.
    /// Returns `false` for a duplicate.
    pub fn insert(&mut self, project: Project) -> bool {
        if self.index.contains_key(&project.name) {
            return false;
        }
        self.index.insert(project.name.clone(), self.projects.len());
        self.projects.push(project);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Project> {
        self.index.get(name).map(|&i| &self.projects[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.projects.iter().map(|p| p.name.as_str())
    }
}

impl FromIterator<Project> for Catalog {
    fn from_iter<I: IntoIterator<Item = Project>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for project in iter {
            catalog.insert(project);
        }
        catalog
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Project;
    type IntoIter = std::slice::Iter<'a, Project>;

    fn into_iter(self) -> Self::IntoIter {
        self.projects.iter()
    }
}

/// Page through `host` until an empty page and collect the eligible projects.
///
/// Pages are not retried; the first failing page aborts the listing.
pub async fn list_owned_projects(
    host: &dyn ProjectHost,
    page_size: u32,
    filter: &EligibilityFilter,
) -> Result<Catalog> {
    let mut catalog = Catalog::new();
    let mut page = host.first_page();
    let mut seen = 0usize;

    loop {
        let projects = host.list_page(page, page_size).await?;
        if projects.is_empty() {
            break;
        }

        debug!(
            "{} page {}: {} projects",
            host.name(),
            page,
            projects.len()
        );
        seen += projects.len();

        for project in projects {
            if !filter.admits(&project) {
                continue;
            }
            let name = project.name.clone();
            if !catalog.insert(project) {
                debug!("Ignoring duplicate {} project: {}", host.name(), name);
            }
        }

        page += 1;
    }

    info!(
        "{}: {} projects listed, {} eligible",
        host.name(),
        seen,
        catalog.len()
    );
    Ok(catalog)
}
