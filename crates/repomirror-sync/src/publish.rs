//! Publishing local clones
//!
//! Turns the clone directories of an archive run into a catalog that the
//! reconciler can push to a destination. Each project's clone URL is its own
//! directory, so the push happens from the existing clone without any fetch.

use crate::error::Result;
use crate::local::LocalCloneState;
use repomirror_core::{Project, Visibility};
use repomirror_providers::Catalog;
use tracing::{debug, info};

/// Catalog of every clone directory under the work root, with descriptions
/// read from the `<name>.txt` sidecars
pub async fn local_catalog(local: &LocalCloneState) -> Result<Catalog> {
    let mut catalog = Catalog::new();

    for name in local.list_clones().await? {
        let path = local.path_for(&name)?;
        let description = local.read_description(&name).await?.unwrap_or_default();
        debug!("Found local clone: {}", path);

        let project = Project::new(name.as_str(), path.as_str(), Visibility::Private)
            .with_description(description.trim());
        catalog.insert(project);
    }

    info!("{} local clones in {}", catalog.len(), local.root());
    Ok(catalog)
}
