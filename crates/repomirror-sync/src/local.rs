//! Local clone state under the working root
//!
//! A directory `<root>/<name>` is the only record that a project has been
//! cloned. Nothing is cached between calls: a directory removed by hand is
//! indistinguishable from a project that was never cloned and is simply
//! cloned again.

use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

/// Suffix of the description sidecar written next to each clone
const DESCRIPTION_SUFFIX: &str = "txt";

/// Working root holding one directory per cloned project
#[derive(Debug, Clone)]
pub struct LocalCloneState {
    root: Utf8PathBuf,
}

impl LocalCloneState {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Create the working root if it does not exist yet
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    /// Directory for `name`. Rejects names that would escape the root.
    pub fn path_for(&self, name: &str) -> Result<Utf8PathBuf> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(Error::invalid_project_name(name));
        }
        Ok(self.root.join(name))
    }

    /// Whether a clone directory exists for `name`
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.is_dir()).unwrap_or(false)
    }

    /// Remove whatever a failed clone left behind. A missing directory is fine.
    pub async fn remove_partial(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => {
                debug!("Removed partial clone: {}", path);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!("Could not remove partial clone {}: {}", path, e);
                Err(e.into())
            }
        }
    }

    /// `<root>/<name>.txt`
    pub fn description_path(&self, name: &str) -> Result<Utf8PathBuf> {
        self.path_for(name)?;
        Ok(self.root.join(format!("{}.{}", name, DESCRIPTION_SUFFIX)))
    }

    pub async fn write_description(&self, name: &str, description: &str) -> Result<()> {
        let path = self.description_path(name)?;
        tokio::fs::write(&path, description).await?;
        Ok(())
    }

    /// Description sidecar content, `None` when no sidecar was written
    pub async fn read_description(&self, name: &str) -> Result<Option<String>> {
        let path = self.description_path(name)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of all clone directories, sorted
    pub async fn list_clones(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => warn!("Skipping non UTF-8 directory: {:?}", raw),
            }
        }

        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state(dir: &TempDir) -> LocalCloneState {
        LocalCloneState::new(Utf8Path::from_path(dir.path()).unwrap())
    }

    #[test]
    fn test_path_for_rejects_escaping_names() {
        let local = LocalCloneState::new("tmp");
        assert_eq!(local.path_for("tool").unwrap(), "tmp/tool");
        for bad in ["", ".", "..", "a/b", "..\\x"] {
            assert!(
                matches!(local.path_for(bad), Err(Error::InvalidProjectName { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_description_path_keeps_dotted_names() {
        let local = LocalCloneState::new("tmp");
        assert_eq!(local.description_path("tool").unwrap(), "tmp/tool.txt");
        assert_eq!(local.description_path("site.io").unwrap(), "tmp/site.io.txt");
    }

    #[tokio::test]
    async fn test_exists_and_remove_partial() {
        let dir = TempDir::new().unwrap();
        let local = state(&dir);

        assert!(!local.exists("tool"));
        std::fs::create_dir_all(dir.path().join("tool/.git")).unwrap();
        assert!(local.exists("tool"));

        local.remove_partial("tool").await.unwrap();
        assert!(!local.exists("tool"));

        // Nothing left to remove
        local.remove_partial("tool").await.unwrap();
    }

    #[tokio::test]
    async fn test_description_roundtrip_and_listing() {
        let dir = TempDir::new().unwrap();
        let local = state(&dir);
        std::fs::create_dir(dir.path().join("beta")).unwrap();
        std::fs::create_dir(dir.path().join("alpha")).unwrap();

        local.write_description("alpha", "First project").await.unwrap();

        assert_eq!(
            local.read_description("alpha").await.unwrap().as_deref(),
            Some("First project")
        );
        assert_eq!(local.read_description("beta").await.unwrap(), None);
        // Sidecar files are not clones
        assert_eq!(local.list_clones().await.unwrap(), vec!["alpha", "beta"]);
    }
}
