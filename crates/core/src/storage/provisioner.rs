//! Bucket directory provisioner.

use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::error::ProvisionError;
use crate::config::OutputConfig;

/// Directory created under the home directory to hold every bucket.
pub const APP_NAMESPACE: &str = "aimakeme";

/// Resolves bucket names to directories and creates them on demand.
///
/// Provisioning is idempotent: calling [`provision`](Self::provision) for a
/// bucket that already exists returns the same path without error, and two
/// callers racing to create the same tree both succeed.
#[derive(Debug, Clone)]
pub struct DirectoryProvisioner {
    root: PathBuf,
}

impl DirectoryProvisioner {
    /// Creates a provisioner rooted at an explicit directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates a provisioner rooted at `<home>/aimakeme`.
    pub fn from_home() -> Result<Self, ProvisionError> {
        let home = std::env::home_dir()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ProvisionError::HomeDirUnavailable)?;
        Ok(Self::new(home.join(APP_NAMESPACE)))
    }

    /// Uses the configured root when set, the home directory otherwise.
    pub fn from_config(config: &OutputConfig) -> Result<Self, ProvisionError> {
        match &config.root {
            Some(root) => Ok(Self::new(root.clone())),
            None => Self::from_home(),
        }
    }

    /// Returns the directory that holds every bucket.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves the directory for a bucket without touching the filesystem.
    ///
    /// Buckets may be nested (`"cards/2024"`) but must stay below the root.
    pub fn bucket_path(&self, bucket: &str) -> Result<PathBuf, ProvisionError> {
        let relative = Path::new(bucket);
        let valid = !bucket.trim().is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));

        if !valid {
            return Err(ProvisionError::InvalidBucket {
                bucket: bucket.to_string(),
            });
        }

        Ok(self.root.join(relative))
    }

    /// Ensures the bucket directory exists and returns its path.
    pub async fn provision(&self, bucket: &str) -> Result<PathBuf, ProvisionError> {
        let path = self.bucket_path(bucket)?;

        match fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => {
                debug!("Output directory already present: {}", path.display());
                return Ok(path);
            }
            Ok(_) => return Err(ProvisionError::NotADirectory { path }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ProvisionError::CreateFailed { path, source: e }),
        }

        // create_dir_all succeeds when another task created the tree first
        fs::create_dir_all(&path)
            .await
            .map_err(|e| ProvisionError::CreateFailed {
                path: path.clone(),
                source: e,
            })?;

        debug!("Created output directory: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_provision_creates_nested_tree() {
        let temp = TempDir::new().unwrap();
        let provisioner = DirectoryProvisioner::new(temp.path().join("deep/root"));

        let dir = provisioner.provision("default").await.unwrap();
        assert_eq!(dir, temp.path().join("deep/root/default"));
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_provision_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let provisioner = DirectoryProvisioner::new(temp.path());

        let first = provisioner.provision("bucket").await.unwrap();
        let second = provisioner.provision("bucket").await.unwrap();
        assert_eq!(first, second);
        assert!(second.is_dir());
    }

    #[tokio::test]
    async fn test_concurrent_provision_all_succeed() {
        let temp = TempDir::new().unwrap();
        let provisioner = DirectoryProvisioner::new(temp.path().join("root"));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let p = provisioner.clone();
            handles.push(tokio::spawn(async move { p.provision("shared").await }));
        }

        for handle in handles {
            let dir = handle.await.unwrap().unwrap();
            assert_eq!(dir, temp.path().join("root/shared"));
        }
    }

    #[tokio::test]
    async fn test_provision_file_in_the_way() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("taken"), b"not a dir").unwrap();
        let provisioner = DirectoryProvisioner::new(temp.path());

        let result = provisioner.provision("taken").await;
        assert!(matches!(result, Err(ProvisionError::NotADirectory { .. })));
    }

    #[test]
    fn test_bucket_path_allows_nesting() {
        let provisioner = DirectoryProvisioner::new("/images");
        let path = provisioner.bucket_path("cards/2024").unwrap();
        assert_eq!(path, PathBuf::from("/images/cards/2024"));
    }

    #[test]
    fn test_bucket_path_rejects_escapes() {
        let provisioner = DirectoryProvisioner::new("/images");
        for bad in ["", "   ", "..", "../etc", "/abs", "a/../../b", "./x"] {
            assert!(
                matches!(
                    provisioner.bucket_path(bad),
                    Err(ProvisionError::InvalidBucket { .. })
                ),
                "bucket {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_from_config_prefers_explicit_root() {
        let config = OutputConfig {
            root: Some(PathBuf::from("/srv/images")),
        };
        let provisioner = DirectoryProvisioner::from_config(&config).unwrap();
        assert_eq!(provisioner.root(), Path::new("/srv/images"));
    }
}
