//! Secrets repository
//!
//! Looks up product secrets by key.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Repository trait for product secrets
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Reads a secret value
    ///
    /// Returns `None` when the product has no such secret.
    async fn get(&self, product: &str, key: &str) -> Result<Option<Vec<u8>>>;
}

/// Secrets mounted as files at `<root>/<product>/<key>`
pub struct MountedSecretStore {
    root: PathBuf,
}

impl MountedSecretStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SecretStore for MountedSecretStore {
    async fn get(&self, product: &str, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.root.join(product).join(key);

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read secret {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_mounted_secret() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("shop")).unwrap();
        std::fs::write(dir.path().join("shop/log.path.template"), b"https://logs/{}").unwrap();

        let store = MountedSecretStore::new(dir.path());
        let value = store.get("shop", "log.path.template").await.unwrap();
        assert_eq!(value.as_deref(), Some(&b"https://logs/{}"[..]));
    }

    #[tokio::test]
    async fn test_missing_secret_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = MountedSecretStore::new(dir.path());

        assert_eq!(store.get("shop", "log.path.template").await.unwrap(), None);
    }
}
