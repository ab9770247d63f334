//! Local filesystem storage for uploaded content files.

use std::{
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use bytes::Bytes;
use tokio::fs;
use tracing::warn;

use crate::{config, content::sanitize_file_name};

pub use std::io::Error;

/// Length of a file hash prefix used in stored file names.
const HASH_PREFIX_LENGTH: usize = 8;

/// Per-process counter that separates files stored within the same millisecond.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Content file storage located in a configured upload directory.
pub struct LocalStorage<'a> {
    config: &'a config::Storage,
}

impl<'a> LocalStorage<'a> {
    /// Create new [`LocalStorage`] from the provided [`Storage`] configuration.
    ///
    /// [`Storage`]: config::Storage
    pub fn new(config: &'a config::Storage) -> LocalStorage<'a> {
        LocalStorage { config }
    }

    /// Store the provided file contents and return a path to the stored file.
    ///
    /// Stored file names consist of the current timestamp, a sequence number,
    /// file hash prefix and a sanitized original file name, so that two uploads
    /// never share a path.
    pub async fn store(
        &self,
        file_hash: &str,
        file_name: &str,
        data: &[u8],
    ) -> Result<PathBuf, Error> {
        fs::create_dir_all(&self.config.upload_dir).await?;

        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();

        let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let prefix = &file_hash[..file_hash.len().min(HASH_PREFIX_LENGTH)];

        let path = self.config.upload_dir.join(format!(
            "{millis}-{sequence}-{prefix}-{}",
            sanitize_file_name(file_name)
        ));

        fs::write(&path, data).await?;

        Ok(path)
    }

    /// Read contents of a previously stored file.
    pub async fn read(&self, path: &Path) -> Result<Bytes, Error> {
        fs::read(path).await.map(Bytes::from)
    }

    /// Remove a previously stored file.
    ///
    /// Failures are logged and otherwise ignored.
    pub async fn remove(&self, path: &Path) {
        if let Err(err) = fs::remove_file(path).await {
            warn!(path = %path.display(), %err, "unable to remove stored file");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config;

    use super::LocalStorage;

    #[tokio::test]
    async fn store_read_remove() {
        let dir = tempfile::tempdir().expect("unable to create temp dir");

        let config = config::Storage {
            upload_dir: dir.path().join("nested"),
            ..Default::default()
        };

        let storage = LocalStorage::new(&config);

        let path = storage
            .store("abcdef0123456789", "my file.txt", b"Hello, world")
            .await
            .expect("unable to store file");

        assert!(path.starts_with(dir.path().join("nested")));

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with("-abcdef01-my_file.txt"));

        let data = storage.read(&path).await.expect("unable to read file");
        assert_eq!(&data[..], b"Hello, world");

        storage.remove(&path).await;
        assert!(storage.read(&path).await.is_err());
    }

    #[tokio::test]
    async fn same_file_gets_distinct_paths() {
        let dir = tempfile::tempdir().expect("unable to create temp dir");

        let config = config::Storage {
            upload_dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let storage = LocalStorage::new(&config);

        let (first, second) = tokio::join!(
            storage.store("abcdef0123456789", "a.txt", b"Hello"),
            storage.store("abcdef0123456789", "a.txt", b"Hello"),
        );

        let first = first.expect("unable to store file");
        let second = second.expect("unable to store file");

        assert_ne!(first, second);

        storage.remove(&first).await;
        assert_eq!(&storage.read(&second).await.unwrap()[..], b"Hello");
    }
}
