pub mod filesystem;
pub mod object_storage;

use async_trait::async_trait;

use crate::error::ProviderResult;

/// A file as seen through a [`FileProvider`] listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    name: String,
    relative_path: String,
    locator: String,
}

impl FileRecord {
    pub fn new(
        name: impl Into<String>,
        relative_path: impl Into<String>,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            locator: locator.into(),
        }
    }

    /// Build a record from a slash-separated key, using the key as locator.
    pub fn from_key(key: &str) -> Self {
        let name = key.rsplit('/').next().unwrap_or(key);
        Self::new(name, key, key)
    }

    /// Final path segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path relative to the root container, always `/`-separated.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    /// Backend-specific location (absolute path or object key).
    pub fn locator(&self) -> &str {
        &self.locator
    }
}

/// Storage operations scoped by a root container.
///
/// The two implementations intentionally disagree on missing containers and
/// files: [`filesystem::FilesystemProvider`] fails with `NotFound`, while
/// [`object_storage::ObjectStorageProvider`] creates buckets on access and
/// treats deleting an absent object as success.
#[async_trait]
pub trait FileProvider: Send + Sync {
    /// All files in the container, recursively. Order is backend-defined.
    async fn list_files(&self, root_container: &str) -> ProviderResult<Vec<FileRecord>>;

    async fn read_file(&self, root_container: &str, path: &str) -> ProviderResult<Vec<u8>>;

    /// Store `data` at `path`. Fails with `AlreadyExists` when a file is
    /// present and `overwrite` is false.
    async fn write_file(
        &self,
        root_container: &str,
        path: &str,
        data: &[u8],
        overwrite: bool,
    ) -> ProviderResult<()>;

    async fn file_exists(&self, root_container: &str, path: &str) -> ProviderResult<bool>;

    async fn delete_file(&self, root_container: &str, path: &str) -> ProviderResult<()>;

    /// Remove every file and subdirectory, keeping the container itself.
    async fn clear_container(&self, root_container: &str) -> ProviderResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_from_nested_key() {
        let record = FileRecord::from_key("2024/photos/cat.png");
        assert_eq!(record.name(), "cat.png");
        assert_eq!(record.relative_path(), "2024/photos/cat.png");
        assert_eq!(record.locator(), "2024/photos/cat.png");
    }

    #[test]
    fn record_from_flat_key() {
        let record = FileRecord::from_key("cat.png");
        assert_eq!(record.name(), "cat.png");
    }
}
