use std::collections::HashSet;
use std::path::{Component, MAIN_SEPARATOR, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{FileProvider, FileRecord};
use crate::error::{ProviderError, ProviderResult};

/// Provider backed by a directory tree. Each root container is a
/// subdirectory of the base folder.
#[derive(Debug, Clone)]
pub struct FilesystemProvider {
    root: PathBuf,
}

impl FilesystemProvider {
    /// Fails with `NotFound` unless `path` is an existing directory.
    pub fn new(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let root = path.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(ProviderError::NotFound(format!(
                "root folder {} not found",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn container_path(&self, root_container: &str) -> ProviderResult<PathBuf> {
        if root_container.is_empty() {
            return Err(ProviderError::InvalidArgument(
                "missing root container".to_string(),
            ));
        }
        Ok(self.root.join(normalize_separators(root_container)))
    }

    fn file_path(folder: &Path, path: &str) -> PathBuf {
        folder.join(normalize_separators(path))
    }
}

fn normalize_separators(path: &str) -> String {
    path.replace('\\', &MAIN_SEPARATOR.to_string())
}

async fn ensure_folder(folder: &Path) -> ProviderResult<()> {
    match fs::metadata(folder).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        _ => Err(ProviderError::NotFound(format!(
            "root folder {} not found",
            folder.display()
        ))),
    }
}

async fn ensure_file(file: &Path) -> ProviderResult<()> {
    match fs::metadata(file).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(ProviderError::NotFound(format!(
            "file {} not found",
            file.display()
        ))),
    }
}

/// Express `path` relative to `folder` with forward slashes.
fn relative_key(folder: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(folder).ok()?;
    let segments: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect();
    Some(segments.join("/"))
}

#[async_trait]
impl FileProvider for FilesystemProvider {
    async fn list_files(&self, root_container: &str) -> ProviderResult<Vec<FileRecord>> {
        let folder = self.container_path(root_container)?;
        ensure_folder(&folder).await?;

        let mut files = Vec::new();
        let mut visited = HashSet::new();
        let mut pending = vec![folder.clone()];
        while let Some(dir) = pending.pop() {
            // Symlinked folders may point back up the tree.
            if !visited.insert(fs::canonicalize(&dir).await?) {
                continue;
            }
            let mut read_dir = fs::read_dir(&dir).await?;
            while let Some(entry) = read_dir.next_entry().await? {
                let path = entry.path();
                let mut file_type = entry.file_type().await?;
                if file_type.is_symlink() {
                    // Dangling links are skipped.
                    match fs::metadata(&path).await {
                        Ok(meta) => file_type = meta.file_type(),
                        Err(_) => continue,
                    }
                }
                if file_type.is_dir() {
                    pending.push(path);
                    continue;
                }
                if !file_type.is_file() {
                    continue;
                }
                let Some(relative) = relative_key(&folder, &path) else {
                    continue;
                };
                let name = entry.file_name().to_string_lossy().into_owned();
                files.push(FileRecord::new(
                    name,
                    relative,
                    path.to_string_lossy().into_owned(),
                ));
            }
        }

        debug!(container = %root_container, count = files.len(), "Listed files");
        Ok(files)
    }

    async fn read_file(&self, root_container: &str, path: &str) -> ProviderResult<Vec<u8>> {
        let folder = self.container_path(root_container)?;
        ensure_folder(&folder).await?;
        let file = Self::file_path(&folder, path);
        ensure_file(&file).await?;
        Ok(fs::read(&file).await?)
    }

    async fn write_file(
        &self,
        root_container: &str,
        path: &str,
        data: &[u8],
        overwrite: bool,
    ) -> ProviderResult<()> {
        let folder = self.container_path(root_container)?;
        let file = Self::file_path(&folder, path);
        let parent = file.parent().ok_or_else(|| {
            ProviderError::InvalidArgument(format!(
                "could not get parent folder of {}",
                file.display()
            ))
        })?;
        fs::create_dir_all(parent).await?;

        if !overwrite && fs::try_exists(&file).await? {
            return Err(ProviderError::AlreadyExists(format!(
                "the file {} already exists",
                file.display()
            )));
        }

        fs::write(&file, data).await?;
        debug!(path = %file.display(), bytes = data.len(), "Wrote file");
        Ok(())
    }

    async fn file_exists(&self, root_container: &str, path: &str) -> ProviderResult<bool> {
        let folder = self.container_path(root_container)?;
        let file = Self::file_path(&folder, path);
        Ok(fs::metadata(&file).await.is_ok_and(|m| m.is_file()))
    }

    async fn delete_file(&self, root_container: &str, path: &str) -> ProviderResult<()> {
        let folder = self.container_path(root_container)?;
        ensure_folder(&folder).await?;
        let file = Self::file_path(&folder, path);
        ensure_file(&file).await?;
        fs::remove_file(&file).await?;
        debug!(path = %file.display(), "Deleted file");
        Ok(())
    }

    async fn clear_container(&self, root_container: &str) -> ProviderResult<()> {
        let folder = self.container_path(root_container)?;
        ensure_folder(&folder).await?;

        let mut read_dir = fs::read_dir(&folder).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                fs::remove_dir_all(&path).await?;
            } else {
                fs::remove_file(&path).await?;
            }
        }

        debug!(container = %root_container, "Cleared container");
        Ok(())
    }
}
