use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::provider::{FileProvider, FileRecord};

/// Progress notifications emitted while a migration runs.
#[derive(Debug)]
pub enum MigrationEvent<'a> {
    /// Target container was cleared and the source listed.
    ContainerStarted { container: &'a str, files: usize },
    FileCopied {
        container: &'a str,
        file: &'a FileRecord,
    },
    ContainerFinished { container: &'a str, copied: u64 },
}

#[derive(Debug, Clone, Default)]
pub struct MigrationReport {
    pub containers: Vec<ContainerReport>,
}

#[derive(Debug, Clone)]
pub struct ContainerReport {
    pub name: String,
    pub files_copied: u64,
}

impl MigrationReport {
    pub fn total_files(&self) -> u64 {
        self.containers.iter().map(|c| c.files_copied).sum()
    }
}

/// Copies whole containers from one provider to another.
///
/// Containers are processed in order and files one at a time. Each target
/// container is cleared first, and files are written with overwriting
/// disabled. A failure stops the run and leaves the target as it is.
pub struct Migrator {
    source: Arc<dyn FileProvider>,
    target: Arc<dyn FileProvider>,
}

impl Migrator {
    pub fn new(source: Arc<dyn FileProvider>, target: Arc<dyn FileProvider>) -> Self {
        Self { source, target }
    }

    pub async fn run(&self, containers: &[String]) -> Result<MigrationReport> {
        self.run_with(containers, |_| {}).await
    }

    pub async fn run_with<F>(
        &self,
        containers: &[String],
        mut on_event: F,
    ) -> Result<MigrationReport>
    where
        F: FnMut(MigrationEvent<'_>),
    {
        let mut report = MigrationReport::default();
        for container in containers {
            let copied = self.migrate_container(container, &mut on_event).await?;
            report.containers.push(ContainerReport {
                name: container.clone(),
                files_copied: copied,
            });
        }
        info!(
            containers = report.containers.len(),
            files = report.total_files(),
            "Migration complete"
        );
        Ok(report)
    }

    async fn migrate_container<F>(&self, container: &str, on_event: &mut F) -> Result<u64>
    where
        F: FnMut(MigrationEvent<'_>),
    {
        self.target
            .clear_container(container)
            .await
            .with_context(|| format!("failed to clear target container {container}"))?;

        let files = self
            .source
            .list_files(container)
            .await
            .with_context(|| format!("failed to list source container {container}"))?;
        info!(container = %container, files = files.len(), "Migrating container");
        on_event(MigrationEvent::ContainerStarted {
            container,
            files: files.len(),
        });

        let mut copied = 0u64;
        for file in &files {
            let path = file.relative_path();
            let data = self
                .source
                .read_file(container, path)
                .await
                .with_context(|| format!("failed to read {container}/{path} from source"))?;
            self.target
                .write_file(container, path, &data, false)
                .await
                .with_context(|| format!("failed to write {container}/{path} to target"))?;
            debug!(container = %container, path = %path, bytes = data.len(), "Copied file");
            copied += 1;
            on_event(MigrationEvent::FileCopied { container, file });
        }

        on_event(MigrationEvent::ContainerFinished { container, copied });
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::error::{ErrorKind, ProviderError};
    use crate::provider::filesystem::FilesystemProvider;

    struct Fixture {
        source: Arc<FilesystemProvider>,
        target: Arc<FilesystemProvider>,
        _source_dir: tempfile::TempDir,
        _target_dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let source_dir = tempfile::tempdir().unwrap();
        let target_dir = tempfile::tempdir().unwrap();
        Fixture {
            source: Arc::new(FilesystemProvider::new(source_dir.path()).unwrap()),
            target: Arc::new(FilesystemProvider::new(target_dir.path()).unwrap()),
            _source_dir: source_dir,
            _target_dir: target_dir,
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn copies_every_container_and_replaces_target_contents() {
        let fx = fixture();
        fx.source.write_file("Images", "a.png", b"a", false).await.unwrap();
        fx.source
            .write_file("Images", "2024/b.png", b"b", false)
            .await
            .unwrap();
        fx.source
            .write_file("Settings", "app.json", b"{}", false)
            .await
            .unwrap();
        fx.target
            .write_file("Images", "stale.png", b"old", false)
            .await
            .unwrap();
        fx.target
            .write_file("Settings", "leftover.txt", b"old", false)
            .await
            .unwrap();

        let migrator = Migrator::new(fx.source.clone(), fx.target.clone());
        let report = migrator.run(&names(&["Images", "Settings"])).await.unwrap();

        assert_eq!(report.total_files(), 3);
        assert_eq!(report.containers[0].name, "Images");
        assert_eq!(report.containers[0].files_copied, 2);

        let images: HashSet<_> = fx
            .target
            .list_files("Images")
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.relative_path().to_string())
            .collect();
        assert_eq!(images, HashSet::from(["a.png".to_string(), "2024/b.png".to_string()]));
        assert_eq!(
            fx.target.read_file("Images", "2024/b.png").await.unwrap(),
            b"b"
        );
        assert_eq!(
            fx.target.read_file("Settings", "app.json").await.unwrap(),
            b"{}"
        );
    }

    #[tokio::test]
    async fn cleared_target_lists_no_files() {
        let fx = fixture();
        fx.target.write_file("Images", "x.png", b"x", false).await.unwrap();
        std::fs::create_dir(fx.source.root().join("Images")).unwrap();

        let migrator = Migrator::new(fx.source.clone(), fx.target.clone());
        let report = migrator.run(&names(&["Images"])).await.unwrap();

        assert_eq!(report.total_files(), 0);
        assert!(fx.target.list_files("Images").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_source_container_aborts_after_earlier_containers() {
        let fx = fixture();
        fx.source.write_file("Images", "a.png", b"a", false).await.unwrap();
        fx.target.write_file("Images", "old.png", b"o", false).await.unwrap();
        fx.target.write_file("Missing", "keep.txt", b"k", false).await.unwrap();

        let migrator = Migrator::new(fx.source.clone(), fx.target.clone());
        let err = migrator
            .run(&names(&["Images", "Missing"]))
            .await
            .unwrap_err();

        let provider_err = err.downcast_ref::<ProviderError>().unwrap();
        assert_eq!(provider_err.kind(), ErrorKind::NotFound);
        // First container is done, second was cleared before the failure.
        assert_eq!(fx.target.list_files("Images").await.unwrap().len(), 1);
        assert!(fx.target.list_files("Missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn emits_progress_events() {
        let fx = fixture();
        fx.source.write_file("Images", "a.png", b"a", false).await.unwrap();
        fx.source.write_file("Images", "b.png", b"b", false).await.unwrap();
        std::fs::create_dir(fx.target.root().join("Images")).unwrap();

        let migrator = Migrator::new(fx.source.clone(), fx.target.clone());
        let mut started = None;
        let mut copied = 0;
        let mut finished = None;
        migrator
            .run_with(&names(&["Images"]), |event| match event {
                MigrationEvent::ContainerStarted { files, .. } => started = Some(files),
                MigrationEvent::FileCopied { .. } => copied += 1,
                MigrationEvent::ContainerFinished { copied: n, .. } => finished = Some(n),
            })
            .await
            .unwrap();

        assert_eq!(started, Some(2));
        assert_eq!(copied, 2);
        assert_eq!(finished, Some(2));
    }
}
