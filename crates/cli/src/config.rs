use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use fileproviders_core::{FileProvider, FilesystemProvider, ObjectStorageProvider};

const CONFIG_FILE: &str = "fileproviders.toml";
const DEFAULT_BIND: &str = "127.0.0.1:5000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration: Option<MigrationConfig>,
    #[serde(default)]
    pub web: WebConfig,
}

/// Backend selection; each variant carries its single configuration string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "filesystem")]
    Filesystem { root_folder: String },
    #[serde(rename = "object_storage")]
    ObjectStorage { connection_string: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationConfig {
    #[serde(default = "default_containers")]
    pub containers: Vec<String>,
    pub source: ProviderConfig,
    pub target: ProviderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_containers() -> Vec<String> {
    vec!["Images".to_string(), "Settings".to_string()]
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_max_upload_bytes() -> usize {
    fileproviders_web::DEFAULT_MAX_UPLOAD_BYTES
}

impl ProviderConfig {
    pub fn open(&self) -> Result<Arc<dyn FileProvider>> {
        match self {
            ProviderConfig::Filesystem { root_folder } => Ok(Arc::new(
                FilesystemProvider::new(root_folder)
                    .with_context(|| format!("cannot use root folder {root_folder}"))?,
            )),
            ProviderConfig::ObjectStorage { connection_string } => Ok(Arc::new(
                ObjectStorageProvider::from_connection_string(connection_string)
                    .context("cannot use object storage connection string")?,
            )),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ProviderConfig::Filesystem { root_folder } => format!("filesystem ({root_folder})"),
            ProviderConfig::ObjectStorage { .. } => "object storage".to_string(),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fileproviders")
            .join(CONFIG_FILE)
    }

    /// `--config` when given, the per-user config file otherwise.
    pub fn resolve_path(path: Option<&Path>) -> PathBuf {
        path.map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path)
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_path(path);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("config not found at {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = Self::resolve_path(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(path)
    }

    pub fn open_provider(&self) -> Result<Arc<dyn FileProvider>> {
        self.provider.open()
    }
}
