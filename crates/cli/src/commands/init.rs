use std::path::Path;

use anyhow::Result;
use clap::Args;
use tracing::info;

use crate::config::{AppConfig, ProviderConfig, WebConfig};

#[derive(Args)]
pub struct InitArgs {
    /// Provider type: filesystem or object-storage
    #[arg(long)]
    provider: String,

    /// Base folder for the filesystem provider (must exist)
    #[arg(long)]
    root_folder: Option<String>,

    /// Connection string for the object storage provider
    #[arg(long)]
    connection_string: Option<String>,

    /// Replace an existing config file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: InitArgs, config_path: Option<&Path>) -> Result<()> {
    let path = AppConfig::resolve_path(config_path);
    if path.exists() && !args.force {
        anyhow::bail!(
            "config already exists at {} (use --force to replace it)",
            path.display()
        );
    }

    let provider = match args.provider.as_str() {
        "filesystem" => {
            let root_folder = args
                .root_folder
                .ok_or_else(|| anyhow::anyhow!("--root-folder required for filesystem provider"))?;
            ProviderConfig::Filesystem { root_folder }
        }
        "object-storage" => {
            let connection_string = args.connection_string.ok_or_else(|| {
                anyhow::anyhow!("--connection-string required for object storage provider")
            })?;
            ProviderConfig::ObjectStorage { connection_string }
        }
        other => anyhow::bail!("unknown provider: {other} (supported: filesystem, object-storage)"),
    };

    // Fail now rather than on first use.
    provider.open()?;

    let config = AppConfig {
        provider,
        migration: None,
        web: WebConfig::default(),
    };
    let saved = config.save(Some(&path))?;

    info!(config_path = %saved.display(), provider = %config.provider.describe(), "Config saved");
    println!("Config written to {}", saved.display());
    Ok(())
}
