use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use dialoguer::Confirm;
use tokio::io::AsyncWriteExt;

use crate::config::AppConfig;
use crate::progress;

#[derive(Args)]
pub struct FilesArgs {
    #[command(subcommand)]
    action: FilesAction,
}

#[derive(Subcommand)]
enum FilesAction {
    /// List every file in a root container
    List {
        /// Root container
        container: String,
    },
    /// Print or save a file
    Get {
        container: String,
        /// Path relative to the container
        path: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Store a local file
    Put {
        container: String,
        /// Destination path relative to the container
        path: String,
        /// Local file to upload
        file: PathBuf,
        /// Replace the file if it already exists
        #[arg(long)]
        overwrite: bool,
    },
    /// Delete a file
    Rm { container: String, path: String },
    /// Delete every file and folder in a root container
    Clear {
        container: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run(args: FilesArgs, config_path: Option<&Path>) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let provider = config.open_provider()?;

    match args.action {
        FilesAction::List { container } => {
            let mut files = provider.list_files(&container).await?;
            if files.is_empty() {
                println!("No files in {container}.");
                return Ok(());
            }
            files.sort_by(|a, b| a.relative_path().cmp(b.relative_path()));
            for file in &files {
                println!("{}", file.relative_path());
            }
        }
        FilesAction::Get {
            container,
            path,
            output,
        } => {
            let data = provider.read_file(&container, &path).await?;
            match output {
                Some(out) => {
                    tokio::fs::write(&out, &data)
                        .await
                        .with_context(|| format!("failed to write {}", out.display()))?;
                    println!("Saved {} bytes to {}", data.len(), out.display());
                }
                None => {
                    let mut stdout = tokio::io::stdout();
                    stdout.write_all(&data).await?;
                    stdout.flush().await?;
                }
            }
        }
        FilesAction::Put {
            container,
            path,
            file,
            overwrite,
        } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            provider
                .write_file(&container, &path, &data, overwrite)
                .await?;
            println!("Stored {container}/{path} ({} bytes)", data.len());
        }
        FilesAction::Rm { container, path } => {
            provider.delete_file(&container, &path).await?;
            println!("Deleted {container}/{path}");
        }
        FilesAction::Clear { container, yes } => {
            if !yes
                && !Confirm::new()
                    .with_prompt(format!("Delete everything in {container}?"))
                    .default(false)
                    .interact()?
            {
                println!("Exiting");
                return Ok(());
            }
            let spinner = progress::spinner(format!("Clearing {container}..."));
            provider.clear_container(&container).await?;
            spinner.finish_with_message(format!("Cleared {container}"));
        }
    }
    Ok(())
}
