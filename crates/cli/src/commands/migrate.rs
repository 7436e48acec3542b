use std::path::Path;

use anyhow::Result;
use clap::Args;
use console::style;
use dialoguer::Confirm;
use indicatif::ProgressBar;
use tracing::info;

use fileproviders_core::Migrator;
use fileproviders_core::migration::MigrationEvent;

use crate::config::AppConfig;
use crate::progress;

#[derive(Args)]
pub struct MigrateArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

pub async fn run(args: MigrateArgs, config_path: Option<&Path>) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let migration = config.migration.ok_or_else(|| {
        anyhow::anyhow!("no [migration] section with source and target in the config")
    })?;

    let source = migration.source.open()?;
    let target = migration.target.open()?;

    println!(
        "Copying {} from {} to {}.",
        migration.containers.join(", "),
        migration.source.describe(),
        migration.target.describe()
    );
    println!(
        "{}",
        style("Continuing will delete all files in the target containers.")
            .yellow()
            .bold()
    );
    if !args.yes
        && !Confirm::new()
            .with_prompt("Do you want to continue?")
            .default(false)
            .interact()?
    {
        println!("Exiting");
        return Ok(());
    }

    let migrator = Migrator::new(source, target);
    let mut bar: Option<ProgressBar> = None;
    let report = migrator
        .run_with(&migration.containers, |event| match event {
            MigrationEvent::ContainerStarted { container, files } => {
                bar = Some(progress::container_progress(container, files as u64));
            }
            MigrationEvent::FileCopied { file, .. } => {
                if let Some(pb) = &bar {
                    pb.set_message(file.relative_path().to_string());
                    pb.inc(1);
                }
            }
            MigrationEvent::ContainerFinished { copied, .. } => {
                if let Some(pb) = bar.take() {
                    pb.finish_with_message(format!("{copied} files"));
                }
            }
        })
        .await;

    if let Some(pb) = bar.take() {
        pb.abandon_with_message("failed");
    }
    let report = report?;

    info!(files = report.total_files(), "Migration finished");
    println!("Done copying {} files.", report.total_files());
    Ok(())
}
