mod commands;
mod config;
mod progress;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "fileproviders",
    version,
    about = "Store, serve and migrate files on the filesystem or object storage"
)]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the per-user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        commands::Command::Init(args) => commands::init::run(args, config).await,
        commands::Command::Files(args) => commands::files::run(args, config).await,
        commands::Command::Serve(args) => commands::serve::run(args, config).await,
        commands::Command::Migrate(args) => commands::migrate::run(args, config).await,
    }
}
