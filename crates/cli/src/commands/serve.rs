use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::config::AppConfig;

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides [web].bind)
    #[arg(short, long)]
    bind: Option<String>,
}

pub async fn run(args: ServeArgs, config_path: Option<&Path>) -> Result<()> {
    let config = AppConfig::load(config_path)?;
    let provider = config.open_provider()?;
    let bind = args.bind.unwrap_or(config.web.bind);

    info!(provider = %config.provider.describe(), container = fileproviders_web::ROOT_CONTAINER, "Serving files");
    fileproviders_web::serve(&bind, provider, config.web.max_upload_bytes)
        .await
        .with_context(|| format!("web server on {bind} failed"))
}
