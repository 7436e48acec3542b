pub mod files;
pub mod init;
pub mod migrate;
pub mod serve;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Command {
    /// Write a config file selecting the storage provider
    Init(init::InitArgs),
    /// Work with files in a root container
    Files(files::FilesArgs),
    /// Run the web front end
    Serve(serve::ServeArgs),
    /// Copy containers from the migration source to the target
    Migrate(migrate::MigrateArgs),
}
