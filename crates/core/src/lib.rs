pub mod error;
pub mod migration;
pub mod provider;

pub use error::{ErrorKind, ProviderError, ProviderResult};
pub use migration::{MigrationReport, Migrator};
pub use provider::filesystem::FilesystemProvider;
pub use provider::object_storage::{ConnectionString, ObjectStorageProvider};
pub use provider::{FileProvider, FileRecord};
