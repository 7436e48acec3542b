use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors returned by a [`FileProvider`](crate::provider::FileProvider).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Missing or unusable root container name.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Container, file or base directory does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A file already occupies the path and overwriting was not requested.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("object storage error: {0}")]
    Storage(#[from] s3::error::S3Error),

    /// Object storage answered with a status we don't handle.
    #[error("object storage returned {status} for {key}")]
    Status { status: u16, key: String },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification of a [`ProviderError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    Config,
    Other,
}

impl ProviderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProviderError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ProviderError::NotFound(_) => ErrorKind::NotFound,
            ProviderError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            ProviderError::Config(_) => ErrorKind::Config,
            ProviderError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                ErrorKind::NotFound
            }
            ProviderError::Status { status: 404, .. } => ErrorKind::NotFound,
            _ => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProviderError::AlreadyExists("Test/a.txt".to_string());
        assert_eq!(err.to_string(), "already exists: Test/a.txt");
    }

    #[test]
    fn io_not_found_maps_to_not_found_kind() {
        let err = ProviderError::from(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = ProviderError::Status {
            status: 403,
            key: "a.txt".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Other);
    }
}
