use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use s3::bucket::Bucket;
use s3::bucket_ops::BucketConfiguration;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;
use tracing::debug;

use super::{FileProvider, FileRecord};
use crate::error::{ProviderError, ProviderResult};

const DEV_ENDPOINT: &str = "http://127.0.0.1:9000";
const DEV_ACCESS_KEY: &str = "minioadmin";
const DEV_SECRET_KEY: &str = "minioadmin";
const DEFAULT_REGION: &str = "us-east-1";

/// Settings for an S3-compatible account, parsed from
/// `Endpoint=...;Region=...;AccessKey=...;SecretKey=...`.
///
/// `UseDevelopmentStorage=true` selects a local emulator on port 9000 with
/// its stock credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
    pub session_token: Option<String>,
}

impl ConnectionString {
    pub fn development() -> Self {
        Self {
            endpoint: DEV_ENDPOINT.to_string(),
            region: DEFAULT_REGION.to_string(),
            access_key: DEV_ACCESS_KEY.to_string(),
            secret_key: DEV_SECRET_KEY.to_string(),
            session_token: None,
        }
    }
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("endpoint", &self.endpoint)
            .field("region", &self.region)
            .field("access_key", &self.access_key)
            .field("secret_key", &"***")
            .finish()
    }
}

impl FromStr for ConnectionString {
    type Err = ProviderError;

    fn from_str(s: &str) -> ProviderResult<Self> {
        let mut endpoint = None;
        let mut region = None;
        let mut access_key = None;
        let mut secret_key = None;
        let mut session_token = None;

        for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                ProviderError::Config(format!("malformed connection string segment: {part}"))
            })?;
            let value = value.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "usedevelopmentstorage" => {
                    if value.eq_ignore_ascii_case("true") {
                        return Ok(Self::development());
                    }
                }
                "endpoint" => endpoint = Some(value),
                "region" => region = Some(value),
                "accesskey" => access_key = Some(value),
                "secretkey" => secret_key = Some(value),
                "sessiontoken" => session_token = Some(value),
                other => {
                    return Err(ProviderError::Config(format!(
                        "unknown connection string key: {other}"
                    )));
                }
            }
        }

        let missing = |name: &str| ProviderError::Config(format!("connection string lacks {name}"));
        Ok(Self {
            endpoint: endpoint.ok_or_else(|| missing("Endpoint"))?,
            region: region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
            access_key: access_key.ok_or_else(|| missing("AccessKey"))?,
            secret_key: secret_key.ok_or_else(|| missing("SecretKey"))?,
            session_token,
        })
    }
}

/// Reduce a root container name to a valid bucket name: keep `[A-Za-z0-9-]`,
/// lower-case the rest.
pub fn sanitize_container_name(input: &str) -> ProviderResult<String> {
    if input.is_empty() {
        return Err(ProviderError::InvalidArgument(
            "missing root container".to_string(),
        ));
    }
    let name: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if name.is_empty() {
        return Err(ProviderError::InvalidArgument(format!(
            "root container {input:?} has no usable characters"
        )));
    }
    Ok(name)
}

fn normalize_key(path: &str) -> String {
    path.replace('\\', "/")
}

fn check_status(status: u16, key: &str) -> ProviderResult<()> {
    match status {
        200..=299 => Ok(()),
        404 => Err(ProviderError::NotFound(format!("file {key} not found"))),
        _ => Err(ProviderError::Status {
            status,
            key: key.to_string(),
        }),
    }
}

/// A 409 from CreateBucket is only harmless when the bucket is ours; a name
/// taken by another account (`BucketAlreadyExists`) is a real failure.
fn already_owned(status: u16, body: &str) -> bool {
    status == 409 && body.contains("BucketAlreadyOwnedByYou")
}

/// Provider backed by an S3-compatible object store. Each root container
/// is a bucket, created on demand by every operation.
pub struct ObjectStorageProvider {
    region: Region,
    credentials: Credentials,
}

impl ObjectStorageProvider {
    pub fn new(connection: ConnectionString) -> ProviderResult<Self> {
        let region = Region::Custom {
            region: connection.region,
            endpoint: connection.endpoint,
        };
        let credentials = Credentials::new(
            Some(connection.access_key.as_str()),
            Some(connection.secret_key.as_str()),
            None,
            connection.session_token.as_deref(),
            None,
        )
        .map_err(|e| ProviderError::Config(format!("invalid credentials: {e}")))?;
        Ok(Self {
            region,
            credentials,
        })
    }

    pub fn from_connection_string(connection_string: &str) -> ProviderResult<Self> {
        Self::new(connection_string.parse()?)
    }

    /// Sanitize the name and create the bucket if it is missing.
    async fn container(&self, root_container: &str) -> ProviderResult<Box<Bucket>> {
        let name = sanitize_container_name(root_container)?;

        let created = Bucket::create_with_path_style(
            &name,
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;
        match created {
            Ok(response) if response.success() => {
                debug!(bucket = %name, "Created bucket");
            }
            Ok(response) if already_owned(response.response_code, &response.response_text) => {}
            Err(S3Error::HttpFailWithBody(status, body)) if already_owned(status, &body) => {}
            Ok(response) => {
                return Err(ProviderError::Status {
                    status: response.response_code,
                    key: name,
                });
            }
            Err(S3Error::HttpFailWithBody(status, _)) => {
                return Err(ProviderError::Status { status, key: name });
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Bucket::new(&name, self.region.clone(), self.credentials.clone())?.with_path_style())
    }

    async fn object_exists(bucket: &Bucket, key: &str) -> ProviderResult<bool> {
        match bucket.head_object(key).await {
            Ok((_, 404)) => Ok(false),
            Ok((_, status)) => {
                check_status(status, key)?;
                Ok(true)
            }
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl FileProvider for ObjectStorageProvider {
    async fn list_files(&self, root_container: &str) -> ProviderResult<Vec<FileRecord>> {
        let bucket = self.container(root_container).await?;
        let results = bucket.list(String::new(), None).await?;
        let files: Vec<_> = results
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|object| FileRecord::from_key(&object.key))
            .collect();
        debug!(container = %root_container, count = files.len(), "Listed objects");
        Ok(files)
    }

    async fn read_file(&self, root_container: &str, path: &str) -> ProviderResult<Vec<u8>> {
        let bucket = self.container(root_container).await?;
        let key = normalize_key(path);
        let response = bucket.get_object(&key).await?;
        check_status(response.status_code(), &key)?;
        Ok(response.to_vec())
    }

    async fn write_file(
        &self,
        root_container: &str,
        path: &str,
        data: &[u8],
        overwrite: bool,
    ) -> ProviderResult<()> {
        let bucket = self.container(root_container).await?;
        let key = normalize_key(path);
        if !overwrite && Self::object_exists(&bucket, &key).await? {
            return Err(ProviderError::AlreadyExists(format!(
                "the file {key} already exists"
            )));
        }
        let response = bucket.put_object(&key, data).await?;
        check_status(response.status_code(), &key)?;
        debug!(container = %root_container, key = %key, bytes = data.len(), "Uploaded object");
        Ok(())
    }

    async fn file_exists(&self, root_container: &str, path: &str) -> ProviderResult<bool> {
        let bucket = self.container(root_container).await?;
        Self::object_exists(&bucket, &normalize_key(path)).await
    }

    async fn delete_file(&self, root_container: &str, path: &str) -> ProviderResult<()> {
        let bucket = self.container(root_container).await?;
        let key = normalize_key(path);
        let response = bucket.delete_object(&key).await?;
        match response.status_code() {
            // Deleting an absent object is not an error here.
            404 => Ok(()),
            status => check_status(status, &key),
        }
    }

    async fn clear_container(&self, root_container: &str) -> ProviderResult<()> {
        let files = self.list_files(root_container).await?;
        for file in &files {
            self.delete_file(root_container, file.relative_path()).await?;
        }
        debug!(container = %root_container, deleted = files.len(), "Cleared bucket");
        Ok(())
    }
}
