use std::path::Path;

use axum::extract::{Multipart, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect, Response};
use fileproviders_core::ErrorKind;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::WebError;
use crate::page;
use crate::{AppState, ROOT_CONTAINER};

/// `?path=` query parameter, relative to the root container
#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub path: String,
}

/// GET / - list files
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let files = match state.provider.list_files(ROOT_CONTAINER).await {
        Ok(files) => files,
        // Nothing uploaded yet on a backend that doesn't auto-create.
        Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    let mut names: Vec<_> = files.iter().map(|f| f.relative_path().to_string()).collect();
    names.sort();
    Ok(Html(page::render_index(&names)))
}

/// POST /upload - store the `file` part under a random name
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, WebError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let Some(original) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await?;
        if original.is_empty() && data.is_empty() {
            // Browsers send an empty part when nothing was selected.
            break;
        }

        let name = random_name(&original);
        state
            .provider
            .write_file(ROOT_CONTAINER, &name, &data, false)
            .await?;
        info!(name = %name, original = %original, bytes = data.len(), "Uploaded file");
        break;
    }
    Ok(Redirect::to("/"))
}

/// POST /download?path= - return the file as an attachment
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Response, WebError> {
    let data = state.provider.read_file(ROOT_CONTAINER, &query.path).await?;
    let file_name = query.path.rsplit('/').next().unwrap_or(&query.path);
    debug!(path = %query.path, bytes = data.len(), "Downloading file");

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name.replace('"', "'")),
            ),
        ],
        data,
    )
        .into_response())
}

/// POST /delete?path= - remove the file
pub async fn delete(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Redirect, WebError> {
    state
        .provider
        .delete_file(ROOT_CONTAINER, &query.path)
        .await?;
    info!(path = %query.path, "Deleted file");
    Ok(Redirect::to("/"))
}

/// Random file name keeping the extension of `original`.
fn random_name(original: &str) -> String {
    let id = uuid::Uuid::new_v4();
    match Path::new(original).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{id}.{ext}"),
        None => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_name_keeps_extension() {
        let name = random_name("holiday photo.JPG");
        assert!(name.ends_with(".JPG"));
        assert_eq!(name.len(), 36 + 4);
    }

    #[test]
    fn random_name_without_extension() {
        let name = random_name("README");
        assert_eq!(name.len(), 36);
        assert!(!name.contains('.'));
    }
}
