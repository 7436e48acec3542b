use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fileproviders_core::{ErrorKind, ProviderError};
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum WebError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("invalid upload: {0}")]
    Multipart(#[from] MultipartError),
}

impl WebError {
    fn status(&self) -> StatusCode {
        match self {
            WebError::Provider(e) => match e.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::AlreadyExists => StatusCode::CONFLICT,
                ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
                ErrorKind::Config | ErrorKind::Other => StatusCode::INTERNAL_SERVER_ERROR,
            },
            WebError::Multipart(e) => e.status(),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (status, self.to_string()).into_response()
    }
}
