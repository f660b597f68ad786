use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    InvalidCourseData(String),
    #[error("Course not found")]
    CourseNotFound,
    #[error("Chapter not found")]
    ChapterNotFound,
    /// Persistence failure. The message is a fixed, client-safe phrase;
    /// the underlying detail is logged where the error is raised.
    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    pub fn internal(message: &'static str, source: anyhow::Error) -> Self {
        Error::Internal { message, source }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCourseData(_) => StatusCode::BAD_REQUEST,
            Error::CourseNotFound | Error::ChapterNotFound => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error envelope returned by every failed request
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub status: &'static str,
    pub message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status: "error",
            message: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
