//! JSON error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use folio_core::media::MediaError;
use folio_core::FolioError;
use folio_db::DbError;
use serde_json::json;

/// Handler error rendered as `{"success": false, "message": ...}`.
#[derive(Debug)]
pub struct ApiError(FolioError);

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(FolioError::validation(msg))
    }

    pub fn status(&self) -> StatusCode {
        let e = &self.0;
        if matches!(e, FolioError::InvalidPassword) {
            StatusCode::FORBIDDEN
        } else if e.is_not_found() {
            StatusCode::NOT_FOUND
        } else if e.is_bad_request() {
            StatusCode::BAD_REQUEST
        } else if e.is_conflict() {
            StatusCode::CONFLICT
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<FolioError> for ApiError {
    fn from(e: FolioError) -> Self {
        Self(e)
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        Self(e.into())
    }
}

impl From<MediaError> for ApiError {
    fn from(e: MediaError) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self.0, "Request rejected");
        }
        let body = Json(json!({ "success": false, "message": self.0.to_string() }));
        (status, body).into_response()
    }
}
