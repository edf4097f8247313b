use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use usermanager_shared::{PaginationError, PermissionError};
use usermanager_usecase::{ErrorKind, UsecaseError};

pub type ApiResult<T> = Result<T, ApiError>;

/// Error response of the REST adapter.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ErrorKind::NotFound.as_str(), message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl From<UsecaseError> for ApiError {
    fn from(err: UsecaseError) -> Self {
        let kind = err.kind();
        let status = match kind {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict | ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::Infrastructure => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if kind == ErrorKind::Infrastructure {
            tracing::error!(error = %err, stage = err.stage(), "Request failed");
            return Self::new(status, kind.as_str(), "internal error");
        }
        Self::new(status, kind.as_str(), err.to_string())
    }
}

impl From<PermissionError> for ApiError {
    fn from(err: PermissionError) -> Self {
        UsecaseError::from(err).into()
    }
}

impl From<PaginationError> for ApiError {
    fn from(err: PaginationError) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorKind::InvalidInput.as_str(),
            err.to_string(),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind,
            message: &self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
