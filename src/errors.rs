use crate::services::{
    tag_client::TagErrorKind,
    tag_store::TagStoreError,
    tagging_service::ApplyError,
};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// A lightweight wrapper for general errors that keeps the message local.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Create a new AppError with a specific status and message.
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    /// Shortcut for a 500 Internal Server Error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    /// Shortcut for 404 Not Found
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.message,
            "status": self.status.as_u16()
        }));

        (self.status, body).into_response()
    }
}

impl From<ApplyError> for AppError {
    fn from(err: ApplyError) -> Self {
        let status = match &err {
            ApplyError::Setup(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApplyError::Tagging { .. } => match err.kind() {
                TagErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
                TagErrorKind::NotFound => StatusCode::NOT_FOUND,
                TagErrorKind::Throttled => StatusCode::SERVICE_UNAVAILABLE,
                TagErrorKind::Backend => StatusCode::INTERNAL_SERVER_ERROR,
            },
        };
        AppError::new(status, err.context_chain())
    }
}

impl From<TagStoreError> for AppError {
    fn from(err: TagStoreError) -> Self {
        match err {
            TagStoreError::NotFound(_) => AppError::not_found(err.to_string()),
            TagStoreError::Sqlx(_) => AppError::internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tag_client::TagClientError;

    #[test]
    fn tagging_failure_keeps_object_path() {
        let err = ApplyError::Tagging {
            path: "s3://bucket/r2.bam".into(),
            source: TagClientError::new(TagErrorKind::PermissionDenied, "access denied"),
        };
        let app: AppError = err.into();
        assert_eq!(app.status, StatusCode::FORBIDDEN);
        assert!(app.message.contains("s3://bucket/r2.bam"));
        assert!(app.message.ends_with("permission denied: access denied"));
    }

    #[test]
    fn setup_failure_is_internal() {
        let err = ApplyError::Setup(TagClientError::new(TagErrorKind::Throttled, "pool busy"));
        let app: AppError = err.into();
        assert_eq!(app.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(app.message.starts_with("tagging session construction failed"));
    }

    #[test]
    fn missing_tags_map_to_not_found() {
        let app: AppError = TagStoreError::NotFound("s3://b/k".into()).into();
        assert_eq!(app.status, StatusCode::NOT_FOUND);
        assert_eq!(app.message, "no tags found for `s3://b/k`");
    }
}
