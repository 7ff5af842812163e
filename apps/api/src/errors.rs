use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::editor::edits::EditError;
use crate::editor::requests::AlreadyInFlight;
use crate::editor::rewrite::RewriteError;
use crate::export::{ExportError, ExportRunError};
use crate::session::SessionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Request in flight: {0}")]
    RequestInFlight(String),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::EmptyIdentity => AppError::Validation(e.to_string()),
            SessionError::InvalidTransition { .. } => AppError::InvalidTransition(e.to_string()),
            SessionError::ResumeNotFound(_) => AppError::NotFound(e.to_string()),
            SessionError::Edit(EditError::EntryNotFound { .. }) => AppError::NotFound(e.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<AlreadyInFlight> for AppError {
    fn from(e: AlreadyInFlight) -> Self {
        AppError::RequestInFlight(e.to_string())
    }
}

impl From<RewriteError> for AppError {
    fn from(e: RewriteError) -> Self {
        match e {
            RewriteError::Session(e) => e.into(),
            RewriteError::InFlight(e) => e.into(),
        }
    }
}

impl From<ExportRunError> for AppError {
    fn from(e: ExportRunError) -> Self {
        match e {
            ExportRunError::Session(e) => e.into(),
            ExportRunError::InFlight(e) => e.into(),
            ExportRunError::Export(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidTransition(msg) => {
                (StatusCode::CONFLICT, "INVALID_TRANSITION", msg.clone())
            }
            AppError::RequestInFlight(msg) => {
                (StatusCode::CONFLICT, "REQUEST_IN_FLIGHT", msg.clone())
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "EXPORT_ERROR",
                    "The resume could not be exported".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::Id;
    use crate::session::Step;

    #[test]
    fn test_session_errors_map_to_status_codes() {
        let cases = [
            (SessionError::EmptyIdentity, StatusCode::BAD_REQUEST),
            (
                SessionError::InvalidTransition {
                    step: Step::Dashboard,
                    action: "edit",
                },
                StatusCode::CONFLICT,
            ),
            (SessionError::ResumeNotFound(Id::generate()), StatusCode::NOT_FOUND),
            (
                SessionError::Edit(EditError::EntryNotFound {
                    kind: "contact",
                    id: Id::generate(),
                }),
                StatusCode::NOT_FOUND,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(AppError::from(error).into_response().status(), status);
        }
    }

    #[test]
    fn test_export_failure_is_bad_gateway() {
        let error = AppError::from(ExportError::Failed {
            status: "exit status: 1".into(),
            stderr: String::new(),
        });
        assert_eq!(error.into_response().status(), StatusCode::BAD_GATEWAY);
    }
}
