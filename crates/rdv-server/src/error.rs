use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rdv_store::RepositoryError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("not found: {0}")]
    NotFound(String),

    /// Field-level problems found before calling the repository.
    #[error("invalid form: {}", .0.join("; "))]
    Form(Vec<String>),

    /// Blocking issues reported by the repository.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("repository error: {0}")]
    Repository(RepositoryError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ServerError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Validation(failure) => Self::Validation(failure.messages),
            other => Self::Repository(other),
        }
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Form(_) | Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Form(errors) | Self::Validation(errors) => json!({ "errors": errors }),
            other => {
                if status.is_server_error() {
                    tracing::error!(error = %other, "request failed");
                }
                json!({ "error": other.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rdv_store::ValidationFailure;

    #[test]
    fn repository_validation_maps_to_unprocessable() {
        let err: ServerError =
            RepositoryError::Validation(ValidationFailure::single("Store x does not exist")).into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(matches!(err, ServerError::Validation(ref m) if m == &["Store x does not exist"]));
    }

    #[test]
    fn other_repository_errors_are_internal() {
        let err: ServerError = RepositoryError::Malformed("bad".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_status() {
        assert_eq!(ServerError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
    }
}
