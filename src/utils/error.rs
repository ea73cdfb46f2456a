use axum::http::StatusCode;
use serde_json::json;

use crate::utils::api_response::ApiResponse;
use crate::utils::notification::NotificationError;

/// Error taxonomy for every core operation. Each variant maps to exactly one
/// HTTP status; handlers convert via `?` into the response envelope.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("cannot {action} a request that is {status}")]
    InvalidState {
        action: &'static str,
        status: String,
    },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl TaskError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            TaskError::Validation(_) => StatusCode::BAD_REQUEST,
            TaskError::NotFound(_) => StatusCode::NOT_FOUND,
            TaskError::InvalidState { .. } => StatusCode::CONFLICT,
            TaskError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<NotificationError> for TaskError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::Database(e) => TaskError::Storage(e),
            NotificationError::MissingRecipient => {
                TaskError::Validation("notification has no recipient".to_string())
            }
        }
    }
}

impl From<TaskError> for ApiResponse<()> {
    fn from(err: TaskError) -> Self {
        match &err {
            TaskError::Storage(source) => {
                tracing::error!(error = %source, "storage failure");
                ApiResponse::error(
                    err.status_code(),
                    "Storage failure",
                    Some(json!({ "error": source.to_string() })),
                )
            }
            _ => ApiResponse::error(err.status_code(), err.to_string(), None),
        }
    }
}

impl From<sqlx::Error> for ApiResponse<()> {
    fn from(err: sqlx::Error) -> Self {
        TaskError::from(err).into()
    }
}

impl From<NotificationError> for ApiResponse<()> {
    fn from(err: NotificationError) -> Self {
        TaskError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_map_to_expected_status_codes() {
        assert_eq!(
            TaskError::Validation("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            TaskError::NotFound("request").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            TaskError::InvalidState {
                action: "accept",
                status: "completed".to_string()
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            TaskError::Storage(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_state_message_names_action_and_status() {
        let err = TaskError::InvalidState {
            action: "accept",
            status: "completed".to_string(),
        };
        assert_eq!(err.to_string(), "cannot accept a request that is completed");
    }

    #[test]
    fn conversion_preserves_status_code_in_envelope() {
        let envelope: ApiResponse<()> = TaskError::NotFound("chat").into();
        assert_eq!(envelope.status_code, 404);
        assert_eq!(envelope.message, "chat not found");
    }
}
