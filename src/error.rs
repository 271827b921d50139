use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::state::commands::CommandError;

/// Errors that can occur in service layer operations.
///
/// Validation failures are typed results, never panics: a presentation layer
/// renders a specific message per kind, and retrying an unchanged command
/// cannot succeed so nothing here is retried automatically.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed input (bad room code, unsupported duration, off-palette
    /// color).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Subscribe-only or query-only flow referenced a room that was never
    /// created.
    #[error("room `{0}` not found")]
    RoomNotFound(String),
    /// A session command rejected the operation.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with the session's current state.
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::RoomNotFound(code) => {
                AppError::NotFound(format!("room `{code}` not found"))
            }
            ServiceError::Command(CommandError::UnknownZone(zone)) => {
                AppError::NotFound(format!("zone `{zone}` is not part of this session"))
            }
            ServiceError::Command(command) => AppError::Conflict(command.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {err}"))
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::GameStatus;

    #[test]
    fn command_errors_map_to_conflict_except_unknown_zone() {
        let err: AppError = ServiceError::Command(CommandError::AlreadyReady("p".into())).into();
        assert!(matches!(err, AppError::Conflict(_)));

        let err: AppError = ServiceError::Command(CommandError::InvalidState {
            status: GameStatus::Finished,
        })
        .into();
        assert!(matches!(err, AppError::Conflict(_)));

        let err: AppError =
            ServiceError::Command(CommandError::UnknownZone("zone-z".into())).into();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn room_not_found_maps_to_not_found() {
        let err: AppError = ServiceError::RoomNotFound("lobby".into()).into();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
