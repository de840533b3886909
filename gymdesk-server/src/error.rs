//! Error-to-response mapping.

use std::io;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gymdesk::GymError;
use serde_json::json;
use thiserror::Error;

/// Errors that stop the server from starting or keep it from serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration, snapshot, or other core failure during startup.
    #[error(transparent)]
    Core(#[from] GymError),
    /// Binding or serving the listener failed.
    #[error("server I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Core error wrapped for use as a handler rejection.
///
/// Handlers return `Result<_, ApiError>` and use `?` on service calls; the
/// response is the mapped status code with an `{"error": "..."}` body.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub GymError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            GymError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GymError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            GymError::PlanNotFound(_) | GymError::MemberNotFound(_) => StatusCode::NOT_FOUND,
            GymError::PlanInUse { .. } => StatusCode::CONFLICT,
            GymError::Config(_) | GymError::Snapshot(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (GymError::InvalidInput("bad".into()), StatusCode::BAD_REQUEST),
            (GymError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (GymError::PlanNotFound("p".into()), StatusCode::NOT_FOUND),
            (GymError::MemberNotFound("m".into()), StatusCode::NOT_FOUND),
            (
                GymError::PlanInUse { member_count: 1, member_names: "Alice".into() },
                StatusCode::CONFLICT,
            ),
            (GymError::Snapshot("disk full".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            let response = ApiError(error).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_server_error_from_core() {
        let err = ServerError::from(GymError::Config("missing auth table".into()));
        assert!(matches!(err, ServerError::Core(_)));
        assert!(err.to_string().contains("missing auth table"));
    }
}
