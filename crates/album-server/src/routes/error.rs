use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use album_core::ServiceError;

/// Maps domain error kinds onto HTTP statuses; handlers return it via `?`.
pub struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Query(_) => StatusCode::NOT_FOUND,
            ServiceError::NotAuthorized(_) => StatusCode::FORBIDDEN,
            ServiceError::Permission(_) => StatusCode::FORBIDDEN,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}
