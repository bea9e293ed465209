use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::data::models::SrsError;

impl SrsError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SrsError::Validation(_) => StatusCode::BAD_REQUEST,
            SrsError::NotFound(_) => StatusCode::NOT_FOUND,
            SrsError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SrsError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = json!({
            "error": self.to_string(),
            "status": status.as_u16()
        });

        (status, axum::Json(body)).into_response()
    }
}
