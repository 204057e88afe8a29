//! JSON response envelope.
//!
//! Every API response has the shape `{ "code": 0, "message": "success", "data": ... }`.
//! Failures carry a non-zero `code` and a matching HTTP status.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::user::UserError;

pub const CODE_SUCCESS: i32 = 0;
pub const CODE_INTERNAL: i32 = 10000;
pub const CODE_VALIDATION: i32 = 10001;
pub const CODE_NOT_FOUND: i32 = 10002;
pub const CODE_CONFLICT: i32 = 10003;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: CODE_SUCCESS,
            message: "success".to_string(),
            data: Some(data),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// An error rendered as an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, CODE_VALIDATION, message)
    }
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match &err {
            UserError::Validation(_) => Self::validation(err.to_string()),
            UserError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, CODE_NOT_FOUND, err.to_string()),
            UserError::UsernameTaken(_) => Self::new(StatusCode::CONFLICT, CODE_CONFLICT, err.to_string()),
            UserError::Storage(_) => {
                tracing::error!(error = %err, "User storage failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, CODE_INTERNAL, "internal error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            code: self.code,
            message: self.message,
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_mapping() {
        let err = ApiError::from(UserError::NotFound("7".to_string()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, CODE_NOT_FOUND);

        let err = ApiError::from(UserError::UsernameTaken("bob".to_string()));
        assert_eq!(err.status, StatusCode::CONFLICT);

        let err = ApiError::from(UserError::Storage("disk on fire".to_string()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "internal error");
    }

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["message"], "success");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }
}
