//! Mapping of pool errors to HTTP responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::Error;

/// Error body: `{"statusCode": 400, "message": "...", "error": "Bad Request"}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub message: String,
    pub error: String,
}

/// An error ready to be sent to the client
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

/// Status code for each error kind
pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::InvalidArgument(_)
        | Error::Uninitialized
        | Error::CapacityExceeded
        | Error::DuplicateRegistration(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        Self {
            status: status_for(&error),
            message: error.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            status_code: self.status.as_u16(),
            message: self.message,
            error: self
                .status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&Error::InvalidArgument("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&Error::Uninitialized), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&Error::CapacityExceeded), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&Error::DuplicateRegistration("A".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&Error::NotFound("A".to_string())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_api_error_keeps_message() {
        let api_error = ApiError::from(Error::CapacityExceeded);
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(api_error.message, "Parking lot is full");
    }
}
