//! API error responses
//!
//! Every error response body is `{"message": "..."}`, the shape clients of
//! this service already rely on. A stable machine-readable code travels in
//! the `x-error-code` header.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::ValidationError;
use crate::infra::RegistrationError;

/// Body of a rejected duplicate submission
pub const DUPLICATE_MESSAGE: &str = "Roll number or transaction ID already exists";
/// Body of a submission that failed for server-side reasons
pub const SUBMISSION_FAILED_MESSAGE: &str = "Registration failed, please try again";
/// Body of a listing that failed for server-side reasons
pub const LISTING_FAILED_MESSAGE: &str = "Error fetching registrations";
/// Body of a request whose multipart payload could not be read
pub const INVALID_FORM_MESSAGE: &str = "Invalid form data";
/// Body of a submission carrying more than one payment proof
pub const MULTIPLE_FILES_MESSAGE: &str = "Only one payment proof file may be uploaded";

// ============================================================================
// Error Codes
// ============================================================================

/// Error codes for API responses
///
/// These codes are stable and can be used by clients for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (3xxx)
    /// Request body is malformed
    InvalidRequestBody,
    /// Required field is missing
    MissingRequiredField,
    /// Field value is invalid
    InvalidFieldValue,
    /// Upload exceeds size limit
    PayloadTooLarge,

    // Conflict errors (5xxx)
    /// Roll number or transaction id already registered
    DuplicateRegistration,

    // Infrastructure errors (8xxx)
    /// Database operation failed
    DatabaseError,
    /// Upload storage failed
    StorageError,
    /// Record store unreachable
    ServiceUnavailable,
    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn numeric_code(&self) -> u32 {
        match self {
            ErrorCode::InvalidRequestBody => 3001,
            ErrorCode::MissingRequiredField => 3002,
            ErrorCode::InvalidFieldValue => 3003,
            ErrorCode::PayloadTooLarge => 3004,

            ErrorCode::DuplicateRegistration => 5001,

            ErrorCode::DatabaseError => 8001,
            ErrorCode::StorageError => 8002,
            ErrorCode::ServiceUnavailable => 8003,
            ErrorCode::InternalError => 8999,
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// Duplicates are reported as 400 rather than 409; existing clients
    /// treat every 400 as "fix your submission".
    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidRequestBody => StatusCode::BAD_REQUEST,
            ErrorCode::MissingRequiredField => StatusCode::BAD_REQUEST,
            ErrorCode::InvalidFieldValue => StatusCode::BAD_REQUEST,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            ErrorCode::DuplicateRegistration => StatusCode::BAD_REQUEST,

            ErrorCode::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code_str = match self {
            ErrorCode::InvalidRequestBody => "INVALID_REQUEST_BODY",
            ErrorCode::MissingRequiredField => "MISSING_REQUIRED_FIELD",
            ErrorCode::InvalidFieldValue => "INVALID_FIELD_VALUE",
            ErrorCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ErrorCode::DuplicateRegistration => "DUPLICATE_REGISTRATION",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", code_str)
    }
}

// ============================================================================
// Error Response
// ============================================================================

/// Error response for API endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,
}

impl ApiError {
    /// Create a new API error
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Roll number or transaction id already taken
    pub fn duplicate_registration() -> Self {
        Self::new(ErrorCode::DuplicateRegistration, DUPLICATE_MESSAGE)
    }

    /// Server-side failure with a caller-chosen public message.
    ///
    /// The code reflects which layer failed; `err` itself never reaches the
    /// response body.
    pub fn server(err: &RegistrationError, message: impl Into<String>) -> Self {
        let code = match err {
            RegistrationError::Database(_) => ErrorCode::DatabaseError,
            RegistrationError::Storage(_) => ErrorCode::StorageError,
            _ => ErrorCode::InternalError,
        };
        Self::new(code, message)
    }

    /// Get the HTTP status code
    pub fn status(&self) -> StatusCode {
        self.code.http_status()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code;
        let mut response = (status, Json(self)).into_response();

        // The body stays `{message}`; codes travel in headers.
        let headers = response.headers_mut();
        if let Ok(code_value) = HeaderValue::from_str(&code.to_string()) {
            headers.insert(HeaderName::from_static("x-error-code"), code_value);
        }
        headers.insert(
            HeaderName::from_static("x-error-number"),
            HeaderValue::from(code.numeric_code()),
        );

        response
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let code = match err {
            ValidationError::MissingField(_) => ErrorCode::MissingRequiredField,
            ValidationError::FieldTooLong { .. } => ErrorCode::InvalidFieldValue,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::new(
                ErrorCode::PayloadTooLarge,
                "Upload exceeds the maximum allowed size",
            )
        } else {
            ApiError::new(ErrorCode::InvalidRequestBody, INVALID_FORM_MESSAGE)
        }
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(_: MultipartRejection) -> Self {
        ApiError::new(ErrorCode::InvalidRequestBody, INVALID_FORM_MESSAGE)
    }
}

// ============================================================================
// Tests
// ============================================================================
