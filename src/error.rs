//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used at the HTTP boundary.
//! Component-level failures (`StoreError`, `TokenError`, `HashingError`) stay typed
//! inside their own modules and are converted here with `From`, so handlers can use
//! the `?` operator and every failure kind maps to exactly one status code.
//!
//! `AppError` implements `actix_web::error::ResponseError`. Server-side variants are
//! logged with their detail and answered with a generic body, so schema or driver
//! text never reaches the client.

use actix_web::{
    error::{BlockingError, JsonPayloadError, PathError},
    http::StatusCode,
    HttpRequest, HttpResponse, ResponseError,
};
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::password::HashingError;
use crate::auth::token::TokenError;
use crate::store::StoreError;

/// Represents all possible errors that can leave a request handler.
#[derive(Debug)]
pub enum AppError {
    /// Missing, invalid or expired credentials (HTTP 401).
    Unauthorized(String),
    /// Malformed request, such as an unparsable id or body (HTTP 400).
    BadRequest(String),
    /// The resource does not exist *or* belongs to someone else (HTTP 404).
    /// Both causes produce the same response.
    NotFound(String),
    /// The request collides with existing state, e.g. a registered email (HTTP 400).
    Conflict(String),
    /// Input failed field validation (HTTP 400).
    ValidationError(String),
    /// Unexpected server-side failure such as hashing or signing (HTTP 500).
    InternalServerError(String),
    /// Storage failure or timeout (HTTP 500).
    DatabaseError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
        }
    }
}

impl AppError {
    /// The message that is safe to show to a client.
    fn public_message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ValidationError(msg) => msg,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                "Internal server error"
            }
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects with a
/// `{"error": "..."}` body.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::Conflict(_) | AppError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("{}", self);
        }
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.public_message()
        }))
    }
}

/// Converts storage failures. `NotFound` carries the same text whatever the
/// underlying cause was.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::NotFound => AppError::NotFound("Resource not found".into()),
            StoreError::DuplicateEmail => AppError::Conflict("Email already registered".into()),
            StoreError::InvalidPatch => AppError::BadRequest(
                "At least one of 'title' or 'completed' must be provided".into(),
            ),
            StoreError::Timeout(_) | StoreError::Database(_) => {
                AppError::DatabaseError(error.to_string())
            }
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::ValidationError`.
///
/// Field-level messages are kept since they only describe the client's own input.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

/// Token verification failures all collapse into one client-facing 401;
/// only signing failures are server errors.
impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        match error {
            TokenError::Signing(_) => AppError::InternalServerError(error.to_string()),
            _ => AppError::Unauthorized("Invalid or expired token".into()),
        }
    }
}

impl From<HashingError> for AppError {
    fn from(error: HashingError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

impl From<BlockingError> for AppError {
    fn from(error: BlockingError) -> AppError {
        AppError::InternalServerError(format!("Blocking task failed: {}", error))
    }
}

/// Error handler for `web::JsonConfig`: bad bodies are a 400 with a generic message.
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected request body: {}", error);
    AppError::BadRequest("Invalid request body".into()).into()
}

/// Error handler for `web::PathConfig`: an unparsable id is a 400, not a 404.
pub fn path_error_handler(error: PathError, _req: &HttpRequest) -> actix_web::Error {
    log::debug!("Rejected path parameter: {}", error);
    AppError::BadRequest("Invalid id".into()).into()
}
