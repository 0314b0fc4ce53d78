//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every failure a handler can produce, from a rejected bearer token to a broken database
//! connection, is expressed as one of its variants.
//!
//! `AppError` implements `actix_web::error::ResponseError` to seamlessly convert
//! application errors into appropriate HTTP responses with JSON bodies. Extractor
//! failures (malformed query strings and path segments) are routed here as well
//! through the `*_error_handler` functions registered in `AppState::configure`;
//! malformed JSON bodies are reported by `body::JsonBody`.

use actix_web::{
    error::{PathError, QueryPayloadError, ResponseError},
    http::StatusCode,
    HttpRequest, HttpResponse,
};
use serde_json::json;
use std::fmt;

use crate::validation::FieldError;

/// Represents all possible errors that can occur within the application.
///
/// Each variant corresponds to a specific type of error, often carrying a message
/// detailing the issue. These errors are then converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// One or more declared field rules failed (HTTP 400).
    /// Carries the violations in rule declaration order.
    Validation(Vec<FieldError>),
    /// Represents a client-side error due to a malformed or invalid request (HTTP 400).
    BadRequest(String),
    /// Credentials were supplied but did not match (HTTP 401).
    Unauthorized(String),
    /// A protected route was called without a bearer token (HTTP 401).
    MissingToken,
    /// A bearer token was supplied but failed verification (HTTP 403).
    Forbidden(String),
    /// Represents a situation where a requested resource was not found (HTTP 404).
    NotFound(String),
    /// Represents an unexpected server-side error (HTTP 500).
    /// `message` is the handler's generic description, `cause` the underlying error text.
    InternalServerError { message: String, cause: String },
}

impl AppError {
    /// Builds the catch-all 500 for a handler, logging the cause.
    pub fn internal(message: impl Into<String>, cause: impl fmt::Display) -> Self {
        let message = message.into();
        let cause = cause.to_string();
        log::error!("{}: {}", message, cause);
        AppError::InternalServerError { message, cause }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                write!(f, "Validation Error: {}", fields.join(", "))
            }
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::MissingToken => write!(f, "Unauthorized: Token required"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError { message, cause } => {
                write!(f, "Internal Server Error: {} ({})", message, cause)
            }
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
///
/// Gate failures answer with an `error` key, handler failures with `message`,
/// and rule violations with an ordered `errors` array.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) | AppError::MissingToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(errors) => json!({ "errors": errors }),
            AppError::BadRequest(msg) | AppError::Unauthorized(msg) | AppError::NotFound(msg) => {
                json!({ "message": msg })
            }
            AppError::MissingToken => json!({ "error": "Token required" }),
            AppError::Forbidden(msg) => json!({ "error": msg }),
            AppError::InternalServerError { message, cause } => json!({
                "message": message,
                "error": cause
            }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid query string: {}", err)).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("Invalid path: {}", err)).into()
}
