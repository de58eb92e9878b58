//! Error types for the authentication service

use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::{CacheError, DatabaseError};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Identity field protected by a uniqueness constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateField {
    Username,
    Email,
}

impl DuplicateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateField::Username => "username",
            DuplicateField::Email => "email",
        }
    }
}

impl fmt::Display for DuplicateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by a credential store
#[derive(Error, Debug)]
pub enum StoreError {
    /// An insert collided with an existing account
    #[error("duplicate {field}")]
    Duplicate { field: DuplicateField },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Errors surfaced by the account service and session manager
#[derive(Error, Debug)]
pub enum AuthError {
    /// Malformed input; `field` names the offending input when known
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<&'static str>,
    },

    /// An identity field is already taken
    #[error("{} already exists", capitalize(.field.as_str()))]
    Conflict { field: DuplicateField },

    /// Unknown username or wrong password; the two cases are never told apart
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User not found")]
    NotFound,

    #[error("Not authenticated")]
    AuthenticationRequired,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Session store error: {0}")]
    Cache(#[from] CacheError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn validation(message: impl Into<String>, field: Option<&'static str>) -> Self {
        AuthError::Validation {
            message: message.into(),
            field,
        }
    }

    /// HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation { .. } | AuthError::Conflict { .. } => StatusCode::BAD_REQUEST,
            AuthError::InvalidCredentials | AuthError::AuthenticationRequired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::Database(_) | AuthError::Cache(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { field } => AuthError::Conflict { field },
            StoreError::Database(e) => AuthError::Database(e),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match &self {
            AuthError::Validation {
                message,
                field: Some(field),
            } => json!({ "error": message, "field": field }),
            AuthError::Conflict { field } => {
                json!({ "error": self.to_string(), "field": field.as_str() })
            }
            AuthError::Database(_) | AuthError::Cache(_) | AuthError::Internal(_) => {
                error!("Request failed: {}", self);
                json!({ "error": "Internal server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Type alias for authentication results
pub type AuthResult<T> = Result<T, AuthError>;
