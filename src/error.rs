use serde::Serialize;

use crate::db::dao::DaoLayerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn validation(fields: Vec<FieldError>) -> Self {
        Self::Validation {
            message: "Validation failed".to_string(),
            fields,
        }
    }

    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::validation(vec![FieldError::new(field, message)])
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Logs `source` and returns an internal error that carries only `message`.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl std::fmt::Display,
    ) -> Self {
        let message = message.into();
        tracing::error!(error = %source, "{message}");
        Self::Internal(message)
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. } => message.as_str(),
            Self::BadRequest(message)
            | Self::Unauthorized(message)
            | Self::Forbidden(message)
            | Self::NotFound(message)
            | Self::Conflict(message)
            | Self::Internal(message) => message.as_str(),
        }
    }

    pub fn fields(&self) -> Option<&[FieldError]> {
        match self {
            Self::Validation { fields, .. } => Some(fields.as_slice()),
            _ => None,
        }
    }
}

/// Maps a unique-index violation to `Conflict`; other storage errors convert as usual.
pub fn conflict_on_duplicate(err: DaoLayerError, message: &str) -> AppError {
    if err.is_unique_violation() {
        AppError::conflict(message)
    } else {
        err.into()
    }
}

impl From<DaoLayerError> for AppError {
    fn from(err: DaoLayerError) -> Self {
        match err {
            DaoLayerError::NotFound { .. } => AppError::not_found(err.to_string()),
            DaoLayerError::InvalidPagination { .. } => AppError::bad_request(err.to_string()),
            DaoLayerError::Db(db_err) => {
                AppError::internal_with_source("Storage operation failed", db_err)
            }
        }
    }
}
