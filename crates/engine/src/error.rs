//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when an item does not exist or is not visible to
//!   the requester.
//! - [`InvalidField`] thrown when a field fails validation.
//! - [`MissingRelation`] thrown when a row that must exist alongside another
//!   (a trip budget) is missing.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidField`]: EngineError::InvalidField
//!  [`MissingRelation`]: EngineError::MissingRelation
use api_types::ParseEnumError;
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Missing relation: {0}")]
    MissingRelation(String),
    #[error("Crypto failure: {0}")]
    Crypto(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<ParseEnumError> for EngineError {
    fn from(value: ParseEnumError) -> Self {
        Self::InvalidField {
            field: value.kind.to_string(),
            reason: format!("unknown value '{}'", value.value),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (
                Self::InvalidField {
                    field: fa,
                    reason: ra,
                },
                Self::InvalidField {
                    field: fb,
                    reason: rb,
                },
            ) => fa == fb && ra == rb,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidCredentials, Self::InvalidCredentials) => true,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::MissingRelation(a), Self::MissingRelation(b)) => a == b,
            (Self::Crypto(a), Self::Crypto(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
