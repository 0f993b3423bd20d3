//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when a payload is malformed or misses required input.
//! - [`KeyNotFound`] thrown when a manifest or an HBL lookup misses.
//! - [`EmptyInput`] thrown when the e-manifest compiler receives zero delivery orders.
//! - [`InvalidDocument`] thrown when a stored HBL tree fails to decode or encode.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`EmptyInput`]: EngineError::EmptyInput
//!  [`InvalidDocument`]: EngineError::InvalidDocument
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid payload: {0}")]
    Validation(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Empty input: {0}")]
    EmptyInput(String),
    #[error("Invalid stored document: {0}")]
    InvalidDocument(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::EmptyInput(a), Self::EmptyInput(b)) => a == b,
            (Self::InvalidDocument(a), Self::InvalidDocument(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
