//! # Errors
//!
//! dog-flags uses one structured error type for every fallible operation.
//! The shape follows DogRS' Feathers-style errors:
//! - a kind that maps onto an HTTP status code and a class name
//! - an optional `errors` payload for field-level details
//! - an optional inner `source` that never leaves the process
//!
//! Lookup misses (`NotFound`) are expected and handleable. Persistence faults
//! (`Storage`) are surfaced to the caller unmodified; retry policy belongs to
//! the storage adapter.

use std::fmt;

use anyhow::Error as AnyError;
use serde_json::Value;

/// Result type for all dog-flags operations.
pub type FlagResult<T> = std::result::Result<T, FlagError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,       // 400
    NotAuthenticated, // 401
    Forbidden,        // 403
    NotFound,         // 404
    Storage,          // 500
}

impl ErrorKind {
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NotAuthenticated => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Storage => 500,
        }
    }

    /// Feathers error `name` used on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "BadRequest",
            ErrorKind::NotAuthenticated => "NotAuthenticated",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Storage => "GeneralError",
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "bad-request",
            ErrorKind::NotAuthenticated => "not-authenticated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Storage => "general-error",
        }
    }
}

#[derive(Debug)]
pub struct FlagError {
    pub kind: ErrorKind,
    pub message: String,
    pub errors: Option<Value>,
    pub source: Option<AnyError>,
}

impl FlagError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            errors: None,
            source: None,
        }
    }

    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_source(mut self, source: impl Into<AnyError>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }

    /// Recover a `FlagError` from an `anyhow::Error`, wrapping anything
    /// else as a storage fault.
    pub fn normalize(err: AnyError) -> FlagError {
        match err.downcast::<FlagError>() {
            Ok(flag) => flag,
            Err(other) => FlagError::storage(other.to_string()).with_source(other),
        }
    }

    /// Copy without the inner `source`, safe to hand to clients.
    pub fn sanitize_for_client(&self) -> FlagError {
        FlagError {
            kind: self.kind,
            message: self.message.clone(),
            errors: self.errors.clone(),
            source: None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut base = serde_json::json!({
            "name": self.name(),
            "message": self.message,
            "code": self.code(),
            "className": self.class_name(),
        });

        if let Some(e) = &self.errors {
            base["errors"] = e.clone();
        }
        base
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, msg)
    }
    pub fn not_authenticated(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAuthenticated, msg)
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, msg)
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, msg)
    }
}

impl fmt::Display for FlagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name(), self.code(), self.message)
    }
}

impl std::error::Error for FlagError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Reject blank identifiers before they reach storage.
pub(crate) fn require_id<'a>(field: &'static str, value: &'a str) -> FlagResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FlagError::validation(format!("{field} must not be empty"))
            .with_errors(serde_json::json!({ field: ["required"] })));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_faults_hide_their_source_from_clients() {
        let err = FlagError::storage("connection reset").with_source(anyhow::anyhow!("socket closed"));
        assert!(err.source.is_some());

        let safe = err.sanitize_for_client();
        assert!(safe.source.is_none());
        assert_eq!(safe.to_json()["className"], "general-error");
        assert_eq!(safe.code(), 500);
    }

    #[test]
    fn normalize_keeps_flag_errors_lossless() {
        let wrapped = anyhow::Error::new(FlagError::not_found("Feature not found: x"));
        let err = FlagError::normalize(wrapped);
        assert!(err.is_not_found());
        assert_eq!(err.message, "Feature not found: x");

        let other = FlagError::normalize(anyhow::anyhow!("disk full"));
        assert_eq!(other.kind, ErrorKind::Storage);
    }

    #[test]
    fn kinds_map_to_wire_status_and_name() {
        let cases = [
            (FlagError::validation("x"), 400, "BadRequest"),
            (FlagError::not_authenticated("x"), 401, "NotAuthenticated"),
            (FlagError::forbidden("x"), 403, "Forbidden"),
            (FlagError::not_found("x"), 404, "NotFound"),
            (FlagError::storage("x"), 500, "GeneralError"),
        ];
        for (err, code, name) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(err.to_json()["name"], name);
        }
    }

    #[test]
    fn blank_ids_are_rejected() {
        let err = require_id("featureId", "   ").unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.to_json()["errors"]["featureId"][0], "required");
        assert_eq!(require_id("featureId", " dark-mode ").unwrap(), "dark-mode");
    }
}
