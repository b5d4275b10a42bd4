use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("Encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Cast to {kind} failed for value {value} at path \"{path}\"")]
    Cast { kind: String, value: String, path: String },

    #[error("Invalid document ID: {0}")]
    InvalidDocumentId(String),

    #[error("Document not found: {0}")]
    NoSuchDocument(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("WAL error: {0}")]
    WalError(String),

    #[error("Query error: {0}")]
    QueryError(String),
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<toml::de::Error> for DbError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Coarse failure classes used by the controller to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Storage,
}

impl DbError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::InvalidDocumentId(_) | Self::NoSuchDocument(_) => ErrorKind::NotFound,
            Self::Io(_)
            | Self::Decode(_)
            | Self::Encode(_)
            | Self::Json(_)
            | Self::Config(_)
            | Self::Cast { .. }
            | Self::Storage(_)
            | Self::WalError(_)
            | Self::QueryError(_) => ErrorKind::Storage,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::Cast { .. } => "CastError",
            Self::InvalidDocumentId(_) | Self::NoSuchDocument(_) => "NotFoundError",
            Self::Config(_) => "ConfigError",
            _ => "StorageError",
        }
    }

    /// The error object as it appears in a failure envelope's `message`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Validation(v) => json!({
                "name": self.name(),
                "message": v.message,
                "errors": v.errors,
            }),
            Self::Cast { kind, value, path } => json!({
                "name": self.name(),
                "message": self.to_string(),
                "kind": kind,
                "value": value,
                "path": path,
            }),
            _ => json!({ "name": self.name(), "message": self.to_string() }),
        }
    }
}

/// Rule that a single field broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationKind {
    Required,
    Enum,
    MinLength,
    MaxLength,
    Min,
    Max,
    Cast,
    #[serde(rename = "user defined")]
    UserDefined,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub kind: ViolationKind,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Every field-level violation found while validating one document.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub errors: BTreeMap<String, FieldViolation>,
}

impl ValidationError {
    #[must_use]
    pub fn new(model: &str, errors: BTreeMap<String, FieldViolation>) -> Self {
        let detail = errors
            .iter()
            .map(|(path, v)| format!("{path}: {}", v.message))
            .collect::<Vec<_>>()
            .join(", ");
        Self { message: format!("{model} validation failed: {detail}"), errors }
    }

    #[must_use]
    pub fn has(&self, path: &str) -> bool {
        self.errors.contains_key(path)
    }
}
