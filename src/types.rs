use crate::errors::DbError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub type CollectionName = String;

/// Decoded query-string parameters, e.g. `price[gte]=10` as `{"price": {"gte": 10}}`.
pub type QueryParams = serde_json::Map<String, serde_json::Value>;

/// Request body fields for create/update.
pub type BodyFields = serde_json::Map<String, serde_json::Value>;

/// A wrapper around `uuid::Uuid` to ensure Bincode serialization compatibility.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// # Errors
    /// Returns `DbError::InvalidDocumentId` when `s` is not a well-formed id.
    pub fn parse(s: &str) -> Result<Self, DbError> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| DbError::InvalidDocumentId(s.to_string()))
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = DbError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
