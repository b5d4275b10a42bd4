//! Persistence collaborator: the store interface the controller depends on, and the
//! in-memory implementation used by the CLI and tests.

mod memory;
pub mod schema;
pub mod wal;

pub use memory::MemoryStore;
pub use schema::{Schema, TOUR_SCHEMA};
pub use wal::{Operation, Wal};

use crate::document::Document;
use crate::errors::DbError;
use crate::query::Queryable;
use crate::types::BodyFields;
use async_trait::async_trait;

/// Document store operations needed by the resource controller.
///
/// Ids arrive as raw strings; a malformed id is rejected with `DbError::InvalidDocumentId`,
/// while a well-formed id with no document yields `Ok(None)`.
#[async_trait]
pub trait TourStore: Queryable {
    fn collection_name(&self) -> &str {
        "tours"
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, DbError>;

    /// Validate and insert a new document.
    async fn create(&self, fields: &BodyFields) -> Result<Document, DbError>;

    /// Validate the given fields, apply them, and return the updated document.
    async fn find_by_id_and_update(
        &self,
        id: &str,
        fields: &BodyFields,
    ) -> Result<Option<Document>, DbError>;

    /// Remove a document. Removing a missing document is not an error.
    async fn find_by_id_and_delete(&self, id: &str) -> Result<Option<Document>, DbError>;
}
