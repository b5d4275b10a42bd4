use super::TourStore;
use super::schema::{Schema, TOUR_SCHEMA};
use super::wal::{Operation, Wal, decode_document, encode_document};
use crate::document::Document;
use crate::errors::DbError;
use crate::query::{
    FilterExpr, FindOptions, MAX_LIMIT, Queryable, check_filter, compare_docs, matches, project_fields,
};
use crate::types::{BodyFields, CollectionName, DocumentId};
use async_trait::async_trait;
use bson::Document as BsonDocument;
use parking_lot::{Mutex, RwLock};
use std::path::Path;

/// Schema-validated collection held in memory, optionally backed by a write-ahead log.
///
/// Documents keep insertion order, which is the result order when no sort is given.
pub struct MemoryStore {
    name: CollectionName,
    schema: &'static Schema,
    docs: RwLock<Vec<Document>>,
    wal: Option<Mutex<Wal>>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("name", &self.name)
            .field("docs", &self.docs.read().len())
            .field("wal", &self.wal)
            .finish()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty, non-persistent tour collection.
    #[must_use]
    pub fn new() -> Self {
        Self { name: "tours".into(), schema: &TOUR_SCHEMA, docs: RwLock::new(Vec::new()), wal: None }
    }

    /// Opens (or creates) a log-backed tour collection, replaying the log into memory.
    ///
    /// # Errors
    /// Returns an error if the log cannot be opened or holds a corrupt record.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let mut wal = Wal::open(path)?;
        let docs = replay(wal.read_all()?)?;
        log::info!("opened {} with {} documents", wal.path().display(), docs.len());
        Ok(Self { name: "tours".into(), schema: &TOUR_SCHEMA, docs: RwLock::new(docs), wal: Some(Mutex::new(wal)) })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }

    fn log_op(&self, op: &Operation) -> Result<(), DbError> {
        match &self.wal {
            Some(wal) => wal.lock().append(op),
            None => Ok(()),
        }
    }
}

fn replay(ops: Vec<Operation>) -> Result<Vec<Document>, DbError> {
    let mut docs: Vec<Document> = Vec::new();
    for op in ops {
        match op {
            Operation::Insert { id, data } => docs.push(Document::with_id(id, decode_document(&data)?)),
            Operation::Update { id, data } => {
                let data = decode_document(&data)?;
                if let Some(doc) = docs.iter_mut().find(|d| d.id == id) {
                    doc.data = data;
                }
            }
            Operation::Delete { id } => docs.retain(|d| d.id != id),
        }
    }
    Ok(docs)
}

#[async_trait]
impl Queryable for MemoryStore {
    async fn find(&self, filter: &FilterExpr, opts: &FindOptions) -> Result<Vec<BsonDocument>, DbError> {
        let cast = self.schema.cast_filter(filter)?;
        check_filter(&cast)?;
        if let Some(p) = &opts.projection
            && p.is_mixed()
        {
            return Err(DbError::QueryError("Projection cannot have a mix of inclusion and exclusion.".into()));
        }

        let mut matched = Vec::new();
        for doc in self.docs.read().iter() {
            let view = doc.to_bson();
            if matches(&view, &cast)? {
                matched.push(view);
            }
        }
        if let Some(sort) = &opts.sort {
            matched.sort_by(|a, b| compare_docs(a, b, sort));
        }

        let skip = opts.skip.unwrap_or(0);
        let limit = opts.limit.unwrap_or(usize::MAX).min(MAX_LIMIT);
        let mut page: Vec<BsonDocument> = matched.into_iter().skip(skip).take(limit).collect();
        if let Some(p) = &opts.projection {
            for d in &mut page {
                *d = project_fields(d, p);
            }
        }
        Ok(page)
    }
}

#[async_trait]
impl TourStore for MemoryStore {
    fn collection_name(&self) -> &str {
        &self.name
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, DbError> {
        let id = DocumentId::parse(id)?;
        Ok(self.docs.read().iter().find(|d| d.id == id).cloned())
    }

    async fn create(&self, fields: &BodyFields) -> Result<Document, DbError> {
        let data = self.schema.validate_create(fields)?;
        let doc = Document::new(data);
        let mut docs = self.docs.write();
        self.log_op(&Operation::Insert { id: doc.id.clone(), data: encode_document(&doc.data)? })?;
        docs.push(doc.clone());
        log::debug!("{}: inserted {}", self.name, doc.id);
        Ok(doc)
    }

    async fn find_by_id_and_update(
        &self,
        id: &str,
        fields: &BodyFields,
    ) -> Result<Option<Document>, DbError> {
        let id = DocumentId::parse(id)?;
        let mut docs = self.docs.write();
        let Some(doc) = docs.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        let changes = self.schema.validate_update(fields, &doc.data)?;
        let mut updated = doc.clone();
        updated.update(changes);
        self.log_op(&Operation::Update { id: id.clone(), data: encode_document(&updated.data)? })?;
        *doc = updated.clone();
        log::debug!("{}: updated {id}", self.name);
        Ok(Some(updated))
    }

    async fn find_by_id_and_delete(&self, id: &str) -> Result<Option<Document>, DbError> {
        let id = DocumentId::parse(id)?;
        let mut docs = self.docs.write();
        let Some(pos) = docs.iter().position(|d| d.id == id) else {
            return Ok(None);
        };
        self.log_op(&Operation::Delete { id: id.clone() })?;
        log::debug!("{}: deleted {id}", self.name);
        Ok(Some(docs.remove(pos)))
    }
}
