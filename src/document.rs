use crate::types::DocumentId;
use bson::{Bson, Document as BsonDocument};

/// Version key written on insert; treated as internal and hidden from list results.
pub const VERSION_KEY: &str = "__v";
pub const ID_KEY: &str = "_id";

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub data: BsonDocument,
}

impl Document {
    pub fn new(data: BsonDocument) -> Self {
        Self::with_id(DocumentId::new(), data)
    }

    pub fn with_id(id: DocumentId, mut data: BsonDocument) -> Self {
        data.remove(ID_KEY);
        if !data.contains_key(VERSION_KEY) {
            data.insert(VERSION_KEY, 0_i32);
        }
        Self { id, data }
    }

    /// Merge `fields` over the current data, keeping the id and version key.
    pub fn update(&mut self, fields: BsonDocument) {
        for (k, v) in fields {
            if k != ID_KEY && k != VERSION_KEY {
                self.data.insert(k, v);
            }
        }
    }

    /// Full BSON view with `_id` first, as seen by filters, sorting and callers.
    #[must_use]
    pub fn to_bson(&self) -> BsonDocument {
        let mut out = BsonDocument::new();
        out.insert(ID_KEY, Bson::String(self.id.to_string()));
        for (k, v) in &self.data {
            out.insert(k.clone(), v.clone());
        }
        out
    }
}
