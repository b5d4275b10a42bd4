//! Shared test helpers: an expectation-driven store double and tour fixtures.
#![allow(dead_code)]

use async_trait::async_trait;
use bson::Document as BsonDocument;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::VecDeque;
use tour_lite::document::Document;
use tour_lite::errors::DbError;
use tour_lite::query::{FilterExpr, FindOptions, Queryable};
use tour_lite::store::TourStore;
use tour_lite::types::BodyFields;
use tour_lite::utils::json::json_map_to_bson_document;

/// Queued reply for the next store call.
pub enum Reply {
    Docs(Result<Vec<BsonDocument>, DbError>),
    One(Result<Option<Document>, DbError>),
}

/// A call the controller made on the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Find { filter: FilterExpr, opts: FindOptions },
    FindById(String),
    Create(BodyFields),
    Update(String, BodyFields),
    Delete(String),
}

/// Store double: replies are consumed in order; every call is recorded.
#[derive(Default)]
pub struct MockStore {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Call>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_docs(&self, res: Result<Vec<BsonDocument>, DbError>) -> &Self {
        self.replies.lock().push_back(Reply::Docs(res));
        self
    }

    pub fn expect_one(&self, res: Result<Option<Document>, DbError>) -> &Self {
        self.replies.lock().push_back(Reply::One(res));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Panics if queued replies were left unused.
    pub fn verify(&self) {
        assert!(self.replies.lock().is_empty(), "not all expected store calls were made");
    }

    fn next_docs(&self) -> Result<Vec<BsonDocument>, DbError> {
        match self.replies.lock().pop_front() {
            Some(Reply::Docs(r)) => r,
            Some(Reply::One(_)) => panic!("expected a single-document call, got find"),
            None => Ok(Vec::new()),
        }
    }

    fn next_one(&self) -> Result<Option<Document>, DbError> {
        match self.replies.lock().pop_front() {
            Some(Reply::One(r)) => r,
            Some(Reply::Docs(_)) => panic!("expected find, got a single-document call"),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl Queryable for MockStore {
    async fn find(&self, filter: &FilterExpr, opts: &FindOptions) -> Result<Vec<BsonDocument>, DbError> {
        self.calls.lock().push(Call::Find { filter: filter.clone(), opts: opts.clone() });
        self.next_docs()
    }
}

#[async_trait]
impl TourStore for MockStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Document>, DbError> {
        self.calls.lock().push(Call::FindById(id.to_string()));
        self.next_one()
    }

    async fn create(&self, fields: &BodyFields) -> Result<Document, DbError> {
        self.calls.lock().push(Call::Create(fields.clone()));
        match self.next_one()? {
            Some(doc) => Ok(doc),
            None => Ok(Document::new(json_map_to_bson_document(fields))),
        }
    }

    async fn find_by_id_and_update(
        &self,
        id: &str,
        fields: &BodyFields,
    ) -> Result<Option<Document>, DbError> {
        self.calls.lock().push(Call::Update(id.to_string(), fields.clone()));
        self.next_one()
    }

    async fn find_by_id_and_delete(&self, id: &str) -> Result<Option<Document>, DbError> {
        self.calls.lock().push(Call::Delete(id.to_string()));
        self.next_one()
    }
}

pub fn obj(v: Value) -> serde_json::Map<String, Value> {
    match v {
        Value::Object(m) => m,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A tour body that passes schema validation.
pub fn tour_body(name: &str, price: i64, difficulty: &str) -> BodyFields {
    obj(json!({
        "name": name,
        "duration": 5,
        "maxGroupSize": 25,
        "difficulty": difficulty,
        "price": price,
        "summary": "  Breathtaking hike through the Canadian Banff National Park  ",
        "imageCover": "tour-1-cover.jpg",
        "startDates": ["2021-04-25", "2021-07-20"]
    }))
}
