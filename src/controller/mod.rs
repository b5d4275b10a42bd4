//! Resource controller for the tours collection.
//!
//! Each entry point turns request inputs into a store call and always answers with a
//! single `ApiResponse`; errors never escape.

mod envelope;

pub use envelope::{ApiResponse, ResponseEnvelope, Status};

use crate::config::ServiceConfig;
use crate::document::Document;
use crate::errors::{DbError, ErrorKind};
use crate::logger::AUDIT_TARGET;
use crate::query::{PageDefaults, build_plan_with, execute};
use crate::store::TourStore;
use crate::types::{BodyFields, QueryParams};
use crate::utils::json::document_to_json;
use serde_json::{Value, json};
use std::sync::Arc;

/// Which controller entry point produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    List,
    GetOne,
    Create,
    Update,
    Delete,
}

impl Verb {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::GetOne => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Status for a failed call: create answers 400, every other verb 404.
#[must_use]
pub const fn failure_status(verb: Verb, kind: ErrorKind) -> Status {
    match (verb, kind) {
        (Verb::Create, _) => Status::BadRequest,
        (
            Verb::List | Verb::GetOne | Verb::Update | Verb::Delete,
            ErrorKind::Validation | ErrorKind::NotFound | ErrorKind::Storage,
        ) => Status::NotFound,
    }
}

pub struct TourController<S: TourStore + ?Sized> {
    store: Arc<S>,
    defaults: PageDefaults,
}

impl<S: TourStore + ?Sized> Clone for TourController<S> {
    fn clone(&self) -> Self {
        Self { store: Arc::clone(&self.store), defaults: self.defaults }
    }
}

impl<S: TourStore + ?Sized> TourController<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store, defaults: PageDefaults::default() }
    }

    /// Controller whose page size and cap come from `cfg`.
    pub fn with_config(store: Arc<S>, cfg: &ServiceConfig) -> Self {
        Self { store, defaults: cfg.page_defaults() }
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    #[must_use]
    pub const fn page_defaults(&self) -> PageDefaults {
        self.defaults
    }

    pub async fn list(&self, params: &QueryParams) -> ApiResponse {
        let plan = build_plan_with(params, &self.defaults);
        match execute(self.store.as_ref(), &plan).await {
            Ok(docs) => {
                let tours: Vec<Value> = docs.iter().map(document_to_json).collect();
                ApiResponse::new(
                    Status::Ok,
                    ResponseEnvelope::listing(tours.len(), json!({ "tours": tours })),
                )
            }
            Err(e) => self.failure(Verb::List, &e),
        }
    }

    pub async fn get_one(&self, id: &str) -> ApiResponse {
        match self.store.find_by_id(id).await {
            Ok(doc) => ApiResponse::new(Status::Ok, tour_envelope(doc.as_ref())),
            Err(e) => self.failure(Verb::GetOne, &e),
        }
    }

    pub async fn create(&self, body: &BodyFields) -> ApiResponse {
        match self.store.create(body).await {
            Ok(doc) => {
                self.audit(Verb::Create, &doc);
                ApiResponse::new(Status::Created, tour_envelope(Some(&doc)))
            }
            Err(e) => self.failure(Verb::Create, &e),
        }
    }

    pub async fn update(&self, id: &str, body: &BodyFields) -> ApiResponse {
        match self.store.find_by_id_and_update(id, body).await {
            Ok(doc) => {
                if let Some(d) = &doc {
                    self.audit(Verb::Update, d);
                }
                ApiResponse::new(Status::Ok, tour_envelope(doc.as_ref()))
            }
            Err(e) => self.failure(Verb::Update, &e),
        }
    }

    pub async fn delete(&self, id: &str) -> ApiResponse {
        match self.store.find_by_id_and_delete(id).await {
            Ok(doc) => {
                if let Some(d) = &doc {
                    self.audit(Verb::Delete, d);
                }
                ApiResponse::new(Status::NoContent, ResponseEnvelope::success(Value::Null))
            }
            Err(e) => self.failure(Verb::Delete, &e),
        }
    }

    fn failure(&self, verb: Verb, err: &DbError) -> ApiResponse {
        let kind = err.kind();
        match kind {
            ErrorKind::Storage => {
                log::error!("{} {}: {err}", verb.as_str(), self.store.collection_name());
            }
            ErrorKind::Validation | ErrorKind::NotFound => {
                log::warn!("{} {}: {err}", verb.as_str(), self.store.collection_name());
            }
        }
        ApiResponse::new(failure_status(verb, kind), ResponseEnvelope::fail(err.to_json()))
    }

    fn audit(&self, verb: Verb, doc: &Document) {
        log::info!(
            target: AUDIT_TARGET,
            "op={} collection={} id={}",
            verb.as_str(),
            self.store.collection_name(),
            doc.id
        );
    }
}

fn tour_envelope(doc: Option<&Document>) -> ResponseEnvelope {
    let tour = doc.map_or(Value::Null, |d| document_to_json(&d.to_bson()));
    ResponseEnvelope::success(json!({ "tour": tour }))
}
