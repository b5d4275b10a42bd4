use crate::errors::DbError;
use async_trait::async_trait;
use bson::Document as BsonDocument;
use std::time::Instant;

use super::types::{FilterExpr, FindOptions, QueryPlan};

const SLOW_QUERY_MS: u128 = 500;

/// The store's query primitive: run a filter expression and return matching documents.
#[async_trait]
pub trait Queryable: Send + Sync {
    /// # Errors
    /// Implementations reject when the filter or options cannot be executed.
    async fn find(&self, filter: &FilterExpr, opts: &FindOptions) -> Result<Vec<BsonDocument>, DbError>;
}

/// Run a plan against a query handle.
///
/// The filter reaches the handle exactly as the translator built it. Failures from the
/// handle are returned unchanged.
///
/// # Errors
/// Whatever `handle.find` returns.
pub async fn execute<Q>(handle: &Q, plan: &QueryPlan) -> Result<Vec<BsonDocument>, DbError>
where
    Q: Queryable + ?Sized,
{
    let started = Instant::now();
    let opts = FindOptions::from(plan);
    let docs = handle.find(&plan.filter, &opts).await?;
    let dur_ms = started.elapsed().as_millis();
    log::debug!(
        "find filter_keys={:?} page={} limit={} results={} duration_ms={}",
        plan.filter.keys().collect::<Vec<_>>(),
        plan.pagination.page,
        plan.pagination.limit,
        docs.len(),
        dur_ms
    );
    if dur_ms > SLOW_QUERY_MS {
        log::warn!("slow query: {dur_ms} ms");
    }
    Ok(docs)
}
