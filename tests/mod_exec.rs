use bson::doc;
use serde_json::json;
use tour_lite::errors::DbError;
use tour_lite::query::{Projection, build_plan, execute};

mod common;
use common::{Call, MockStore, obj};

#[tokio::test]
async fn filter_reaches_store_unchanged() {
    let store = MockStore::new();
    store.expect_docs(Ok(vec![doc! {"name": "The Forest Hiker"}]));
    let plan = build_plan(&obj(json!({"price": {"lt": 1000}, "difficulty": "easy", "page": 2, "limit": 3, "sort": "-price"})));

    let docs = execute(&store, &plan).await.unwrap();
    assert_eq!(docs.len(), 1);

    let calls = store.calls();
    assert_eq!(calls.len(), 1);
    let Call::Find { filter, opts } = &calls[0] else { panic!("expected find, got {:?}", calls[0]) };
    assert_eq!(filter, &plan.filter);
    assert_eq!(opts.skip, Some(3));
    assert_eq!(opts.limit, Some(3));
    assert_eq!(opts.sort, plan.sort);
    assert_eq!(opts.projection, Some(Projection::internal_hidden()));
    store.verify();
}

#[tokio::test]
async fn empty_result_is_success() {
    let store = MockStore::new();
    store.expect_docs(Ok(Vec::new()));
    let docs = execute(&store, &build_plan(&obj(json!({"name": "nothing"})))).await.unwrap();
    assert!(docs.is_empty());
}

#[tokio::test]
async fn store_error_is_propagated() {
    let store = MockStore::new();
    store.expect_docs(Err(DbError::QueryError("unknown operator: $regex".into())));
    let err = execute(&store, &build_plan(&obj(json!({})))).await.unwrap_err();
    assert!(matches!(err, DbError::QueryError(ref m) if m == "unknown operator: $regex"));
}
