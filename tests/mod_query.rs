use serde_json::{Value, json};
use tour_lite::query::{
    Order, PageDefaults, Pagination, Projection, SortSpec, build_filter, build_plan, build_plan_with,
};

mod common;
use common::obj;

#[test]
fn only_control_keys_yield_empty_filter() {
    let plan = build_plan(&obj(json!({"page": 2, "sort": "price", "limit": 3, "fields": "name"})));
    assert!(plan.filter.is_empty());
}

#[test]
fn control_keys_are_removed_from_mixed_query() {
    let q = obj(json!({"page": 1, "sort": "asc", "limit": 10, "fields": "name", "name": "test"}));
    assert_eq!(Value::Object(build_filter(&q)), json!({"name": "test"}));
}

#[test]
fn range_becomes_operator_markers() {
    let q = obj(json!({"price": {"gte": 10, "lte": 100}}));
    assert_eq!(Value::Object(build_filter(&q)), json!({"price": {"$gte": 10, "$lte": 100}}));
}

#[test]
fn scalar_fields_coexist_with_comparisons() {
    let q = obj(json!({"difficulty": "easy", "duration": {"gt": "4", "lt": 9}, "limit": 2}));
    assert_eq!(
        Value::Object(build_filter(&q)),
        json!({"difficulty": "easy", "duration": {"$gt": "4", "$lt": 9}})
    );
}

#[test]
fn malformed_operator_values_are_forwarded() {
    let q = obj(json!({"price": {"gte": "cheap"}}));
    assert_eq!(Value::Object(build_filter(&q)), json!({"price": {"$gte": "cheap"}}));
}

#[test]
fn default_plan_hides_version_key() {
    let plan = build_plan(&obj(json!({})));
    assert_eq!(plan.projection, Projection::internal_hidden());
    assert!(plan.projection.exclude.contains(&"__v".to_string()));
    assert_eq!(plan.sort, None);
    assert_eq!(plan.pagination, Pagination { page: 1, limit: 100 });
}

#[test]
fn repeated_sort_keys_are_flattened() {
    let plan = build_plan(&obj(json!({"sort": ["price", "-ratingsAverage name"]})));
    assert_eq!(
        plan.sort,
        Some(vec![
            SortSpec { field: "price".into(), order: Order::Asc },
            SortSpec { field: "ratingsAverage".into(), order: Order::Desc },
            SortSpec { field: "name".into(), order: Order::Asc },
        ])
    );
}

#[test]
fn exclusion_fields_and_mixed_projection() {
    let excl = build_plan(&obj(json!({"fields": "-description,-images"})));
    assert!(excl.projection.include.is_empty());
    assert_eq!(excl.projection.exclude, vec!["description".to_string(), "images".to_string()]);
    assert!(!excl.projection.is_mixed());

    let mixed = build_plan(&obj(json!({"fields": "name,-price"})));
    assert!(mixed.projection.is_mixed());

    let keep_id_out = build_plan(&obj(json!({"fields": "name,-_id"})));
    assert!(!keep_id_out.projection.is_mixed());
}

#[test]
fn page_and_limit_accept_numeric_strings() {
    let plan = build_plan(&obj(json!({"page": "2", "limit": "5"})));
    assert_eq!(plan.pagination, Pagination { page: 2, limit: 5 });
    assert_eq!(plan.pagination.skip(), 5);
}

#[test]
fn limit_is_capped_by_defaults() {
    let defaults = PageDefaults { limit: 10, max_limit: 25 };
    assert_eq!(build_plan_with(&obj(json!({})), &defaults).pagination.limit, 10);
    assert_eq!(build_plan_with(&obj(json!({"limit": 500})), &defaults).pagination.limit, 25);
    assert_eq!(build_plan_with(&obj(json!({"limit": -3})), &defaults).pagination.limit, 10);
}
