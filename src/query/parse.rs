use crate::types::QueryParams;
use serde_json::{Map, Value};

use super::types::{
    COMPARISON_OPERATORS, DEFAULT_PAGE, EXCLUDED_KEYS, FilterExpr, MAX_PROJECTION_FIELDS,
    MAX_SORT_FIELDS, Order, PageDefaults, Pagination, Projection, QueryPlan, SortSpec,
};

/// Build the filter expression: drop control keys and tag comparison operators.
///
/// Unknown inner keys are kept as they are; whether they mean anything is up to the store.
#[must_use]
pub fn build_filter(params: &QueryParams) -> FilterExpr {
    params
        .iter()
        .filter(|(key, _)| !EXCLUDED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), tag_operators(value)))
        .collect()
}

fn tag_operators(value: &Value) -> Value {
    match value {
        Value::Object(inner) => Value::Object(
            inner.iter().map(|(op, operand)| (operator_key(op), operand.clone())).collect::<Map<_, _>>(),
        ),
        scalar => scalar.clone(),
    }
}

fn operator_key(op: &str) -> String {
    if COMPARISON_OPERATORS.contains(&op) { format!("${op}") } else { op.to_string() }
}

#[must_use]
pub fn build_plan(params: &QueryParams) -> QueryPlan {
    build_plan_with(params, &PageDefaults::default())
}

/// Same as `build_plan`, with caller-supplied page size defaults.
#[must_use]
pub fn build_plan_with(params: &QueryParams, defaults: &PageDefaults) -> QueryPlan {
    let page = positive_int(params.get("page")).unwrap_or(DEFAULT_PAGE);
    let limit = positive_int(params.get("limit"))
        .unwrap_or(defaults.limit)
        .min(defaults.max_limit)
        .max(1);
    QueryPlan {
        filter: build_filter(params),
        sort: params.get("sort").and_then(parse_sort),
        projection: params.get("fields").and_then(parse_fields).unwrap_or_default(),
        pagination: Pagination { page, limit },
    }
}

fn parse_sort(value: &Value) -> Option<Vec<SortSpec>> {
    let specs: Vec<SortSpec> = field_list(value)
        .into_iter()
        .take(MAX_SORT_FIELDS)
        .map(|f| match f.strip_prefix('-') {
            Some(name) => SortSpec { field: name.to_string(), order: Order::Desc },
            None => SortSpec { field: f, order: Order::Asc },
        })
        .filter(|s| !s.field.is_empty())
        .collect();
    if specs.is_empty() { None } else { Some(specs) }
}

fn parse_fields(value: &Value) -> Option<Projection> {
    let mut projection = Projection { include: Vec::new(), exclude: Vec::new() };
    for f in field_list(value).into_iter().take(MAX_PROJECTION_FIELDS) {
        match f.strip_prefix('-') {
            Some("") => {}
            Some(name) => projection.exclude.push(name.to_string()),
            None => projection.include.push(f),
        }
    }
    if projection.include.is_empty() && projection.exclude.is_empty() {
        None
    } else {
        Some(projection)
    }
}

// Comma or whitespace separated names; repeated keys arrive as arrays and are flattened.
fn field_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        Value::Array(items) => items.iter().flat_map(field_list).collect(),
        _ => Vec::new(),
    }
}

fn positive_int(value: Option<&Value>) -> Option<usize> {
    let n = match value? {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    usize::try_from(n).ok().filter(|n| *n >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(v: Value) -> QueryParams {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn control_keys_are_dropped() {
        let q = params(json!({"page": 1, "sort": "asc", "limit": 10, "fields": "name", "name": "test"}));
        assert_eq!(Value::Object(build_filter(&q)), json!({"name": "test"}));
    }

    #[test]
    fn comparison_operators_are_tagged() {
        let q = params(json!({"price": {"gte": 10, "lte": 100}}));
        assert_eq!(Value::Object(build_filter(&q)), json!({"price": {"$gte": 10, "$lte": 100}}));
    }

    #[test]
    fn unknown_inner_keys_pass_through() {
        let q = params(json!({"price": {"ne": 5, "gt": "7"}}));
        assert_eq!(Value::Object(build_filter(&q)), json!({"price": {"ne": 5, "$gt": "7"}}));
    }

    #[test]
    fn sort_fields_and_pages() {
        let q = params(json!({"sort": "price,-ratingsAverage", "fields": "name,price", "page": "3", "limit": "5"}));
        let plan = build_plan(&q);
        assert_eq!(
            plan.sort,
            Some(vec![
                SortSpec { field: "price".into(), order: Order::Asc },
                SortSpec { field: "ratingsAverage".into(), order: Order::Desc },
            ])
        );
        assert_eq!(plan.projection.include, vec!["name".to_string(), "price".to_string()]);
        assert_eq!(plan.pagination.skip(), 10);
        assert!(plan.filter.is_empty());
    }

    #[test]
    fn malformed_pages_fall_back() {
        let plan = build_plan(&params(json!({"page": 0, "limit": "abc"})));
        assert_eq!(plan.pagination, Pagination::default());
        let capped = build_plan_with(&params(json!({"limit": 50})), &PageDefaults { limit: 20, max_limit: 30 });
        assert_eq!(capped.pagination.limit, 30);
    }
}
