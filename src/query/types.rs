use crate::document::{ID_KEY, VERSION_KEY};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// Safety limits to prevent resource abuse
pub(crate) const MAX_PATH_DEPTH: usize = 32;
pub(crate) const MAX_IN_SET: usize = 1000;
pub(crate) const MAX_SORT_FIELDS: usize = 8;
pub(crate) const MAX_PROJECTION_FIELDS: usize = 64;
pub const MAX_LIMIT: usize = 10_000;

pub const DEFAULT_PAGE: usize = 1;
pub const DEFAULT_LIMIT: usize = 100;

/// Control keys consumed by the plan; never part of the filter expression.
pub const EXCLUDED_KEYS: [&str; 4] = ["page", "sort", "limit", "fields"];

/// Short comparison names accepted in query strings, rewritten to `$`-prefixed markers.
pub const COMPARISON_OPERATORS: [&str; 4] = ["gte", "gt", "lte", "lt"];

/// Fields hidden from list results unless explicitly selected.
pub const INTERNAL_FIELDS: [&str; 1] = [VERSION_KEY];

/// Predicate handed to the store: field name to scalar or `{"$op": value}` sub-expression.
pub type FilterExpr = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub order: Order,
}

/// Field selection. Inclusion and exclusion are mutually exclusive except for `_id`;
/// a plan carrying both is forwarded untouched and rejected by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Projection {
    #[must_use]
    pub fn internal_hidden() -> Self {
        Self { include: Vec::new(), exclude: INTERNAL_FIELDS.iter().map(|f| (*f).to_string()).collect() }
    }

    #[must_use]
    pub fn is_mixed(&self) -> bool {
        !self.include.is_empty() && self.exclude.iter().any(|f| f != ID_KEY)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::internal_hidden()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

impl Pagination {
    #[must_use]
    pub const fn skip(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: DEFAULT_PAGE, limit: DEFAULT_LIMIT }
    }
}

/// Defaults applied when `page`/`limit` are absent or malformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDefaults {
    pub limit: usize,
    pub max_limit: usize,
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self { limit: DEFAULT_LIMIT, max_limit: MAX_LIMIT }
    }
}

/// Per-request query plan derived from the raw query parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryPlan {
    pub filter: FilterExpr,
    pub sort: Option<Vec<SortSpec>>,
    pub projection: Projection,
    pub pagination: Pagination,
}

/// Options for `Queryable::find`.
///
/// Semantics:
/// - Sorting is applied before pagination; projection last.
/// - When `sort` is `None`, documents come back in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindOptions {
    pub projection: Option<Projection>,
    pub sort: Option<Vec<SortSpec>>,
    pub limit: Option<usize>,
    pub skip: Option<usize>,
}

impl From<&QueryPlan> for FindOptions {
    fn from(plan: &QueryPlan) -> Self {
        Self {
            projection: Some(plan.projection.clone()),
            sort: plan.sort.clone(),
            limit: Some(plan.pagination.limit),
            skip: Some(plan.pagination.skip()),
        }
    }
}
