// Submodules for separation of concerns
mod eval;
mod exec;
mod parse;
mod types;

pub use eval::{check_filter, compare_bson, compare_docs, get_path, matches, project_fields};
pub use exec::{Queryable, execute};
pub use parse::{build_filter, build_plan, build_plan_with};
pub use types::{
    COMPARISON_OPERATORS, DEFAULT_LIMIT, DEFAULT_PAGE, EXCLUDED_KEYS, FilterExpr, FindOptions,
    INTERNAL_FIELDS, MAX_LIMIT, Order, PageDefaults, Pagination, Projection, QueryPlan, SortSpec,
};
