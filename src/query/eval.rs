use crate::document::ID_KEY;
use crate::errors::DbError;
use bson::{Bson, Document as BsonDocument};
use std::cmp::Ordering;

use super::types::{MAX_IN_SET, MAX_PATH_DEPTH, MAX_SORT_FIELDS, Order, Projection, SortSpec};

/// Evaluate a (cast) filter expression against a document.
///
/// # Errors
/// Returns `DbError::QueryError` for unknown `$` operators, operators mixed with plain keys,
/// and malformed `$in`/`$nin`/`$exists` operands.
pub fn matches(doc: &BsonDocument, filter: &BsonDocument) -> Result<bool, DbError> {
    for (path, cond) in filter {
        if !match_condition(get_path(doc, path), cond)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn match_condition(value: Option<&Bson>, cond: &Bson) -> Result<bool, DbError> {
    if let Bson::Document(ops) = cond
        && is_operator_doc(ops)?
    {
        for (op, operand) in ops {
            if !apply_operator(value, op, operand)? {
                return Ok(false);
            }
        }
        return Ok(true);
    }
    Ok(value.is_some_and(|v| equals_or_contains(v, cond)))
}

/// Validate a whole filter up front so errors surface even on an empty collection.
///
/// # Errors
/// Same conditions as `matches`.
pub fn check_filter(filter: &BsonDocument) -> Result<(), DbError> {
    for (_, cond) in filter {
        if let Bson::Document(ops) = cond
            && is_operator_doc(ops)?
        {
            for (op, operand) in ops {
                apply_operator(None, op, operand)?;
            }
        }
    }
    Ok(())
}

fn is_operator_doc(d: &BsonDocument) -> Result<bool, DbError> {
    let tagged = d.keys().filter(|k| k.starts_with('$')).count();
    if tagged == 0 {
        return Ok(false);
    }
    if tagged != d.len() {
        return Err(DbError::QueryError("cannot mix operators with plain fields".into()));
    }
    Ok(true)
}

fn apply_operator(value: Option<&Bson>, op: &str, operand: &Bson) -> Result<bool, DbError> {
    let ord_is = |accept: fn(Ordering) -> bool| {
        value.is_some_and(|v| any_element(v, |x| bson_cmp(x, operand).is_some_and(accept)))
    };
    Ok(match op {
        "$eq" => value.is_some_and(|v| equals_or_contains(v, operand)),
        "$ne" => !value.is_some_and(|v| equals_or_contains(v, operand)),
        "$gt" => ord_is(|o| o == Ordering::Greater),
        "$gte" => ord_is(|o| o != Ordering::Less),
        "$lt" => ord_is(|o| o == Ordering::Less),
        "$lte" => ord_is(|o| o != Ordering::Greater),
        "$in" => {
            let set = set_operand(op, operand)?;
            value.is_some_and(|v| in_set(v, set))
        }
        "$nin" => {
            let set = set_operand(op, operand)?;
            !value.is_some_and(|v| in_set(v, set))
        }
        "$exists" => match operand {
            Bson::Boolean(b) => value.is_some() == *b,
            _ => return Err(DbError::QueryError("$exists requires a boolean".into())),
        },
        other => return Err(DbError::QueryError(format!("unknown operator: {other}"))),
    })
}

fn set_operand<'a>(op: &str, operand: &'a Bson) -> Result<&'a [Bson], DbError> {
    match operand {
        Bson::Array(items) => Ok(&items[..items.len().min(MAX_IN_SET)]),
        _ => Err(DbError::QueryError(format!("{op} needs an array"))),
    }
}

fn in_set(v: &Bson, set: &[Bson]) -> bool {
    set.iter().any(|x| equals_or_contains(v, x))
}

fn any_element(v: &Bson, pred: impl Fn(&Bson) -> bool) -> bool {
    match v {
        Bson::Array(items) => items.iter().any(pred),
        other => pred(other),
    }
}

// Array fields match when the whole array or any element equals the operand.
fn equals_or_contains(v: &Bson, operand: &Bson) -> bool {
    bson_equal(v, operand) || matches!(v, Bson::Array(items) if items.iter().any(|x| bson_equal(x, operand)))
}

pub fn get_path<'a>(doc: &'a BsonDocument, path: &str) -> Option<&'a Bson> {
    if path.is_empty() || path.len() > 1024 {
        return None;
    }
    let mut parts = path.split('.');
    let mut cur = doc.get(parts.next()?);
    for (depth, part) in parts.enumerate() {
        if depth + 1 >= MAX_PATH_DEPTH {
            return None;
        }
        match cur {
            Some(Bson::Document(d)) => cur = d.get(part),
            _ => return None,
        }
    }
    cur
}

#[allow(clippy::cast_precision_loss)]
fn to_f64(b: &Bson) -> Option<f64> {
    match b {
        Bson::Int32(i) => Some(f64::from(*i)),
        Bson::Int64(i) => Some(*i as f64),
        Bson::Double(f) => Some(*f),
        _ => None,
    }
}

#[allow(clippy::float_cmp)]
fn bson_equal(a: &Bson, b: &Bson) -> bool {
    match (to_f64(a), to_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Ordering between values of the same class (numbers, strings, booleans, dates); `None` otherwise.
fn bson_cmp(a: &Bson, b: &Bson) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (to_f64(a), to_f64(b)) {
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Total order used for sorting: same-class values compare naturally, mixed classes by type rank.
pub fn compare_bson(a: &Bson, b: &Bson) -> Ordering {
    bson_cmp(a, b).unwrap_or_else(|| type_rank(a).cmp(&type_rank(b)))
}

fn type_rank(v: &Bson) -> u8 {
    match v {
        Bson::MinKey => 0,
        Bson::Null | Bson::Undefined => 1,
        Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) | Bson::Decimal128(_) => 2,
        Bson::String(_) | Bson::Symbol(_) => 3,
        Bson::Document(_) => 4,
        Bson::Array(_) => 5,
        Bson::Binary(_) => 6,
        Bson::ObjectId(_) => 7,
        Bson::Boolean(_) => 8,
        Bson::DateTime(_) => 9,
        Bson::Timestamp(_) => 10,
        Bson::RegularExpression(_) => 11,
        Bson::MaxKey => 255,
        _ => 12,
    }
}

pub fn compare_docs(a: &BsonDocument, b: &BsonDocument, sort: &[SortSpec]) -> Ordering {
    for s in sort.iter().take(MAX_SORT_FIELDS) {
        let ord = match (get_path(a, &s.field), get_path(b, &s.field)) {
            (Some(x), Some(y)) => compare_bson(x, y),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return if s.order == Order::Asc { ord } else { ord.reverse() };
        }
    }
    Ordering::Equal
}

/// Apply a non-mixed projection. `_id` survives inclusion unless explicitly excluded.
pub fn project_fields(doc: &BsonDocument, projection: &Projection) -> BsonDocument {
    let drop_id = projection.exclude.iter().any(|f| f == ID_KEY);
    if projection.include.is_empty() {
        let mut out = doc.clone();
        for f in &projection.exclude {
            out.remove(f);
        }
        return out;
    }
    let mut out = BsonDocument::new();
    if !drop_id && let Some(id) = doc.get(ID_KEY) {
        out.insert(ID_KEY, id.clone());
    }
    for f in &projection.include {
        if let Some(v) = doc.get(f) {
            out.insert(f.clone(), v.clone());
        }
    }
    out
}
