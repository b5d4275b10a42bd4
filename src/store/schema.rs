//! Tour schema: casting, defaults and validation rules applied by the store.
//!
//! Bodies arrive as JSON; the schema casts each known field to its BSON type, drops unknown
//! fields, fills defaults on create, and collects every violation before failing. Filters are
//! cast with the same rules so `price[gte]=500` compares as a number.

use crate::errors::{DbError, FieldViolation, ValidationError, ViolationKind};
use crate::query::FilterExpr;
use crate::types::BodyFields;
use crate::utils::json::json_to_bson;
use bson::{Bson, Document as BsonDocument};
use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Date,
    StringArray,
    DateArray,
}

impl FieldType {
    const fn label(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Number => "Number",
            Self::Date => "Date",
            Self::StringArray => "[String]",
            Self::DateArray => "[Date]",
        }
    }

    const fn element(self) -> Self {
        match self {
            Self::StringArray => Self::String,
            Self::DateArray => Self::Date,
            scalar => scalar,
        }
    }
}

pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: Option<&'static str>,
    pub trim: bool,
    pub min_len: Option<(usize, &'static str)>,
    pub max_len: Option<(usize, &'static str)>,
    pub min: Option<(f64, &'static str)>,
    pub max: Option<(f64, &'static str)>,
    pub one_of: Option<(&'static [&'static str], &'static str)>,
    pub default: Option<fn() -> Bson>,
}

impl FieldDef {
    const fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: None,
            trim: false,
            min_len: None,
            max_len: None,
            min: None,
            max: None,
            one_of: None,
            default: None,
        }
    }
}

/// A rule spanning several fields; receives the merged document.
pub type CrossRule = fn(&BsonDocument) -> Option<FieldViolation>;

pub struct Schema {
    pub model: &'static str,
    pub fields: &'static [FieldDef],
    pub rules: &'static [CrossRule],
}

pub static TOUR_SCHEMA: Schema = Schema {
    model: "Tour",
    fields: &[
        FieldDef {
            required: Some("A tour must have a name"),
            trim: true,
            min_len: Some((10, "A tour name must have more or equal than 10 characters")),
            max_len: Some((40, "A tour name must have less or equal than 40 characters")),
            ..FieldDef::new("name", FieldType::String)
        },
        FieldDef::new("duration", FieldType::Number),
        FieldDef::new("maxGroupSize", FieldType::Number),
        FieldDef {
            required: Some("A tour must have a difficulty"),
            one_of: Some((&["easy", "medium", "difficult"], "Difficulty is either: easy, medium, difficult")),
            ..FieldDef::new("difficulty", FieldType::String)
        },
        FieldDef {
            min: Some((1.0, "Rating must be above 1.0")),
            max: Some((5.0, "Rating must be below 5.0")),
            default: Some(|| Bson::Double(4.5)),
            ..FieldDef::new("ratingsAverage", FieldType::Number)
        },
        FieldDef { default: Some(|| Bson::Double(0.0)), ..FieldDef::new("ratingsQuantity", FieldType::Number) },
        FieldDef { required: Some("A tour must have a price"), ..FieldDef::new("price", FieldType::Number) },
        FieldDef::new("priceDiscount", FieldType::Number),
        FieldDef { trim: true, ..FieldDef::new("summary", FieldType::String) },
        FieldDef { trim: true, ..FieldDef::new("description", FieldType::String) },
        FieldDef::new("imageCover", FieldType::String),
        FieldDef::new("images", FieldType::StringArray),
        FieldDef::new("startDates", FieldType::DateArray),
        FieldDef { default: Some(|| Bson::DateTime(bson::DateTime::now())), ..FieldDef::new("createdAt", FieldType::Date) },
    ],
    rules: &[discount_below_price as CrossRule],
};

fn discount_below_price(doc: &BsonDocument) -> Option<FieldViolation> {
    let discount = number(doc.get("priceDiscount")?)?;
    let price = doc.get("price").and_then(number);
    if price.is_some_and(|p| discount < p) {
        return None;
    }
    Some(FieldViolation {
        kind: ViolationKind::UserDefined,
        path: "priceDiscount".into(),
        message: format!("Discount price ({discount}) should be below regular price"),
        value: serde_json::Number::from_f64(discount).map(Value::Number),
    })
}

fn number(v: &Bson) -> Option<f64> {
    match v {
        Bson::Double(d) => Some(*d),
        Bson::Int32(i) => Some(f64::from(*i)),
        _ => None,
    }
}

struct CastFailure {
    kind: &'static str,
    value: String,
}

impl Schema {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Cast and validate a full document, applying defaults for absent fields.
    ///
    /// # Errors
    /// Returns a `ValidationError` listing every violated field.
    pub fn validate_create(&self, body: &BodyFields) -> Result<BsonDocument, ValidationError> {
        let mut doc = BsonDocument::new();
        let mut errors = BTreeMap::new();
        for def in self.fields {
            let cast = match body.get(def.name) {
                Some(v) => cast_field(def, v),
                None => Ok(def.default.map_or(Bson::Null, |f| f())),
            };
            match cast {
                Ok(value) => {
                    if let Some(violation) = check_rules(def, &value) {
                        errors.insert(def.name.to_string(), violation);
                    } else if value != Bson::Null {
                        doc.insert(def.name, value);
                    }
                }
                Err(violation) => {
                    errors.insert(def.name.to_string(), violation);
                }
            }
        }
        self.log_dropped(body);
        self.finish(doc.clone(), &doc, errors)
    }

    /// Cast and validate only the fields present in `body`; cross-field rules see `current`
    /// merged with the changes.
    ///
    /// # Errors
    /// Returns a `ValidationError` listing every violated field.
    pub fn validate_update(
        &self,
        body: &BodyFields,
        current: &BsonDocument,
    ) -> Result<BsonDocument, ValidationError> {
        let mut changes = BsonDocument::new();
        let mut errors = BTreeMap::new();
        for (key, raw) in body {
            let Some(def) = self.field(key) else { continue };
            match cast_field(def, raw) {
                Ok(value) => match check_rules(def, &value) {
                    Some(violation) => {
                        errors.insert(def.name.to_string(), violation);
                    }
                    None => {
                        changes.insert(def.name, value);
                    }
                },
                Err(violation) => {
                    errors.insert(def.name.to_string(), violation);
                }
            }
        }
        self.log_dropped(body);
        let mut merged = current.clone();
        for (k, v) in &changes {
            merged.insert(k.clone(), v.clone());
        }
        self.finish(changes, &merged, errors)
    }

    fn finish(
        &self,
        out: BsonDocument,
        merged: &BsonDocument,
        mut errors: BTreeMap<String, FieldViolation>,
    ) -> Result<BsonDocument, ValidationError> {
        for rule in self.rules {
            if let Some(violation) = rule(merged) {
                errors.entry(violation.path.clone()).or_insert(violation);
            }
        }
        if errors.is_empty() { Ok(out) } else { Err(ValidationError::new(self.model, errors)) }
    }

    fn log_dropped(&self, body: &BodyFields) {
        let dropped: Vec<&String> = body.keys().filter(|k| self.field(k).is_none()).collect();
        if !dropped.is_empty() {
            log::debug!("{}: dropping fields not in schema: {dropped:?}", self.model);
        }
    }

    /// Cast filter values on typed fields. Untyped paths are converted as they are.
    ///
    /// # Errors
    /// Returns `DbError::Cast` when a value cannot be cast to the field's type.
    pub fn cast_filter(&self, filter: &FilterExpr) -> Result<BsonDocument, DbError> {
        let mut out = BsonDocument::new();
        for (path, cond) in filter {
            let cast = match self.field(path) {
                Some(def) => cast_condition(def.ty, path, cond)?,
                None => json_to_bson(cond),
            };
            out.insert(path.clone(), cast);
        }
        Ok(out)
    }
}

fn cast_condition(ty: FieldType, path: &str, cond: &Value) -> Result<Bson, DbError> {
    let elem = ty.element();
    let cast_err = |f: CastFailure| DbError::Cast { kind: f.kind.into(), value: f.value, path: path.into() };
    match cond {
        Value::Object(ops) if ops.keys().any(|k| k.starts_with('$')) => {
            let mut out = BsonDocument::new();
            for (op, operand) in ops {
                let v = match (op.as_str(), operand) {
                    ("$exists", v) => json_to_bson(v),
                    ("$in" | "$nin", Value::Array(items)) => Bson::Array(
                        items.iter().map(|x| cast_scalar(elem, x, false)).collect::<Result<_, _>>().map_err(cast_err)?,
                    ),
                    (_, v) => cast_scalar(elem, v, false).map_err(cast_err)?,
                };
                out.insert(op.clone(), v);
            }
            Ok(Bson::Document(out))
        }
        Value::Array(items) => {
            let cast = Bson::Array(
                items.iter().map(|x| cast_scalar(elem, x, false)).collect::<Result<_, _>>().map_err(cast_err)?,
            );
            // A list on a scalar field means "any of"; on an array field it is whole-array equality.
            if ty == elem {
                let mut any_of = BsonDocument::new();
                any_of.insert("$in", cast);
                Ok(Bson::Document(any_of))
            } else {
                Ok(cast)
            }
        }
        scalar => cast_scalar(elem, scalar, false).map_err(cast_err),
    }
}

fn cast_field(def: &FieldDef, raw: &Value) -> Result<Bson, FieldViolation> {
    let result = match (def.ty, raw) {
        (_, Value::Null) => Ok(Bson::Null),
        (FieldType::StringArray | FieldType::DateArray, Value::Array(items)) => items
            .iter()
            .map(|x| cast_scalar(def.ty.element(), x, def.trim))
            .collect::<Result<Vec<_>, _>>()
            .map(Bson::Array),
        (FieldType::StringArray | FieldType::DateArray, scalar) => {
            cast_scalar(def.ty.element(), scalar, def.trim).map(|v| Bson::Array(vec![v]))
        }
        (ty, scalar) => cast_scalar(ty, scalar, def.trim),
    };
    result.map_err(|f| FieldViolation {
        kind: ViolationKind::Cast,
        path: def.name.into(),
        message: format!("Cast to {} failed for value {} at path \"{}\"", def.ty.label(), f.value, def.name),
        value: Some(raw.clone()),
    })
}

fn cast_scalar(ty: FieldType, raw: &Value, trim: bool) -> Result<Bson, CastFailure> {
    let fail = || CastFailure { kind: ty.label(), value: raw.to_string() };
    match (ty.element(), raw) {
        (FieldType::Number, Value::Number(n)) => n.as_f64().map(Bson::Double).ok_or_else(fail),
        (FieldType::Number, Value::String(s)) => {
            s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).map(Bson::Double).ok_or_else(fail)
        }
        (FieldType::String, Value::String(s)) => {
            Ok(Bson::String(if trim { s.trim().to_string() } else { s.clone() }))
        }
        (FieldType::String, Value::Number(n)) => Ok(Bson::String(n.to_string())),
        (FieldType::String, Value::Bool(b)) => Ok(Bson::String(b.to_string())),
        (FieldType::Date, Value::String(s)) => parse_date(s).ok_or_else(fail),
        (FieldType::Date, Value::Number(n)) => {
            n.as_i64().map(|ms| Bson::DateTime(bson::DateTime::from_millis(ms))).ok_or_else(fail)
        }
        _ => Err(fail()),
    }
}

fn parse_date(s: &str) -> Option<Bson> {
    let s = s.trim();
    let millis = DateTime::parse_from_rfc3339(s).map(|d| d.timestamp_millis()).ok().or_else(|| {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc().timestamp_millis())
    })?;
    Some(Bson::DateTime(bson::DateTime::from_millis(millis)))
}

fn check_rules(def: &FieldDef, value: &Bson) -> Option<FieldViolation> {
    let violation = |kind, message: &str| FieldViolation {
        kind,
        path: def.name.into(),
        message: message.to_string(),
        value: Some(crate::utils::json::bson_to_json(value)),
    };
    let missing = match value {
        Bson::Null => true,
        Bson::String(s) => s.is_empty(),
        _ => false,
    };
    if missing {
        return def.required.map(|msg| FieldViolation { value: None, ..violation(ViolationKind::Required, msg) });
    }
    if let Bson::String(s) = value {
        let len = s.chars().count();
        if let Some((allowed, msg)) = def.one_of
            && !allowed.contains(&s.as_str())
        {
            return Some(violation(ViolationKind::Enum, msg));
        }
        if let Some((min, msg)) = def.min_len
            && len < min
        {
            return Some(violation(ViolationKind::MinLength, msg));
        }
        if let Some((max, msg)) = def.max_len
            && len > max
        {
            return Some(violation(ViolationKind::MaxLength, msg));
        }
    }
    if let Some(n) = number(value) {
        if let Some((min, msg)) = def.min
            && n < min
        {
            return Some(violation(ViolationKind::Min, msg));
        }
        if let Some((max, msg)) = def.max
            && n > max
        {
            return Some(violation(ViolationKind::Max, msg));
        }
    }
    None
}
