use mongodb::bson::{self, Bson, oid::ObjectId};
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A schemaless record. Caller-supplied fields are kept verbatim.
pub type Document = Map<String, Value>;

/// Primary key field, assigned by the store on insert.
pub const ID_FIELD: &str = "_id";

/// Errors raised by a collection backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database driver error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("failed to convert document: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("invalid identifier: {0}")]
    InvalidId(#[from] bson::oid::Error),

    #[error("field '{0}' is immutable")]
    ImmutableField(&'static str),

    #[error("unsupported value in field '{0}'")]
    UnsupportedValue(String),
}

/// Query over a collection: optional equality filter, descending sort, limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub filter: Option<(String, String)>,
    pub sort_descending: Option<String>,
    pub limit: Option<i64>,
}

impl FindQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matching(field: &str, value: &str) -> Self {
        Self {
            filter: Some((field.to_string(), value.to_string())),
            ..Self::default()
        }
    }

    pub fn newest_first(mut self, field: &str) -> Self {
        self.sort_descending = Some(field.to_string());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

/// Parse a path identifier into an ObjectId.
pub fn parse_id(raw: &str) -> Result<ObjectId, StoreError> {
    Ok(ObjectId::parse_str(raw)?)
}

/// Convert a JSON document into BSON for the driver.
pub fn to_bson(doc: &Document) -> Result<bson::Document, StoreError> {
    Ok(bson::to_document(doc)?)
}

/// Convert a stored BSON document back to JSON.
///
/// ObjectIds are rendered as hex strings and dates as RFC 3339 so that
/// responses carry plain identifiers rather than extended-JSON wrappers.
pub fn from_bson(doc: bson::Document) -> Document {
    doc.into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect()
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Bson::DateTime(dt).into_relaxed_extjson(),
        },
        Bson::Document(doc) => Value::Object(from_bson(doc)),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

/// Rank of a value's type in MongoDB's cross-type sort order.
fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Total order over optional JSON values, ascending.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.total_cmp(&y)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Array(x)), Some(Value::Array(y))) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = compare_values(Some(l), Some(r));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        (Some(Value::Object(x)), Some(Value::Object(y))) => {
            for ((lk, lv), (rk, rv)) in x.iter().zip(y.iter()) {
                let ord = lk.cmp(rk).then_with(|| compare_values(Some(lv), Some(rv)));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => Ordering::Equal,
    }
}
