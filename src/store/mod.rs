//! Generic per-collection document storage.
//!
//! Every concept owns exactly one [`DocStore`] scoped to its own collection.
//! Documents are flat JSON objects stamped with `_id`, `dateCreated` and
//! `dateUpdated`; the concept's own fields sit beside them. Filters are
//! equality matches on top-level fields, optionally OR-ed together.
//!
//! Every operation is atomic for a single document. Nothing spans documents,
//! so composite invariants belong to the concept (check-then-act) or to a
//! unique key declared on the backend.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::api::error;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub const ID_FIELD: &str = "_id";
pub const CREATED_FIELD: &str = "dateCreated";
pub const UPDATED_FIELD: &str = "dateUpdated";

/// Shape of a concept's fields as they are persisted.
pub trait Doc: Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Doc for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document<T> {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "dateCreated")]
    pub date_created: DateTime<Utc>,
    #[serde(rename = "dateUpdated")]
    pub date_updated: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: T,
}

impl<T: Doc> Document<T> {
    pub(crate) fn stamp(fields: &T) -> Result<(Uuid, Value), error::SystemError> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        let mut body = match serde_json::to_value(fields)? {
            Value::Object(map) => map,
            _ => return Err(error::SystemError::bad_request("Document fields must be an object")),
        };
        strip_nulls(&mut body);
        body.insert(ID_FIELD.into(), json!(id));
        body.insert(CREATED_FIELD.into(), json!(now));
        body.insert(UPDATED_FIELD.into(), json!(now));

        Ok((id, Value::Object(body)))
    }

    pub(crate) fn from_value(value: Value) -> Result<Self, error::SystemError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Equality filter over top-level fields.
///
/// A filter is a disjunction of clauses; a clause matches when every field it
/// names is equal to the document's value. [`Filter::eq`] narrows every
/// clause, so `a.or(b).eq(k, v)` reads as `(a OR b) AND k = v`.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    clauses: Vec<Map<String, Value>>,
}

impl Filter {
    /// Matches every document.
    pub fn all() -> Self {
        Self { clauses: vec![Map::new()] }
    }

    /// Matches nothing.
    pub fn none() -> Self {
        Self { clauses: Vec::new() }
    }

    pub fn by_id(id: Uuid) -> Self {
        Self::all().eq(ID_FIELD, id)
    }

    /// Matches any of the given ids.
    pub fn any_id(ids: &[Uuid]) -> Self {
        ids.iter().fold(Self::none(), |filter, id| filter.or(Self::by_id(*id)))
    }

    pub fn eq(mut self, field: &str, value: impl Serialize) -> Self {
        let value = json!(value);
        for clause in &mut self.clauses {
            clause.insert(field.to_owned(), value.clone());
        }
        self
    }

    pub fn or(mut self, other: Filter) -> Self {
        self.clauses.extend(other.clauses);
        self
    }

    pub fn clauses(&self) -> &[Map<String, Value>] {
        &self.clauses
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.clauses
            .iter()
            .any(|clause| clause.iter().all(|(field, expected)| doc.get(field) == Some(expected)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub key: String,
    pub direction: Direction,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadOptions {
    pub sort: Option<Sort>,
}

impl ReadOptions {
    pub fn sorted_by(key: &str, direction: Direction) -> Self {
        Self { sort: Some(Sort { key: key.to_owned(), direction }) }
    }

    /// Oldest first.
    pub fn chronological() -> Self {
        Self::sorted_by(CREATED_FIELD, Direction::Ascending)
    }
}

impl Sort {
    pub(crate) fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let ordering = compare_values(a.get(&self.key), b.get(&self.key));
        match self.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// Missing values sort first. Strings that parse as RFC 3339 compare as
/// instants, since chrono trims trailing zero nanoseconds.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Turns caller-supplied fields into an update patch: identity and creation
/// time are immutable, `null` means "remove this field", and the last-modified
/// stamp is refreshed.
pub(crate) fn prepare_patch(patch: &Value) -> Result<Map<String, Value>, error::SystemError> {
    let Value::Object(patch) = patch else {
        return Err(error::SystemError::bad_request("Update fields must be an object"));
    };

    let mut patch = patch.clone();
    patch.remove(ID_FIELD);
    patch.remove(CREATED_FIELD);
    patch.insert(UPDATED_FIELD.into(), json!(Utc::now()));
    Ok(patch)
}

pub(crate) fn apply_patch(doc: &mut Value, patch: &Map<String, Value>) {
    if let Value::Object(body) = doc {
        for (field, value) in patch {
            if value.is_null() {
                body.remove(field);
            } else {
                body.insert(field.clone(), value.clone());
            }
        }
    }
}

fn strip_nulls(body: &mut Map<String, Value>) {
    body.retain(|_, value| !value.is_null());
}

/// CRUD over one collection of `T`-shaped documents.
#[async_trait::async_trait]
pub trait DocStore<T: Doc>: Send + Sync {
    fn collection(&self) -> &str;

    async fn create_one(&self, fields: &T) -> Result<Uuid, error::SystemError>;

    async fn read_one(&self, filter: &Filter) -> Result<Option<Document<T>>, error::SystemError>;

    async fn read_many(
        &self,
        filter: &Filter,
        options: &ReadOptions,
    ) -> Result<Vec<Document<T>>, error::SystemError>;

    /// Applies `patch` to the first match. Returns whether anything matched.
    async fn update_one(&self, filter: &Filter, patch: &Value) -> Result<bool, error::SystemError>;

    async fn delete_one(&self, filter: &Filter) -> Result<bool, error::SystemError>;

    async fn delete_many(&self, filter: &Filter) -> Result<u64, error::SystemError>;
}
