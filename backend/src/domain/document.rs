//! Document Model
//!
//! Documents are flat JSON objects addressed by a collection scope and an id.
//! Entities convert to and from documents through serde.

use std::cmp::Ordering;
use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use super::entity::{DomainError, DomainResult};

/// A stored document (field name -> value)
pub type Document = Map<String, Value>;

/// Named document collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Users,
    Households,
    Items,
    Locations,
    Categories,
    Projects,
    Loans,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Households => "households",
            Collection::Items => "items",
            Collection::Locations => "locations",
            Collection::Categories => "categories",
            Collection::Projects => "projects",
            Collection::Loans => "loans",
        }
    }

    /// Whether the collection lives under a household
    pub fn is_household_scoped(&self) -> bool {
        !matches!(self, Collection::Users | Collection::Households)
    }
}

/// Address of a collection: either top-level or a household sub-collection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Root(Collection),
    Household {
        household_id: String,
        collection: Collection,
    },
}

impl Scope {
    pub fn root(collection: Collection) -> Self {
        Scope::Root(collection)
    }

    pub fn household(household_id: impl Into<String>, collection: Collection) -> Self {
        Scope::Household {
            household_id: household_id.into(),
            collection,
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            Scope::Root(c) => *c,
            Scope::Household { collection, .. } => *collection,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Root(c) => write!(f, "{}", c.as_str()),
            Scope::Household {
                household_id,
                collection,
            } => write!(f, "households/{}/{}", household_id, collection.as_str()),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Equality filter on one field. A `null` value matches a missing field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// Query evaluated by every store implementation the same way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filters: Vec<FieldFilter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.filters.iter().all(|f| {
            let actual = doc.get(&f.field).unwrap_or(&Value::Null);
            actual == &f.value
        })
    }

    /// Filter, sort (stable) and truncate a set of documents
    pub fn apply(&self, docs: impl IntoIterator<Item = Document>) -> Vec<Document> {
        let mut out: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();

        if let Some(order) = &self.order_by {
            out.sort_by(|a, b| {
                let ord = compare_values(
                    a.get(&order.field).unwrap_or(&Value::Null),
                    b.get(&order.field).unwrap_or(&Value::Null),
                );
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }

        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values used for sorting
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (l, r) in x.iter().zip(y.iter()) {
                let ord = compare_values(l, r);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Shallow merge: every field of `patch` overwrites the field in `base`
pub fn merge_fields(base: &mut Document, patch: &Document) {
    for (k, v) in patch {
        base.insert(k.clone(), v.clone());
    }
}

/// Serialize a value into a document; fails if it is not a JSON object
pub fn to_document<T: Serialize>(value: &T) -> DomainResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(DomainError::InvalidInput(format!(
            "expected an object, got {}",
            other
        ))),
    }
}

pub fn from_document<T: DeserializeOwned>(doc: Document) -> DomainResult<T> {
    Ok(serde_json::from_value(Value::Object(doc))?)
}
