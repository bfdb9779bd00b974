//! Query Keys
//!
//! A cache key is (entity kind, household id, scope). All keys of one kind
//! within one household share a prefix; mutations invalidate that prefix.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Items,
    Locations,
    Categories,
    Projects,
    Loans,
    /// Household documents; the key's owner id is the member's uid
    Households,
    Stats,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Items => "items",
            EntityKind::Locations => "locations",
            EntityKind::Categories => "categories",
            EntityKind::Projects => "projects",
            EntityKind::Loans => "loans",
            EntityKind::Households => "households",
            EntityKind::Stats => "stats",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyScope {
    /// A list, optionally narrowed by a filter fingerprint
    List(Option<String>),
    Detail(String),
    Search(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub kind: EntityKind,
    pub household_id: String,
    pub scope: KeyScope,
}

impl QueryKey {
    pub fn list(kind: EntityKind, household_id: &str) -> Self {
        Self {
            kind,
            household_id: household_id.to_string(),
            scope: KeyScope::List(None),
        }
    }

    /// List narrowed by filter options; the options' JSON is the fingerprint
    pub fn filtered<F: Serialize>(kind: EntityKind, household_id: &str, filter: &F) -> Self {
        let fingerprint = serde_json::to_string(filter).ok();
        Self {
            kind,
            household_id: household_id.to_string(),
            scope: KeyScope::List(fingerprint),
        }
    }

    pub fn detail(kind: EntityKind, household_id: &str, id: &str) -> Self {
        Self {
            kind,
            household_id: household_id.to_string(),
            scope: KeyScope::Detail(id.to_string()),
        }
    }

    pub fn search(kind: EntityKind, household_id: &str, term: &str) -> Self {
        Self {
            kind,
            household_id: household_id.to_string(),
            scope: KeyScope::Search(term.to_string()),
        }
    }

    pub fn prefix(&self) -> QueryPrefix {
        QueryPrefix::new(self.kind, &self.household_id)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.household_id, self.kind.as_str())?;
        match &self.scope {
            KeyScope::List(None) => write!(f, "/list"),
            KeyScope::List(Some(fp)) => write!(f, "/list?{}", fp),
            KeyScope::Detail(id) => write!(f, "/{}", id),
            KeyScope::Search(term) => write!(f, "/search?{}", term),
        }
    }
}

/// Every key of one kind within one household
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryPrefix {
    pub kind: EntityKind,
    pub household_id: String,
}

impl QueryPrefix {
    pub fn new(kind: EntityKind, household_id: &str) -> Self {
        Self {
            kind,
            household_id: household_id.to_string(),
        }
    }

    pub fn matches(&self, key: &QueryKey) -> bool {
        key.kind == self.kind && key.household_id == self.household_id
    }
}
