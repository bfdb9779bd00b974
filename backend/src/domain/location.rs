//! Location Entity
//!
//! Locations form a forest through `parent_id`. Each location stores its
//! materialized ancestor path (root first, self last).

use serde::{Deserialize, Serialize};

use super::document::Collection;
use super::entity::{Entity, HouseholdScoped};

/// A storage location, optionally nested under another location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub household_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Parent location ID (None = root level)
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub item_count: i64,
    /// Ancestor ids from a root down to and including this location
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Location {
    /// Check if this is a root location (no parent)
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl Entity for Location {
    const COLLECTION: Collection = Collection::Locations;

    fn id(&self) -> &str {
        &self.id
    }
}

impl HouseholdScoped for Location {
    fn household_id(&self) -> &str {
        &self.household_id
    }
}

/// Fields supplied when creating a location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewLocation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

impl NewLocation {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn child(name: impl Into<String>, parent_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_id: Some(parent_id.into()),
            ..Default::default()
        }
    }
}

/// Partial update for a location.
///
/// `parent_id`: `None` leaves the parent alone, `Some(None)` moves the
/// location to the root level, `Some(Some(id))` reparents it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LocationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl LocationPatch {
    pub fn reparent(parent_id: Option<String>) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Default::default()
        }
    }
}

/// Compute the materialized path for `self_id`.
///
/// A missing parent id, a parent that cannot be resolved, or a parent with an
/// empty path all yield `[self_id]`: the location is treated as a root.
pub fn compute_path<F>(self_id: &str, parent_id: Option<&str>, resolve_parent: F) -> Vec<String>
where
    F: FnOnce(&str) -> Option<Location>,
{
    let inherited = parent_id
        .and_then(resolve_parent)
        .map(|parent| parent.path)
        .filter(|path| !path.is_empty());

    match inherited {
        Some(mut path) => {
            path.push(self_id.to_string());
            path
        }
        None => vec![self_id.to_string()],
    }
}
