//! Location Service
//!
//! Maintains the materialized `path` of each location on create and on
//! reparent. Paths of descendants are not rewritten when an ancestor moves.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::{
    compute_path, to_document, Direction, DomainError, ListQuery, Location, LocationPatch,
    NewLocation,
};
use crate::repository::{DocumentStore, Repository};

use super::messages::{Failure, Messages};

#[derive(Clone)]
pub struct LocationService {
    store: Arc<dyn DocumentStore>,
    messages: Messages,
}

impl LocationService {
    pub fn new(store: Arc<dyn DocumentStore>, messages: Messages) -> Self {
        Self { store, messages }
    }

    fn repo(&self, household_id: &str) -> Repository<Location> {
        Repository::in_household(self.store.clone(), household_id)
    }

    /// Resolve a parent for path computation; read errors propagate
    async fn resolve_parent(
        &self,
        repo: &Repository<Location>,
        parent_id: Option<&str>,
    ) -> Result<Option<Location>, DomainError> {
        match parent_id {
            Some(id) => repo.find_by_id(id).await,
            None => Ok(None),
        }
    }

    /// Whether `location_id` sits on the `parent_id` chain starting at
    /// `start`. Follows stored parents, not stored paths.
    async fn chain_contains(
        &self,
        repo: &Repository<Location>,
        start: Option<Location>,
        location_id: &str,
    ) -> Result<bool, DomainError> {
        let mut seen = HashSet::new();
        let mut current = start;
        while let Some(node) = current {
            if node.id == location_id {
                return Ok(true);
            }
            if !seen.insert(node.id.clone()) {
                log::warn!("parent chain of location {} loops", node.id);
                return Ok(false);
            }
            current = match node.parent_id.as_deref() {
                Some(id) if id != node.id => repo.find_by_id(id).await?,
                _ => None,
            };
        }
        Ok(false)
    }

    pub async fn create_location(
        &self,
        household_id: &str,
        data: NewLocation,
    ) -> Result<Location, String> {
        let repo = self.repo(household_id);
        let id = repo.new_id();

        let parent = self
            .resolve_parent(&repo, data.parent_id.as_deref())
            .await
            .map_err(|e| self.messages.fail(Failure::CreateLocation, e))?;
        let path = compute_path(&id, data.parent_id.as_deref(), |_| parent);

        let location = Location {
            id,
            household_id: household_id.to_string(),
            name: data.name,
            description: data.description,
            parent_id: data.parent_id,
            icon: data.icon,
            color: data.color,
            qr_code: data.qr_code,
            item_count: 0,
            path,
            created_at: 0,
            updated_at: 0,
        };

        repo.create(&location)
            .await
            .map_err(|e| self.messages.fail(Failure::CreateLocation, e))
    }

    pub async fn get_location(
        &self,
        household_id: &str,
        location_id: &str,
    ) -> Result<Location, String> {
        self.repo(household_id)
            .find_by_id(location_id)
            .await
            .map_err(|e| self.messages.fail(Failure::GetLocation, e))?
            .ok_or_else(|| self.messages.text(Failure::LocationNotFound))
    }

    /// All locations of a household, ordered by name
    pub async fn get_locations(&self, household_id: &str) -> Result<Vec<Location>, String> {
        self.repo(household_id)
            .list(&ListQuery::new().order_by("name", Direction::Asc))
            .await
            .map_err(|e| self.messages.fail(Failure::ListLocations, e))
    }

    /// Direct children of `parent_id`; `None` lists root locations
    pub async fn get_child_locations(
        &self,
        household_id: &str,
        parent_id: Option<&str>,
    ) -> Result<Vec<Location>, String> {
        let parent = parent_id.map_or(Value::Null, Value::from);
        let query = ListQuery::new()
            .filter("parent_id", parent)
            .order_by("name", Direction::Asc);
        self.repo(household_id)
            .list(&query)
            .await
            .map_err(|e| self.messages.fail(Failure::ListChildLocations, e))
    }

    /// Apply a partial update. When `parent_id` changes, the location's own
    /// path is recomputed; moves into the location itself or one of its
    /// descendants are rejected.
    pub async fn update_location(
        &self,
        household_id: &str,
        location_id: &str,
        patch: &LocationPatch,
    ) -> Result<Location, String> {
        let repo = self.repo(household_id);
        let mut doc =
            to_document(patch).map_err(|e| self.messages.fail(Failure::UpdateLocation, e))?;

        if let Some(new_parent) = &patch.parent_id {
            let parent = self
                .resolve_parent(&repo, new_parent.as_deref())
                .await
                .map_err(|e| self.messages.fail(Failure::UpdateLocation, e))?;

            let creates_cycle = new_parent.as_deref() == Some(location_id)
                || self
                    .chain_contains(&repo, parent.clone(), location_id)
                    .await
                    .map_err(|e| self.messages.fail(Failure::UpdateLocation, e))?;
            if creates_cycle {
                return Err(self.messages.fail(
                    Failure::LocationCycle,
                    DomainError::InvalidInput(format!(
                        "location {} cannot move under {:?}",
                        location_id, new_parent
                    )),
                ));
            }

            let path = compute_path(location_id, new_parent.as_deref(), |_| parent);
            doc.insert("path".into(), Value::from(path));
        }

        repo.update(location_id, &doc).await.map_err(|e| {
            self.messages
                .fail_lookup(Failure::UpdateLocation, Failure::LocationNotFound, e)
        })
    }

    /// Delete a location that has no sub-locations
    pub async fn delete_location(
        &self,
        household_id: &str,
        location_id: &str,
    ) -> Result<(), String> {
        let repo = self.repo(household_id);
        let children = repo
            .list(&ListQuery::new().filter("parent_id", location_id).limit(1))
            .await
            .map_err(|e| self.messages.fail(Failure::DeleteLocation, e))?;

        if !children.is_empty() {
            log::warn!("refusing to delete location {} with sub-locations", location_id);
            return Err(self.messages.text(Failure::LocationHasChildren));
        }

        repo.delete(location_id)
            .await
            .map_err(|e| self.messages.fail(Failure::DeleteLocation, e))
    }
}
