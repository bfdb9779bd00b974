//! Location Commands

use serde_json::Value;

use super::{ClientResult, InventoryClient};
use crate::cache::CacheError;
use crate::models::{Location, LocationPatch, NewLocation};
use crate::query::{EntityKind, QueryKey, QueryPrefix};
use crate::tree::{build_tree, compute_path, LocationNode};
use crate::validation::validate_new_location;

impl InventoryClient {
    pub async fn list_locations(&self) -> ClientResult<Vec<Location>> {
        let hid = self.household_id()?;
        let key = QueryKey::list(EntityKind::Locations, &hid);
        let stale_time = self.queries.config().stale_time();
        let locations = self
            .queries
            .fetch(&key, stale_time, || self.services.locations.get_locations(&hid))
            .await?;
        Ok(locations)
    }

    /// All locations of the household as a forest
    pub async fn location_tree(&self) -> ClientResult<Vec<LocationNode>> {
        Ok(build_tree(&self.list_locations().await?))
    }

    /// Direct children of `parent_id`, or the roots when `None`
    pub async fn child_locations(&self, parent_id: Option<&str>) -> ClientResult<Vec<Location>> {
        let hid = self.household_id()?;
        let filter = serde_json::json!({ "parent_id": parent_id });
        let key = QueryKey::filtered(EntityKind::Locations, &hid, &filter);
        let stale_time = self.queries.config().stale_time();
        let locations = self
            .queries
            .fetch(&key, stale_time, || {
                self.services.locations.get_child_locations(&hid, parent_id)
            })
            .await?;
        Ok(locations)
    }

    pub async fn location(&self, location_id: &str) -> ClientResult<Location> {
        let hid = self.household_id()?;
        let key = QueryKey::detail(EntityKind::Locations, &hid, location_id);
        let stale_time = self.queries.config().stale_time();
        let location = self
            .queries
            .fetch(&key, stale_time, || {
                self.services.locations.get_location(&hid, location_id)
            })
            .await?;
        Ok(location)
    }

    pub async fn create_location(&self, data: NewLocation) -> ClientResult<Location> {
        validate_new_location(&data, self.language)?;
        let hid = self.household_id()?;

        let prefix = QueryPrefix::new(EntityKind::Locations, &hid);
        let location = self
            .mutations
            .commit(&prefix, || self.services.locations.create_location(&hid, data))
            .await?;
        Ok(location)
    }

    /// Cached view of `patch`. A new parent is only shown together with
    /// the path it implies, which needs the new parent to be cached.
    fn optimistic_location_patch(
        &self,
        hid: &str,
        location_id: &str,
        patch: &LocationPatch,
    ) -> ClientResult<Value> {
        let mut optimistic = serde_json::to_value(patch).map_err(CacheError::from)?;
        let Some(new_parent_id) = &patch.parent_id else {
            return Ok(optimistic);
        };

        let parent = match new_parent_id.as_deref() {
            Some(parent_id) => {
                let parent_key = QueryKey::detail(EntityKind::Locations, hid, parent_id);
                match self.queries.cache().get_as::<Location>(&parent_key)? {
                    Some(parent) => Some(parent),
                    None => {
                        if let Some(fields) = optimistic.as_object_mut() {
                            fields.remove("parent_id");
                        }
                        return Ok(optimistic);
                    }
                }
            }
            None => None,
        };

        let path = compute_path(location_id, new_parent_id.as_deref(), |_| parent);
        if let Some(fields) = optimistic.as_object_mut() {
            fields.insert("path".into(), Value::from(path));
        }
        Ok(optimistic)
    }

    pub async fn update_location(
        &self,
        location_id: &str,
        patch: LocationPatch,
    ) -> ClientResult<Location> {
        let hid = self.household_id()?;
        let key = QueryKey::detail(EntityKind::Locations, &hid, location_id);
        let optimistic = self.optimistic_location_patch(&hid, location_id, &patch)?;
        let location = self
            .mutations
            .mutate(&key, &optimistic, || {
                self.services.locations.update_location(&hid, location_id, &patch)
            })
            .await?;
        Ok(location)
    }

    /// Reparent a location (`None` moves it to the root level). Only the
    /// moved location's path is recomputed.
    pub async fn move_location(
        &self,
        location_id: &str,
        new_parent_id: Option<String>,
    ) -> ClientResult<Location> {
        self.update_location(location_id, LocationPatch::reparent(new_parent_id))
            .await
    }

    /// Rejected while the location has sub-locations
    pub async fn delete_location(&self, location_id: &str) -> ClientResult<()> {
        let hid = self.household_id()?;
        let key = QueryKey::detail(EntityKind::Locations, &hid, location_id);
        self.mutations
            .commit(&key.prefix(), || {
                self.services.locations.delete_location(&hid, location_id)
            })
            .await?;
        self.queries.remove(&key);
        Ok(())
    }
}
