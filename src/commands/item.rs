//! Item Commands

use hms_backend::domain::MAX_LIST_LIMIT;

use super::{ClientResult, InventoryClient};
use crate::models::{Item, ItemListOptions, ItemPatch, NewItem};
use crate::query::{EntityKind, QueryKey, QueryPrefix};
use crate::validation::{validate_item_patch, validate_new_item};

impl InventoryClient {
    pub async fn list_items(&self, options: &ItemListOptions) -> ClientResult<Vec<Item>> {
        let hid = self.household_id()?;
        let key = QueryKey::filtered(EntityKind::Items, &hid, options);
        let stale_time = self.queries.config().stale_time();
        let items = self
            .queries
            .fetch(&key, stale_time, || self.services.items.get_items(&hid, options))
            .await?;
        Ok(items)
    }

    /// Items that are not archived, newest first
    pub async fn active_items(&self) -> ClientResult<Vec<Item>> {
        let options = ItemListOptions {
            is_archived: Some(false),
            limit: Some(MAX_LIST_LIMIT),
            ..Default::default()
        };
        self.list_items(&options).await
    }

    pub async fn item(&self, item_id: &str) -> ClientResult<Item> {
        let hid = self.household_id()?;
        let key = QueryKey::detail(EntityKind::Items, &hid, item_id);
        let stale_time = self.queries.config().stale_time();
        let item = self
            .queries
            .fetch(&key, stale_time, || self.services.items.get_item(&hid, item_id))
            .await?;
        Ok(item)
    }

    /// Search is disabled for terms shorter than the configured minimum;
    /// those return no results without querying.
    pub async fn search_items(&self, term: &str) -> ClientResult<Vec<Item>> {
        let hid = self.household_id()?;
        let term = term.trim();
        if term.chars().count() < self.queries.config().search_min_chars {
            return Ok(Vec::new());
        }

        let key = QueryKey::search(EntityKind::Items, &hid, &term.to_lowercase());
        let stale_time = self.queries.config().search_stale_time();
        let items = self
            .queries
            .fetch(&key, stale_time, || self.services.items.search_items(&hid, term))
            .await?;
        Ok(items)
    }

    pub async fn create_item(&self, data: NewItem) -> ClientResult<Item> {
        validate_new_item(&data, self.language)?;
        let uid = self.user_id()?;
        let hid = self.household_id()?;

        let prefix = QueryPrefix::new(EntityKind::Items, &hid);
        let item = self
            .mutations
            .commit(&prefix, || self.services.items.create_item(&hid, &uid, data))
            .await?;
        self.invalidate_stats(&hid);
        Ok(item)
    }

    /// Optimistic update: the cached item shows `patch` until the write
    /// settles, and reverts if it fails.
    pub async fn update_item(&self, item_id: &str, patch: ItemPatch) -> ClientResult<Item> {
        validate_item_patch(&patch, self.language)?;
        let hid = self.household_id()?;

        let key = QueryKey::detail(EntityKind::Items, &hid, item_id);
        let result = self
            .mutations
            .mutate(&key, &patch, || self.services.items.update_item(&hid, item_id, &patch))
            .await;
        self.invalidate_stats(&hid);
        Ok(result?)
    }

    pub async fn archive_item(&self, item_id: &str, archived: bool) -> ClientResult<Item> {
        let hid = self.household_id()?;

        let key = QueryKey::detail(EntityKind::Items, &hid, item_id);
        let patch = ItemPatch::archived(archived);
        let result = self
            .mutations
            .mutate(&key, &patch, || self.services.items.set_archived(&hid, item_id, archived))
            .await;
        self.invalidate_stats(&hid);
        Ok(result?)
    }

    pub async fn delete_item(&self, item_id: &str) -> ClientResult<()> {
        let hid = self.household_id()?;

        let key = QueryKey::detail(EntityKind::Items, &hid, item_id);
        self.queries.cancel(&key);
        self.mutations
            .commit(&key.prefix(), || self.services.items.delete_item(&hid, item_id))
            .await?;
        self.queries.remove(&key);
        self.invalidate_stats(&hid);
        Ok(())
    }
}
