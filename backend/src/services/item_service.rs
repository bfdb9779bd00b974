//! Item Service
//!
//! CRUD, typed listing and search over `households/{id}/items`.

use std::sync::Arc;

use crate::domain::{Item, ItemListOptions, ItemPatch, NewItem, MAX_LIST_LIMIT};
use crate::repository::{DocumentStore, Repository};

use super::messages::{Failure, Messages};

#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn DocumentStore>,
    messages: Messages,
}

impl ItemService {
    pub fn new(store: Arc<dyn DocumentStore>, messages: Messages) -> Self {
        Self { store, messages }
    }

    fn repo(&self, household_id: &str) -> Repository<Item> {
        Repository::in_household(self.store.clone(), household_id)
    }

    pub async fn create_item(
        &self,
        household_id: &str,
        user_id: &str,
        data: NewItem,
    ) -> Result<Item, String> {
        let repo = self.repo(household_id);
        let item = Item {
            id: repo.new_id(),
            household_id: household_id.to_string(),
            name: data.name,
            description: data.description,
            category_id: data.category_id,
            location_id: data.location_id,
            brand: data.brand,
            model: data.model,
            serial_number: data.serial_number,
            barcode: data.barcode,
            purchase_price: data.purchase_price,
            purchase_date: data.purchase_date,
            quantity: data.quantity,
            unit: data.unit,
            min_stock: data.min_stock,
            tags: data.tags,
            notes: data.notes,
            created_by: user_id.to_string(),
            is_archived: data.is_archived,
            created_at: 0,
            updated_at: 0,
        };

        let created = repo
            .create(&item)
            .await
            .map_err(|e| self.messages.fail(Failure::CreateItem, e))?;
        log::info!("item {} created in household {}", created.id, household_id);
        Ok(created)
    }

    pub async fn get_item(&self, household_id: &str, item_id: &str) -> Result<Item, String> {
        self.repo(household_id)
            .find_by_id(item_id)
            .await
            .map_err(|e| self.messages.fail(Failure::GetItem, e))?
            .ok_or_else(|| self.messages.text(Failure::ItemNotFound))
    }

    pub async fn get_items(
        &self,
        household_id: &str,
        options: &ItemListOptions,
    ) -> Result<Vec<Item>, String> {
        let query = options
            .to_query()
            .map_err(|e| self.messages.fail(Failure::InvalidQuery, e))?;
        self.repo(household_id)
            .list(&query)
            .await
            .map_err(|e| self.messages.fail(Failure::ListItems, e))
    }

    pub async fn update_item(
        &self,
        household_id: &str,
        item_id: &str,
        patch: &ItemPatch,
    ) -> Result<Item, String> {
        self.repo(household_id)
            .update(item_id, patch)
            .await
            .map_err(|e| {
                self.messages
                    .fail_lookup(Failure::UpdateItem, Failure::ItemNotFound, e)
            })
    }

    pub async fn set_archived(
        &self,
        household_id: &str,
        item_id: &str,
        is_archived: bool,
    ) -> Result<Item, String> {
        self.update_item(household_id, item_id, &ItemPatch::archived(is_archived))
            .await
    }

    pub async fn delete_item(&self, household_id: &str, item_id: &str) -> Result<(), String> {
        self.repo(household_id)
            .delete(item_id)
            .await
            .map_err(|e| self.messages.fail(Failure::DeleteItem, e))?;
        log::info!("item {} deleted from household {}", item_id, household_id);
        Ok(())
    }

    /// Case-insensitive search over name, description and tags.
    ///
    /// Only the newest `MAX_LIST_LIMIT` items are considered; hits keep
    /// the default newest-first order.
    pub async fn search_items(&self, household_id: &str, term: &str) -> Result<Vec<Item>, String> {
        let options = ItemListOptions {
            limit: Some(MAX_LIST_LIMIT),
            ..Default::default()
        };
        let query = options
            .to_query()
            .map_err(|e| self.messages.fail(Failure::SearchItems, e))?;
        let items = self
            .repo(household_id)
            .list(&query)
            .await
            .map_err(|e| self.messages.fail(Failure::SearchItems, e))?;

        let term = term.trim();
        if term.is_empty() {
            return Ok(items);
        }
        Ok(items.into_iter().filter(|i| i.matches_term(term)).collect())
    }
}
