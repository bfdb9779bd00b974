//! Category Service

use std::sync::Arc;

use crate::domain::{Category, CategoryPatch, Direction, ListQuery, NewCategory};
use crate::repository::{DocumentStore, Repository};

use super::messages::{Failure, Messages};

#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn DocumentStore>,
    messages: Messages,
}

impl CategoryService {
    pub fn new(store: Arc<dyn DocumentStore>, messages: Messages) -> Self {
        Self { store, messages }
    }

    fn repo(&self, household_id: &str) -> Repository<Category> {
        Repository::in_household(self.store.clone(), household_id)
    }

    pub async fn create_category(
        &self,
        household_id: &str,
        data: NewCategory,
    ) -> Result<Category, String> {
        let repo = self.repo(household_id);
        let category = Category {
            id: repo.new_id(),
            household_id: household_id.to_string(),
            name: data.name,
            description: data.description,
            icon: data.icon,
            color: data.color,
            custom_fields: data.custom_fields,
            item_count: 0,
            created_at: 0,
            updated_at: 0,
        };
        repo.create(&category)
            .await
            .map_err(|e| self.messages.fail(Failure::CreateCategory, e))
    }

    pub async fn get_category(
        &self,
        household_id: &str,
        category_id: &str,
    ) -> Result<Category, String> {
        self.repo(household_id)
            .find_by_id(category_id)
            .await
            .map_err(|e| self.messages.fail(Failure::GetCategory, e))?
            .ok_or_else(|| self.messages.text(Failure::CategoryNotFound))
    }

    pub async fn get_categories(&self, household_id: &str) -> Result<Vec<Category>, String> {
        self.repo(household_id)
            .list(&ListQuery::new().order_by("name", Direction::Asc))
            .await
            .map_err(|e| self.messages.fail(Failure::ListCategories, e))
    }

    pub async fn update_category(
        &self,
        household_id: &str,
        category_id: &str,
        patch: &CategoryPatch,
    ) -> Result<Category, String> {
        self.repo(household_id)
            .update(category_id, patch)
            .await
            .map_err(|e| {
                self.messages
                    .fail_lookup(Failure::UpdateCategory, Failure::CategoryNotFound, e)
            })
    }

    pub async fn delete_category(
        &self,
        household_id: &str,
        category_id: &str,
    ) -> Result<(), String> {
        self.repo(household_id)
            .delete(category_id)
            .await
            .map_err(|e| self.messages.fail(Failure::DeleteCategory, e))
    }
}
