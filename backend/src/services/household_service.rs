//! Household Service

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;

use crate::domain::{
    now_ms, Household, HouseholdMember, HouseholdPatch, HouseholdRole, HouseholdSettings,
    ListQuery, NewHousehold,
};
use crate::repository::{DocumentStore, Repository};

use super::messages::{Failure, Messages};

#[derive(Clone)]
pub struct HouseholdService {
    repo: Repository<Household>,
    messages: Messages,
}

impl HouseholdService {
    pub fn new(store: Arc<dyn DocumentStore>, messages: Messages) -> Self {
        Self {
            repo: Repository::root(store),
            messages,
        }
    }

    /// Create a household owned by `owner_id`, who becomes its first member
    pub async fn create_household(
        &self,
        owner_id: &str,
        data: NewHousehold,
    ) -> Result<Household, String> {
        let owner = HouseholdMember {
            uid: owner_id.to_string(),
            role: HouseholdRole::Owner,
            joined_at: now_ms(),
            invited_by: owner_id.to_string(),
        };
        let household = Household {
            id: self.repo.new_id(),
            name: data.name,
            description: data.description,
            address: data.address,
            icon: data.icon,
            color: data.color,
            owner_id: owner_id.to_string(),
            members: BTreeMap::from([(owner_id.to_string(), owner)]),
            settings: HouseholdSettings::default(),
            item_count: 0,
            total_value: 0.0,
            created_at: 0,
            updated_at: 0,
        };

        let created = self
            .repo
            .create(&household)
            .await
            .map_err(|e| self.messages.fail(Failure::CreateHousehold, e))?;
        log::info!("household {} created by {}", created.id, owner_id);
        Ok(created)
    }

    pub async fn get_household(&self, household_id: &str) -> Result<Household, String> {
        self.repo
            .find_by_id(household_id)
            .await
            .map_err(|e| self.messages.fail(Failure::GetHousehold, e))?
            .ok_or_else(|| self.messages.text(Failure::HouseholdNotFound))
    }

    /// Households where `uid` is a member
    pub async fn get_user_households(&self, uid: &str) -> Result<Vec<Household>, String> {
        let households = self
            .repo
            .list(&ListQuery::new())
            .await
            .map_err(|e| self.messages.fail(Failure::ListHouseholds, e))?;
        Ok(households.into_iter().filter(|h| h.is_member(uid)).collect())
    }

    pub async fn update_household(
        &self,
        household_id: &str,
        patch: &HouseholdPatch,
    ) -> Result<Household, String> {
        self.repo.update(household_id, patch).await.map_err(|e| {
            self.messages
                .fail_lookup(Failure::UpdateHousehold, Failure::HouseholdNotFound, e)
        })
    }

    pub async fn add_member(
        &self,
        household_id: &str,
        uid: &str,
        role: HouseholdRole,
        invited_by: &str,
    ) -> Result<Household, String> {
        let mut household = self.get_household(household_id).await?;
        household.members.insert(
            uid.to_string(),
            HouseholdMember {
                uid: uid.to_string(),
                role,
                joined_at: now_ms(),
                invited_by: invited_by.to_string(),
            },
        );
        self.write_members(&household).await
    }

    /// Remove a member; the owner cannot be removed
    pub async fn remove_member(&self, household_id: &str, uid: &str) -> Result<Household, String> {
        let mut household = self.get_household(household_id).await?;
        if household.owner_id == uid {
            return Err(self.messages.text(Failure::RemoveOwner));
        }
        if household.members.remove(uid).is_none() {
            return Ok(household);
        }
        self.write_members(&household).await
    }

    async fn write_members(&self, household: &Household) -> Result<Household, String> {
        let patch = json!({ "members": household.members });
        self.repo
            .update(&household.id, &patch)
            .await
            .map_err(|e| self.messages.fail(Failure::UpdateHousehold, e))
    }
}
