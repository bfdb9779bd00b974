//! Household Commands

use super::{ClientError, ClientResult, InventoryClient};
use crate::models::{Household, NewHousehold};
use crate::query::{EntityKind, QueryKey, QueryPrefix};
use crate::validation::validate_new_household;

impl InventoryClient {
    /// Households the signed-in user belongs to
    pub async fn list_households(&self) -> ClientResult<Vec<Household>> {
        let uid = self.user_id()?;
        let key = QueryKey::list(EntityKind::Households, &uid);
        let stale_time = self.queries.config().stale_time();
        let households = self
            .queries
            .fetch(&key, stale_time, || {
                self.services.households.get_user_households(&uid)
            })
            .await?;
        Ok(households)
    }

    /// Create a household, record it on the user's profile and select it
    pub async fn create_household(&self, data: NewHousehold) -> ClientResult<Household> {
        validate_new_household(&data, self.language)?;
        let uid = self.user_id()?;

        let prefix = QueryPrefix::new(EntityKind::Households, &uid);
        let household = self
            .mutations
            .commit(&prefix, || self.services.households.create_household(&uid, data))
            .await?;

        let profile = self.services.users.add_household(&uid, &household.id).await?;
        self.update_session(|s| s.set_profile(profile));
        self.select_household(&household.id).await?;

        tracing::info!("household {} ready", household.id);
        Ok(household)
    }

    /// Make `household_id` current and remember it on this device
    pub async fn select_household(&self, household_id: &str) -> ClientResult<()> {
        let member = self
            .session()
            .profile()
            .is_some_and(|p| p.households.iter().any(|h| h == household_id));
        if !member {
            return Err(ClientError::NoHousehold);
        }
        self.settings.set_selected_household(household_id).await?;
        self.update_session(|s| s.select_household(Some(household_id.to_string())));
        Ok(())
    }

    /// The selected household document
    pub async fn current_household(&self) -> ClientResult<Household> {
        let hid = self.household_id()?;
        let key = QueryKey::detail(EntityKind::Households, &hid, &hid);
        let stale_time = self.queries.config().stale_time();
        let household = self
            .queries
            .fetch(&key, stale_time, || self.services.households.get_household(&hid))
            .await?;
        Ok(household)
    }

    /// Fill the selected household with sample data; returns the number of
    /// documents written
    pub async fn seed_demo_data(&self) -> ClientResult<usize> {
        let uid = self.user_id()?;
        let hid = self.household_id()?;
        let written = self.services.demo.seed_demo_data(&hid, &uid).await?;
        for kind in [
            EntityKind::Items,
            EntityKind::Locations,
            EntityKind::Categories,
            EntityKind::Projects,
            EntityKind::Stats,
        ] {
            self.queries.invalidate(&QueryPrefix::new(kind, &hid));
        }
        Ok(written)
    }
}
