//! Dashboard Statistics

use hms_backend::domain::{now_ms, ItemListOptions, LoanStatus, MAX_LIST_LIMIT};

use super::{ClientResult, InventoryClient};
use crate::models::HouseholdStats;
use crate::query::{EntityKind, QueryKey};

impl InventoryClient {
    async fn load_stats(&self, household_id: &str) -> Result<HouseholdStats, String> {
        let household = self.services.households.get_household(household_id).await?;
        let options = ItemListOptions {
            is_archived: Some(false),
            limit: Some(MAX_LIST_LIMIT),
            ..Default::default()
        };
        let items = self.services.items.get_items(household_id, &options).await?;
        let mut loans = self
            .services
            .loans
            .get_loans(household_id, Some(LoanStatus::Active))
            .await?;
        loans.extend(
            self.services
                .loans
                .get_loans(household_id, Some(LoanStatus::Overdue))
                .await?,
        );

        Ok(HouseholdStats::compute(
            &items,
            &loans,
            household.settings.low_stock_threshold,
            now_ms(),
        ))
    }

    pub async fn dashboard_stats(&self) -> ClientResult<HouseholdStats> {
        let hid = self.household_id()?;
        let key = QueryKey::list(EntityKind::Stats, &hid);
        let stale_time = self.queries.config().stale_time();
        let stats = self
            .queries
            .fetch(&key, stale_time, || self.load_stats(&hid))
            .await?;
        Ok(stats)
    }
}
