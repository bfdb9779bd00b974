//! Client Models
//!
//! Entity types shared with the data layer, plus client-side aggregates.

use serde::{Deserialize, Serialize};

pub use hms_backend::auth::AuthUser;
pub use hms_backend::domain::{
    Category, Household, HouseholdRole, HouseholdSettings, Item, ItemListOptions, ItemPatch,
    Language, Loan, LoanStatus, Location, LocationPatch, NewCategory, NewHousehold, NewItem,
    NewLoan, NewLocation, NewProject, Project, ProjectStatus, SubscriptionTier, Theme, User,
};

/// Dashboard figures for one household
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HouseholdStats {
    pub item_count: usize,
    /// Sum of purchase price times quantity
    pub total_value: f64,
    pub low_stock_count: usize,
    pub active_loans: usize,
    pub overdue_loans: usize,
}

impl HouseholdStats {
    /// Aggregate over non-archived items. An item without its own
    /// `min_stock` is low when its quantity is below `low_stock_threshold`.
    pub fn compute(items: &[Item], loans: &[Loan], low_stock_threshold: i64, now: i64) -> Self {
        let live = items.iter().filter(|i| !i.is_archived);

        let mut stats = Self::default();
        for item in live {
            stats.item_count += 1;
            stats.total_value += item.value();
            if item.is_low_stock(low_stock_threshold) {
                stats.low_stock_count += 1;
            }
        }

        for loan in loans {
            if loan.status == LoanStatus::Overdue || loan.is_overdue_at(now) {
                stats.overdue_loans += 1;
            } else if loan.status == LoanStatus::Active {
                stats.active_loans += 1;
            }
        }
        stats
    }
}
