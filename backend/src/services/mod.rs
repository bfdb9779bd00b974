//! Service Layer
//!
//! One service per collection. Results leaving this layer are
//! `Result<T, String>` with a translated, user-facing message.

mod category_service;
mod demo_data;
mod household_service;
mod item_service;
mod loan_service;
mod location_service;
mod messages;
mod project_service;
mod user_service;


use std::sync::Arc;

use crate::domain::Language;
use crate::repository::DocumentStore;

pub use category_service::CategoryService;
pub use demo_data::{DemoDataService, DEMO_CATEGORY_IDS, DEMO_ITEM_IDS, DEMO_LOCATION_IDS};
pub use household_service::HouseholdService;
pub use item_service::ItemService;
pub use loan_service::LoanService;
pub use location_service::LocationService;
pub use messages::{Failure, Messages};
pub use project_service::ProjectService;
pub use user_service::UserService;

/// All services over one document store, speaking one language
#[derive(Clone)]
pub struct Services {
    pub households: HouseholdService,
    pub users: UserService,
    pub items: ItemService,
    pub locations: LocationService,
    pub categories: CategoryService,
    pub projects: ProjectService,
    pub loans: LoanService,
    pub demo: DemoDataService,
}

impl Services {
    pub fn new(store: Arc<dyn DocumentStore>, language: Language) -> Self {
        let messages = Messages::new(language);
        Self {
            households: HouseholdService::new(store.clone(), messages),
            users: UserService::new(store.clone(), messages),
            items: ItemService::new(store.clone(), messages),
            locations: LocationService::new(store.clone(), messages),
            categories: CategoryService::new(store.clone(), messages),
            projects: ProjectService::new(store.clone(), messages),
            loans: LoanService::new(store.clone(), messages),
            demo: DemoDataService::new(store, messages),
        }
    }
}
