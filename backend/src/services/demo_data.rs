//! Demo Data
//!
//! Seeds a household with a small, fixed inventory. Documents use fixed
//! `demo-*` ids; seeding twice leaves existing documents untouched.

use std::sync::Arc;

use crate::domain::{
    Category, DomainError, DomainResult, Entity, Item, Location, Project, ProjectMaterial,
    ProjectPriority, ProjectStatus, ProjectTask,
};
use crate::repository::{DocumentStore, Repository};

use super::messages::{Failure, Messages};

pub const DEMO_LOCATION_IDS: [&str; 3] = ["demo-loc-1", "demo-loc-2", "demo-loc-3"];
pub const DEMO_CATEGORY_IDS: [&str; 2] = ["demo-cat-1", "demo-cat-2"];
pub const DEMO_ITEM_IDS: [&str; 5] = [
    "demo-item-1",
    "demo-item-2",
    "demo-item-3",
    "demo-item-4",
    "demo-item-5",
];
const DEMO_PROJECT_ID: &str = "demo-project-1";

#[derive(Clone)]
pub struct DemoDataService {
    store: Arc<dyn DocumentStore>,
    messages: Messages,
}

/// Create unless a document with the same id exists
async fn insert_missing<T: Entity>(repo: &Repository<T>, entity: T) -> DomainResult<bool> {
    match repo.create(&entity).await {
        Ok(_) => Ok(true),
        Err(DomainError::Conflict(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

fn location(household_id: &str, id: &str, name: &str, description: &str, icon: &str, color: &str) -> Location {
    Location {
        id: id.to_string(),
        household_id: household_id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        parent_id: None,
        icon: Some(icon.to_string()),
        color: Some(color.to_string()),
        qr_code: Some(format!("qr-{}", id)),
        item_count: 0,
        path: vec![id.to_string()],
        created_at: 0,
        updated_at: 0,
    }
}

fn category(household_id: &str, id: &str, name: &str, icon: &str, color: &str) -> Category {
    Category {
        id: id.to_string(),
        household_id: household_id.to_string(),
        name: name.to_string(),
        description: None,
        icon: Some(icon.to_string()),
        color: Some(color.to_string()),
        custom_fields: Vec::new(),
        item_count: 0,
        created_at: 0,
        updated_at: 0,
    }
}

struct DemoItem {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category_id: &'static str,
    location_id: &'static str,
    brand: Option<&'static str>,
    model: Option<&'static str>,
    price: f64,
    tags: &'static [&'static str],
}

const DEMO_ITEMS: [DemoItem; 5] = [
    DemoItem {
        id: "demo-item-1",
        name: "Samsung TV 55\"",
        description: "Smart TV i stuen",
        category_id: "demo-cat-1",
        location_id: "demo-loc-1",
        brand: Some("Samsung"),
        model: Some("UE55TU7025"),
        price: 5999.0,
        tags: &["elektronikk", "tv", "stue"],
    },
    DemoItem {
        id: "demo-item-2",
        name: "Bosch Drill",
        description: "Trådløs drill med batterier",
        category_id: "demo-cat-2",
        location_id: "demo-loc-3",
        brand: Some("Bosch"),
        model: Some("PSR 1800 LI-2"),
        price: 1299.0,
        tags: &["verktøy", "drill"],
    },
    DemoItem {
        id: "demo-item-3",
        name: "Miele Oppvaskmaskin",
        description: "Integrert oppvaskmaskin",
        category_id: "demo-cat-1",
        location_id: "demo-loc-2",
        brand: Some("Miele"),
        model: None,
        price: 8999.0,
        tags: &["hvitevarer", "kjøkken"],
    },
    DemoItem {
        id: "demo-item-4",
        name: "Verktøykasse",
        description: "Komplett verktøysett",
        category_id: "demo-cat-2",
        location_id: "demo-loc-3",
        brand: None,
        model: None,
        price: 599.0,
        tags: &["verktøy"],
    },
    DemoItem {
        id: "demo-item-5",
        name: "Kaffemaskin",
        description: "Nespresso kaffemaskin",
        category_id: "demo-cat-1",
        location_id: "demo-loc-2",
        brand: Some("Nespresso"),
        model: Some("Pixie"),
        price: 1499.0,
        tags: &["kaffe", "kjøkken"],
    },
];

impl DemoItem {
    fn to_item(&self, household_id: &str, user_id: &str) -> Item {
        Item {
            id: self.id.to_string(),
            household_id: household_id.to_string(),
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            category_id: Some(self.category_id.to_string()),
            location_id: Some(self.location_id.to_string()),
            brand: self.brand.map(String::from),
            model: self.model.map(String::from),
            serial_number: None,
            barcode: None,
            purchase_price: Some(self.price),
            purchase_date: None,
            quantity: 1,
            unit: "stk".to_string(),
            min_stock: None,
            tags: self.tags.iter().map(|t| t.to_string()).collect(),
            notes: None,
            created_by: user_id.to_string(),
            is_archived: false,
            created_at: 0,
            updated_at: 0,
        }
    }
}

fn demo_project(household_id: &str, user_id: &str) -> Project {
    let task = |id: &str, title: &str| ProjectTask {
        id: id.to_string(),
        title: title.to_string(),
        description: None,
        completed: false,
        completed_at: None,
        assigned_to: None,
    };
    Project {
        id: DEMO_PROJECT_ID.to_string(),
        household_id: household_id.to_string(),
        name: "Renovere garasje".to_string(),
        description: Some("Male vegger og organisere verktøy".to_string()),
        status: ProjectStatus::Planning,
        priority: ProjectPriority::Medium,
        start_date: None,
        deadline: None,
        completed_at: None,
        budget: Some(5000.0),
        actual_cost: Some(0.0),
        materials: vec![ProjectMaterial {
            item_id: "demo-item-2".to_string(),
            item_name: "Bosch Drill".to_string(),
            quantity: 1,
            unit: "stk".to_string(),
            estimated_cost: None,
            purchased: true,
        }],
        tasks: vec![task("task-1", "Kjøpe maling"), task("task-2", "Rydde garasje")],
        notes: None,
        created_by: user_id.to_string(),
        created_at: 0,
        updated_at: 0,
    }
}

impl DemoDataService {
    pub fn new(store: Arc<dyn DocumentStore>, messages: Messages) -> Self {
        Self { store, messages }
    }

    /// Seed locations, categories, items and one project into `household_id`.
    /// Returns the number of documents written.
    pub async fn seed_demo_data(&self, household_id: &str, user_id: &str) -> Result<usize, String> {
        self.seed(household_id, user_id)
            .await
            .map_err(|e| self.messages.fail(Failure::SeedDemoData, e))
    }

    async fn seed(&self, household_id: &str, user_id: &str) -> DomainResult<usize> {
        let locations: Repository<Location> =
            Repository::in_household(self.store.clone(), household_id);
        let categories: Repository<Category> =
            Repository::in_household(self.store.clone(), household_id);
        let items: Repository<Item> = Repository::in_household(self.store.clone(), household_id);
        let projects: Repository<Project> =
            Repository::in_household(self.store.clone(), household_id);

        let mut written = 0;
        let demo_locations = [
            location(household_id, DEMO_LOCATION_IDS[0], "Stue", "Hovedstue med sofa og TV", "sofa", "#4CAF50"),
            location(household_id, DEMO_LOCATION_IDS[1], "Kjøkken", "Kjøkken med hvitevarer", "silverware-fork-knife", "#FF9800"),
            location(household_id, DEMO_LOCATION_IDS[2], "Garasje", "Garasje med verktøy", "garage", "#2196F3"),
        ];
        for loc in demo_locations {
            written += insert_missing(&locations, loc).await? as usize;
        }

        let demo_categories = [
            category(household_id, DEMO_CATEGORY_IDS[0], "Elektronikk", "laptop", "#9C27B0"),
            category(household_id, DEMO_CATEGORY_IDS[1], "Verktøy", "tools", "#F44336"),
        ];
        for cat in demo_categories {
            written += insert_missing(&categories, cat).await? as usize;
        }

        for demo in &DEMO_ITEMS {
            written += insert_missing(&items, demo.to_item(household_id, user_id)).await? as usize;
        }

        written += insert_missing(&projects, demo_project(household_id, user_id)).await? as usize;

        log::info!("seeded {} demo documents into household {}", written, household_id);
        Ok(written)
    }
}
