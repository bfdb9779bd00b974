//! Item Entity
//!
//! An inventory item owned by a household.

use serde::{Deserialize, Serialize};

use super::document::{Collection, Direction, ListQuery};
use super::entity::{DomainError, DomainResult, Entity, HouseholdScoped};

/// Hard cap on list queries (also used by search)
pub const MAX_LIST_LIMIT: usize = 1000;

fn default_unit() -> String {
    "stk".to_string()
}

/// An inventory item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub household_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub location_id: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub purchase_price: Option<f64>,
    #[serde(default)]
    pub purchase_date: Option<i64>,
    pub quantity: i64,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub min_stock: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_by: String,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Item {
    /// Value of the item (price times quantity); unpriced items count as zero
    pub fn value(&self) -> f64 {
        self.purchase_price.unwrap_or(0.0) * self.quantity as f64
    }

    /// Quantity below `min_stock`, or below the household's
    /// `default_threshold` when the item has no `min_stock`
    pub fn is_low_stock(&self, default_threshold: i64) -> bool {
        self.quantity < self.min_stock.unwrap_or(default_threshold)
    }

    /// Case-insensitive match on name, description and tags
    pub fn matches_term(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
            || self.tags.iter().any(|t| t.to_lowercase().contains(&needle))
    }
}

impl Entity for Item {
    const COLLECTION: Collection = Collection::Items;

    fn id(&self) -> &str {
        &self.id
    }
}

impl HouseholdScoped for Item {
    fn household_id(&self) -> &str {
        &self.household_id
    }
}

/// Fields supplied when creating an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<i64>,
    pub quantity: i64,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
}

impl NewItem {
    pub fn new(name: impl Into<String>, quantity: i64) -> Self {
        Self {
            name: name.into(),
            description: None,
            category_id: None,
            location_id: None,
            brand: None,
            model: None,
            serial_number: None,
            barcode: None,
            purchase_price: None,
            purchase_date: None,
            quantity,
            unit: default_unit(),
            min_stock: None,
            tags: Vec::new(),
            notes: None,
            is_archived: false,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.purchase_price = Some(price);
        self
    }

    pub fn at_location(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stock: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
}

impl ItemPatch {
    pub fn quantity(quantity: i64) -> Self {
        Self {
            quantity: Some(quantity),
            ..Default::default()
        }
    }

    pub fn price(price: f64) -> Self {
        Self {
            purchase_price: Some(price),
            ..Default::default()
        }
    }

    pub fn archived(is_archived: bool) -> Self {
        Self {
            is_archived: Some(is_archived),
            ..Default::default()
        }
    }
}

/// Fields items can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOrderField {
    Name,
    #[default]
    CreatedAt,
    UpdatedAt,
    PurchasePrice,
}

impl ItemOrderField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemOrderField::Name => "name",
            ItemOrderField::CreatedAt => "created_at",
            ItemOrderField::UpdatedAt => "updated_at",
            ItemOrderField::PurchasePrice => "purchase_price",
        }
    }
}

/// Typed list options for items (filters, ordering, limit)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemListOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    #[serde(default)]
    pub order_by: ItemOrderField,
    #[serde(default = "default_item_direction")]
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

fn default_item_direction() -> Direction {
    Direction::Desc
}

impl Default for ItemListOptions {
    fn default() -> Self {
        Self {
            category_id: None,
            location_id: None,
            is_archived: None,
            order_by: ItemOrderField::CreatedAt,
            direction: Direction::Desc,
            limit: None,
        }
    }
}

impl ItemListOptions {
    pub fn validate(&self) -> DomainResult<()> {
        match self.limit {
            Some(0) => Err(DomainError::InvalidInput("limit must be positive".into())),
            Some(n) if n > MAX_LIST_LIMIT => Err(DomainError::InvalidInput(format!(
                "limit {} exceeds {}",
                n, MAX_LIST_LIMIT
            ))),
            _ => Ok(()),
        }
    }

    /// Validate and lower into a store query
    pub fn to_query(&self) -> DomainResult<ListQuery> {
        self.validate()?;

        let mut query = ListQuery::new();
        if let Some(category_id) = &self.category_id {
            query = query.filter("category_id", category_id.as_str());
        }
        if let Some(location_id) = &self.location_id {
            query = query.filter("location_id", location_id.as_str());
        }
        if let Some(archived) = self.is_archived {
            query = query.filter("is_archived", archived);
        }
        query = query.order_by(self.order_by.as_str(), self.direction);
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        Ok(query)
    }
}
