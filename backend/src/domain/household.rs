//! Household domain entity
//!
//! The household is the ownership boundary for all inventory data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::document::Collection;
use super::entity::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HouseholdRole {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl HouseholdRole {
    pub fn can_edit(&self) -> bool {
        !matches!(self, HouseholdRole::Viewer)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdMember {
    pub uid: String,
    pub role: HouseholdRole,
    pub joined_at: i64,
    pub invited_by: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdSettings {
    pub default_currency: String,
    pub low_stock_threshold: i64,
    pub allow_guest_access: bool,
    pub require_approval_for_new_members: bool,
}

impl Default for HouseholdSettings {
    fn default() -> Self {
        Self {
            default_currency: "NOK".to_string(),
            low_stock_threshold: 5,
            allow_guest_access: false,
            require_approval_for_new_members: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    pub owner_id: String,
    #[serde(default)]
    pub members: BTreeMap<String, HouseholdMember>,
    #[serde(default)]
    pub settings: HouseholdSettings,
    #[serde(default)]
    pub item_count: i64,
    #[serde(default)]
    pub total_value: f64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl Household {
    pub fn is_member(&self, uid: &str) -> bool {
        self.members.contains_key(uid)
    }

    pub fn role_of(&self, uid: &str) -> Option<HouseholdRole> {
        self.members.get(uid).map(|m| m.role)
    }
}

impl Entity for Household {
    const COLLECTION: Collection = Collection::Households;

    fn id(&self) -> &str {
        &self.id
    }
}

/// Fields supplied when creating a household
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewHousehold {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NewHousehold {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HouseholdPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<HouseholdSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_value: Option<f64>,
}
