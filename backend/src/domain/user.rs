//! User profile entity

use serde::{Deserialize, Serialize};

use super::document::Collection;
use super::entity::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Auto => "auto",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "light" => Theme::Light,
            "dark" => Theme::Dark,
            _ => Theme::Auto,
        }
    }
}

/// UI language; also selects boundary error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "nb-NO")]
    NbNo,
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "sv-SE")]
    SvSe,
    #[serde(rename = "da-DK")]
    DaDk,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::NbNo => "nb-NO",
            Language::EnUs => "en-US",
            Language::SvSe => "sv-SE",
            Language::DaDk => "da-DK",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "en-US" => Language::EnUs,
            "sv-SE" => Language::SvSe,
            "da-DK" => Language::DaDk,
            _ => Language::NbNo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "NOK")]
    Nok,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "SEK")]
    Sek,
    #[serde(rename = "DKK")]
    Dkk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub low_stock: bool,
    pub loan_reminders: bool,
    pub project_deadlines: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            low_stock: true,
            loan_reminders: true,
            project_deadlines: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub currency: Currency,
    #[serde(default)]
    pub notifications: NotificationSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Pro,
    Team,
}

/// Profile document stored for every authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub settings: UserSettings,
    #[serde(default)]
    pub households: Vec<String>,
    #[serde(default)]
    pub subscription_tier: SubscriptionTier,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl User {
    pub fn is_pro(&self) -> bool {
        matches!(
            self.subscription_tier,
            SubscriptionTier::Pro | SubscriptionTier::Team
        )
    }
}

impl Entity for User {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> &str {
        &self.uid
    }
}

/// Settings patch; unset fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationSettings>,
}

impl UserSettingsPatch {
    pub fn apply_to(&self, settings: &mut UserSettings) {
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(language) = self.language {
            settings.language = language;
        }
        if let Some(currency) = self.currency {
            settings.currency = currency;
        }
        if let Some(notifications) = &self.notifications {
            settings.notifications = notifications.clone();
        }
    }
}
