//! User Profile Service

use std::sync::Arc;

use serde_json::json;

use crate::domain::{SubscriptionTier, User, UserSettings, UserSettingsPatch};
use crate::repository::{DocumentStore, Repository};

use super::messages::{Failure, Messages};

fn profile_name(email: &str, display_name: Option<&str>) -> String {
    display_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .or_else(|| email.split('@').next().filter(|local| !local.is_empty()))
        .unwrap_or("User")
        .to_string()
}

#[derive(Clone)]
pub struct UserService {
    repo: Repository<User>,
    messages: Messages,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>, messages: Messages) -> Self {
        Self {
            repo: Repository::root(store),
            messages,
        }
    }

    /// Create the profile document for a freshly signed-up account
    pub async fn create_user(
        &self,
        uid: &str,
        email: &str,
        display_name: &str,
    ) -> Result<User, String> {
        let user = User {
            uid: uid.to_string(),
            display_name: display_name.to_string(),
            email: email.to_string(),
            photo_url: None,
            settings: UserSettings::default(),
            households: Vec::new(),
            subscription_tier: SubscriptionTier::Free,
            created_at: 0,
            updated_at: 0,
        };
        self.repo
            .create(&user)
            .await
            .map_err(|e| self.messages.fail(Failure::CreateUser, e))
    }

    /// Load the profile for `uid`, creating it when the account has none.
    /// The name falls back to the email's local part, then to "User".
    pub async fn get_or_create_user(
        &self,
        uid: &str,
        email: &str,
        display_name: Option<&str>,
    ) -> Result<User, String> {
        let existing = self
            .repo
            .find_by_id(uid)
            .await
            .map_err(|e| self.messages.fail(Failure::GetUser, e))?;
        if let Some(user) = existing {
            return Ok(user);
        }

        let name = profile_name(email, display_name);
        log::info!("creating missing profile for {}", uid);
        self.create_user(uid, email, &name).await
    }

    pub async fn get_user(&self, uid: &str) -> Result<User, String> {
        self.repo
            .find_by_id(uid)
            .await
            .map_err(|e| self.messages.fail(Failure::GetUser, e))?
            .ok_or_else(|| self.messages.text(Failure::UserNotFound))
    }

    /// Merge `patch` into the stored settings
    pub async fn update_settings(
        &self,
        uid: &str,
        patch: &UserSettingsPatch,
    ) -> Result<User, String> {
        let user = self.get_user(uid).await?;
        let mut settings = user.settings;
        patch.apply_to(&mut settings);
        self.repo
            .update(uid, &json!({ "settings": settings }))
            .await
            .map_err(|e| self.messages.fail(Failure::UpdateUser, e))
    }

    /// Record membership on the profile; adding twice is a no-op
    pub async fn add_household(&self, uid: &str, household_id: &str) -> Result<User, String> {
        let mut user = self.get_user(uid).await?;
        if user.households.iter().any(|h| h == household_id) {
            return Ok(user);
        }
        user.households.push(household_id.to_string());
        self.write_households(&user).await
    }

    pub async fn remove_household(&self, uid: &str, household_id: &str) -> Result<User, String> {
        let mut user = self.get_user(uid).await?;
        let before = user.households.len();
        user.households.retain(|h| h != household_id);
        if user.households.len() == before {
            return Ok(user);
        }
        self.write_households(&user).await
    }

    async fn write_households(&self, user: &User) -> Result<User, String> {
        self.repo
            .update(&user.uid, &json!({ "households": user.households }))
            .await
            .map_err(|e| self.messages.fail(Failure::UpdateUser, e))
    }
}
