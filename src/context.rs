//! Session Context
//!
//! Who is signed in and which household is selected. Owned by the client
//! and passed explicitly; there is no global session.

use crate::models::{AuthUser, User};

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    auth_user: Option<AuthUser>,
    profile: Option<User>,
    selected_household: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for a signed-in identity. The profile may still be
    /// loading, in which case the session is not yet authenticated.
    pub fn init(&mut self, auth_user: AuthUser, profile: Option<User>) {
        self.auth_user = Some(auth_user);
        self.profile = profile;
        self.selected_household = None;
    }

    pub fn set_profile(&mut self, profile: User) {
        self.profile = Some(profile);
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Both the identity and its profile are present
    pub fn is_authenticated(&self) -> bool {
        self.auth_user.is_some() && self.profile.is_some()
    }

    pub fn is_pro(&self) -> bool {
        self.profile.as_ref().is_some_and(User::is_pro)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.auth_user.as_ref().map(|u| u.uid.as_str())
    }

    pub fn auth_user(&self) -> Option<&AuthUser> {
        self.auth_user.as_ref()
    }

    pub fn profile(&self) -> Option<&User> {
        self.profile.as_ref()
    }

    pub fn select_household(&mut self, household_id: Option<String>) {
        self.selected_household = household_id;
    }

    pub fn selected_household(&self) -> Option<&str> {
        self.selected_household.as_deref()
    }
}
