//! Sign-in, Sign-out and Biometric Unlock

use hms_backend::auth::{validate_email, AuthErrorCode, AuthUser, CredentialProvider};
use hms_backend::biometric::{authenticate_with_biometrics, is_biometric_available};

use super::{ClientError, ClientResult, InventoryClient};
use crate::models::{Language, User};
use crate::validation::{validate_sign_in, validate_sign_up};

impl InventoryClient {
    fn auth_error(&self, code: AuthErrorCode) -> ClientError {
        ClientError::Auth(code.message(self.language).to_string())
    }

    /// Load the profile and restore the household selected on this device,
    /// falling back to the first household on the profile
    async fn start_session(&self, auth_user: AuthUser, profile: User) -> ClientResult<()> {
        let stored = self.settings.selected_household().await?;
        let selected = stored
            .filter(|id| profile.households.contains(id))
            .or_else(|| profile.households.first().cloned());

        self.update_session(|s| {
            s.init(auth_user, Some(profile));
            s.select_household(selected);
        });
        Ok(())
    }

    /// Profile for a signed-in identity, created when the account has none
    async fn load_profile(&self, auth_user: &AuthUser) -> ClientResult<User> {
        let profile = self
            .services
            .users
            .get_or_create_user(
                &auth_user.uid,
                &auth_user.email,
                auth_user.display_name.as_deref(),
            )
            .await?;
        Ok(profile)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ClientResult<User> {
        validate_sign_in(email, password, self.language)?;
        let auth_user = self
            .auth
            .sign_in_with_email(email.trim(), password)
            .await
            .map_err(|code| self.auth_error(code))?;

        let profile = self.load_profile(&auth_user).await?;
        self.start_session(auth_user, profile.clone()).await?;
        tracing::info!("signed in as {}", profile.uid);
        Ok(profile)
    }

    /// Sign in with a Google or Apple ID token
    pub async fn sign_in_with_credential(
        &self,
        provider: CredentialProvider,
        id_token: &str,
    ) -> ClientResult<User> {
        let auth_user = self
            .auth
            .sign_in_with_credential(provider, id_token)
            .await
            .map_err(|code| self.auth_error(code))?;

        let profile = self.load_profile(&auth_user).await?;
        self.start_session(auth_user, profile.clone()).await?;
        tracing::info!("signed in as {} with {:?}", profile.uid, provider);
        Ok(profile)
    }

    /// Create the account and its profile document, then sign in
    pub async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> ClientResult<User> {
        validate_sign_up(email, password, display_name, self.language)?;
        let auth_user = self
            .auth
            .sign_up_with_email(email.trim(), password, display_name.trim())
            .await
            .map_err(|code| self.auth_error(code))?;

        let profile = self
            .services
            .users
            .create_user(&auth_user.uid, &auth_user.email, display_name.trim())
            .await?;
        self.start_session(auth_user, profile.clone()).await?;
        tracing::info!("signed up as {}", profile.uid);
        Ok(profile)
    }

    /// Ends the session and drops every cached query
    pub async fn sign_out(&self) -> ClientResult<()> {
        self.auth
            .sign_out()
            .await
            .map_err(|code| self.auth_error(code))?;
        self.update_session(|s| s.clear());
        self.queries.clear();
        tracing::info!("signed out");
        Ok(())
    }

    pub async fn reset_password(&self, email: &str) -> ClientResult<()> {
        if !validate_email(email.trim()) {
            return Err(self.auth_error(AuthErrorCode::InvalidEmail));
        }
        self.auth
            .reset_password(email.trim())
            .await
            .map_err(|code| self.auth_error(code))
    }

    /// Reload the signed-in user's profile
    pub async fn refresh_profile(&self) -> ClientResult<User> {
        let uid = self
            .session()
            .user_id()
            .map(String::from)
            .ok_or(ClientError::NotAuthenticated)?;
        let profile = self.services.users.get_user(&uid).await?;
        self.update_session(|s| s.set_profile(profile.clone()));
        Ok(profile)
    }

    fn biometric_unavailable(&self) -> ClientError {
        ClientError::Biometric(
            if self.language == Language::NbNo {
                "Biometrisk autentisering er ikke tilgjengelig på denne enheten"
            } else {
                "Biometric authentication is not available on this device"
            }
            .to_string(),
        )
    }

    /// Turning biometric unlock on requires a usable prompt
    pub async fn set_biometric_enabled(&self, enabled: bool) -> ClientResult<()> {
        if enabled {
            let available = match &self.biometric {
                Some(prompt) => is_biometric_available(prompt.as_ref()).await,
                None => false,
            };
            if !available {
                return Err(self.biometric_unavailable());
            }
        }
        self.settings.set_biometric_enabled(enabled).await?;
        Ok(())
    }

    /// Resume the provider's remembered identity after a biometric check.
    /// Only allowed when the user turned biometric unlock on.
    pub async fn biometric_unlock(&self) -> ClientResult<User> {
        if !self.settings.biometric_enabled().await? {
            return Err(ClientError::BiometricDisabled);
        }
        let prompt = self
            .biometric
            .as_ref()
            .ok_or_else(|| self.biometric_unavailable())?;
        authenticate_with_biometrics(prompt.as_ref(), self.language)
            .await
            .map_err(ClientError::Biometric)?;

        let auth_user = self
            .auth
            .current_user()
            .await
            .ok_or(ClientError::NotAuthenticated)?;
        let profile = self.load_profile(&auth_user).await?;
        self.start_session(auth_user, profile.clone()).await?;
        tracing::info!("unlocked session for {}", profile.uid);
        Ok(profile)
    }
}
