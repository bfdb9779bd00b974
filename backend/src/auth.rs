//! Authentication
//!
//! The identity provider is an external collaborator behind [`AuthProvider`].
//! Failures are reported as [`AuthErrorCode`]s and rendered into user-facing
//! text with [`AuthErrorCode::message`].

use std::collections::HashMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::domain::Language;

const MIN_PASSWORD_LEN: usize = 6;
const STRONG_PASSWORD_LEN: usize = 8;

/// Identity returned by the provider after sign-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthErrorCode {
    InvalidEmail,
    UserDisabled,
    UserNotFound,
    WrongPassword,
    EmailAlreadyInUse,
    WeakPassword,
    OperationNotAllowed,
    TooManyRequests,
    NetworkRequestFailed,
    Unknown,
}

impl AuthErrorCode {
    /// Parse a provider code such as `auth/wrong-password`
    pub fn from_code(code: &str) -> Self {
        match code.strip_prefix("auth/").unwrap_or(code) {
            "invalid-email" => AuthErrorCode::InvalidEmail,
            "user-disabled" => AuthErrorCode::UserDisabled,
            "user-not-found" => AuthErrorCode::UserNotFound,
            "wrong-password" => AuthErrorCode::WrongPassword,
            "email-already-in-use" => AuthErrorCode::EmailAlreadyInUse,
            "weak-password" => AuthErrorCode::WeakPassword,
            "operation-not-allowed" => AuthErrorCode::OperationNotAllowed,
            "too-many-requests" => AuthErrorCode::TooManyRequests,
            "network-request-failed" => AuthErrorCode::NetworkRequestFailed,
            _ => AuthErrorCode::Unknown,
        }
    }

    pub fn message(&self, language: Language) -> &'static str {
        use AuthErrorCode::*;
        match language {
            Language::NbNo => match self {
                InvalidEmail => "Ugyldig e-postadresse",
                UserDisabled => "Denne kontoen er deaktivert",
                UserNotFound => "Ingen bruker funnet med denne e-posten",
                WrongPassword => "Feil passord",
                EmailAlreadyInUse => "E-postadressen er allerede i bruk",
                WeakPassword => "Passordet er for svakt (minimum 6 tegn)",
                OperationNotAllowed => "Denne påloggingsmetoden er ikke aktivert",
                TooManyRequests => "For mange forsøk. Prøv igjen senere",
                NetworkRequestFailed => "Nettverksfeil. Sjekk internettforbindelsen",
                Unknown => "En feil oppstod. Prøv igjen",
            },
            _ => match self {
                InvalidEmail => "Invalid email address",
                UserDisabled => "This account has been disabled",
                UserNotFound => "No user found with this email",
                WrongPassword => "Wrong password",
                EmailAlreadyInUse => "This email address is already in use",
                WeakPassword => "The password is too weak (at least 6 characters)",
                OperationNotAllowed => "This sign-in method is not enabled",
                TooManyRequests => "Too many attempts. Try again later",
                NetworkRequestFailed => "Network error. Check your connection",
                Unknown => "Something went wrong. Try again",
            },
        }
    }
}

impl std::fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message(Language::EnUs))
    }
}

impl std::error::Error for AuthErrorCode {}

pub type AuthResult<T> = Result<T, AuthErrorCode>;

/// Third-party identity whose ID token the provider accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialProvider {
    Google,
    Apple,
}

/// Identity provider for email/password and federated sign-in
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_email(&self, email: &str, password: &str) -> AuthResult<AuthUser>;

    /// Sign in with an ID token issued by `provider`
    async fn sign_in_with_credential(
        &self,
        provider: CredentialProvider,
        id_token: &str,
    ) -> AuthResult<AuthUser>;

    async fn sign_up_with_email(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> AuthResult<AuthUser>;

    async fn sign_out(&self) -> AuthResult<()>;

    async fn reset_password(&self, email: &str) -> AuthResult<()>;

    async fn current_user(&self) -> Option<AuthUser>;
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

/// Loose `local@domain.tld` shape check
pub fn validate_email(email: &str) -> bool {
    email_regex().is_some_and(|re| re.is_match(email))
}

/// Advice attached to an acceptable-but-weak password, or the reason for
/// rejecting one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordHint {
    TooShort,
    UseEightCharacters,
    AddDigits,
}

impl PasswordHint {
    pub fn message(&self, language: Language) -> &'static str {
        match (language, self) {
            (Language::NbNo, PasswordHint::TooShort) => "Passordet må være minst 6 tegn",
            (Language::NbNo, PasswordHint::UseEightCharacters) => {
                "Passordet er svakt. Bruk minst 8 tegn"
            }
            (Language::NbNo, PasswordHint::AddDigits) => "Passord med tall er sikrere",
            (_, PasswordHint::TooShort) => "The password must be at least 6 characters",
            (_, PasswordHint::UseEightCharacters) => "Weak password. Use at least 8 characters",
            (_, PasswordHint::AddDigits) => "Passwords with digits are safer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordCheck {
    pub valid: bool,
    pub hint: Option<PasswordHint>,
}

/// Passwords shorter than 6 characters are rejected; hints are advisory
pub fn validate_password(password: &str) -> PasswordCheck {
    let len = password.chars().count();
    let (valid, hint) = if len < MIN_PASSWORD_LEN {
        (false, Some(PasswordHint::TooShort))
    } else if len < STRONG_PASSWORD_LEN {
        (true, Some(PasswordHint::UseEightCharacters))
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        (true, Some(PasswordHint::AddDigits))
    } else {
        (true, None)
    };
    PasswordCheck { valid, hint }
}

struct Account {
    user: AuthUser,
    password_hash: blake3::Hash,
    disabled: bool,
}

/// In-process identity provider for tests and demos
#[derive(Default)]
pub struct MemoryAuthProvider {
    accounts: RwLock<HashMap<String, Account>>,
    credentials: RwLock<HashMap<(CredentialProvider, String), AuthUser>>,
    current: RwLock<Option<AuthUser>>,
    reset_requests: RwLock<Vec<String>>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl MemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn disable_account(&self, email: &str) {
        if let Some(account) = self.accounts.write().await.get_mut(&normalize_email(email)) {
            account.disabled = true;
        }
    }

    /// Accept `id_token` from `provider` as the identity `email`
    pub async fn register_credential(
        &self,
        provider: CredentialProvider,
        id_token: &str,
        email: &str,
        display_name: Option<&str>,
    ) -> AuthUser {
        let user = AuthUser {
            uid: uuid::Uuid::new_v4().to_string(),
            email: normalize_email(email),
            display_name: display_name.map(String::from),
        };
        self.credentials
            .write()
            .await
            .insert((provider, id_token.to_string()), user.clone());
        user
    }

    /// Emails for which a password reset was requested
    pub async fn reset_requests(&self) -> Vec<String> {
        self.reset_requests.read().await.clone()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn sign_in_with_email(&self, email: &str, password: &str) -> AuthResult<AuthUser> {
        if !validate_email(email) {
            return Err(AuthErrorCode::InvalidEmail);
        }
        let accounts = self.accounts.read().await;
        let account = accounts
            .get(&normalize_email(email))
            .ok_or(AuthErrorCode::UserNotFound)?;
        if account.disabled {
            return Err(AuthErrorCode::UserDisabled);
        }
        if account.password_hash != blake3::hash(password.as_bytes()) {
            log::warn!("failed sign-in for {}", account.user.uid);
            return Err(AuthErrorCode::WrongPassword);
        }

        let user = account.user.clone();
        *self.current.write().await = Some(user.clone());
        log::info!("user {} signed in", user.uid);
        Ok(user)
    }

    async fn sign_in_with_credential(
        &self,
        provider: CredentialProvider,
        id_token: &str,
    ) -> AuthResult<AuthUser> {
        let user = self
            .credentials
            .read()
            .await
            .get(&(provider, id_token.to_string()))
            .cloned()
            .ok_or_else(|| {
                log::warn!("rejected {:?} credential", provider);
                AuthErrorCode::Unknown
            })?;

        *self.current.write().await = Some(user.clone());
        log::info!("user {} signed in with {:?}", user.uid, provider);
        Ok(user)
    }

    async fn sign_up_with_email(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> AuthResult<AuthUser> {
        if !validate_email(email) {
            return Err(AuthErrorCode::InvalidEmail);
        }
        if !validate_password(password).valid {
            return Err(AuthErrorCode::WeakPassword);
        }

        let key = normalize_email(email);
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(AuthErrorCode::EmailAlreadyInUse);
        }

        let user = AuthUser {
            uid: uuid::Uuid::new_v4().to_string(),
            email: key.clone(),
            display_name: Some(display_name.to_string()),
        };
        accounts.insert(
            key,
            Account {
                user: user.clone(),
                password_hash: blake3::hash(password.as_bytes()),
                disabled: false,
            },
        );
        *self.current.write().await = Some(user.clone());
        log::info!("user {} signed up", user.uid);
        Ok(user)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        *self.current.write().await = None;
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> AuthResult<()> {
        if !validate_email(email) {
            return Err(AuthErrorCode::InvalidEmail);
        }
        let key = normalize_email(email);
        if !self.accounts.read().await.contains_key(&key) {
            return Err(AuthErrorCode::UserNotFound);
        }
        self.reset_requests.write().await.push(key);
        Ok(())
    }

    async fn current_user(&self) -> Option<AuthUser> {
        self.current.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("kari@example.com"));
        assert!(!validate_email("kari@example"));
        assert!(!validate_email("kari example@x.no"));
        assert!(!validate_email(""));
    }

    #[test]
    fn test_validate_password_hints() {
        assert_eq!(
            validate_password("abc"),
            PasswordCheck { valid: false, hint: Some(PasswordHint::TooShort) }
        );
        assert_eq!(validate_password("abcdef").hint, Some(PasswordHint::UseEightCharacters));
        assert_eq!(validate_password("abcdefgh").hint, Some(PasswordHint::AddDigits));
        assert_eq!(validate_password("abcdefg1"), PasswordCheck { valid: true, hint: None });
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AuthErrorCode::from_code("auth/wrong-password"), AuthErrorCode::WrongPassword);
        assert_eq!(AuthErrorCode::from_code("auth/whatever"), AuthErrorCode::Unknown);
        assert_eq!(AuthErrorCode::WrongPassword.message(Language::NbNo), "Feil passord");
    }

    #[tokio::test]
    async fn test_memory_provider_flow() {
        let auth = MemoryAuthProvider::new();

        let user = auth
            .sign_up_with_email("Kari@Example.com", "hemmelig1", "Kari")
            .await
            .unwrap();
        assert_eq!(user.email, "kari@example.com");
        assert_eq!(auth.current_user().await, Some(user.clone()));

        assert_eq!(
            auth.sign_up_with_email("kari@example.com", "hemmelig1", "Kari").await,
            Err(AuthErrorCode::EmailAlreadyInUse)
        );
        assert_eq!(
            auth.sign_up_with_email("ola@example.com", "123", "Ola").await,
            Err(AuthErrorCode::WeakPassword)
        );

        auth.sign_out().await.unwrap();
        assert!(auth.current_user().await.is_none());

        assert_eq!(
            auth.sign_in_with_email("kari@example.com", "feil").await,
            Err(AuthErrorCode::WrongPassword)
        );
        assert_eq!(
            auth.sign_in_with_email("nobody@example.com", "x").await,
            Err(AuthErrorCode::UserNotFound)
        );
        let again = auth.sign_in_with_email("kari@example.com", "hemmelig1").await.unwrap();
        assert_eq!(again.uid, user.uid);

        auth.reset_password("kari@example.com").await.unwrap();
        assert_eq!(auth.reset_requests().await, vec!["kari@example.com"]);

        auth.disable_account("kari@example.com").await;
        assert_eq!(
            auth.sign_in_with_email("kari@example.com", "hemmelig1").await,
            Err(AuthErrorCode::UserDisabled)
        );
    }

    #[tokio::test]
    async fn test_credential_sign_in() {
        let auth = MemoryAuthProvider::new();
        let registered = auth
            .register_credential(CredentialProvider::Apple, "apple-token", "Per@icloud.com", None)
            .await;

        let user = auth
            .sign_in_with_credential(CredentialProvider::Apple, "apple-token")
            .await
            .unwrap();
        assert_eq!(user, registered);
        assert_eq!(user.email, "per@icloud.com");
        assert_eq!(auth.current_user().await, Some(user));

        assert_eq!(
            auth.sign_in_with_credential(CredentialProvider::Google, "apple-token").await,
            Err(AuthErrorCode::Unknown)
        );
    }
}
