//! Client Commands
//!
//! [`InventoryClient`] is what screens call: it validates input, reads
//! through the query cache, and routes writes through the mutation
//! controller. Organized by domain.

mod catalog;
mod household;
mod item;
mod location;
mod session;
mod stats;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use hms_backend::auth::AuthProvider;
use hms_backend::biometric::BiometricPrompt;
use hms_backend::domain::DomainError;
use hms_backend::repository::{init_db, DocumentStore, SettingsRepository};
use hms_backend::Services;
use thiserror::Error;

use crate::cache::{CacheError, MutationController, QueryCache, QueryClient};
use crate::config::{ClientConfig, ConfigError};
use crate::context::SessionContext;
use crate::models::Language;
use crate::query::{EntityKind, QueryPrefix};
use crate::validation::FieldErrors;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Translated message from the service boundary
    #[error("{0}")]
    Service(String),
    #[error("{0}")]
    Validation(FieldErrors),
    #[error("not signed in")]
    NotAuthenticated,
    #[error("no household selected")]
    NoHousehold,
    /// Translated identity-provider failure
    #[error("{0}")]
    Auth(String),
    #[error("biometric unlock is turned off")]
    BiometricDisabled,
    #[error("{0}")]
    Biometric(String),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("device settings: {0}")]
    Settings(#[from] DomainError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<String> for ClientError {
    fn from(message: String) -> Self {
        ClientError::Service(message)
    }
}

impl From<FieldErrors> for ClientError {
    fn from(errors: FieldErrors) -> Self {
        ClientError::Validation(errors)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

pub struct InventoryClient {
    services: Services,
    queries: QueryClient,
    mutations: MutationController,
    auth: Arc<dyn AuthProvider>,
    biometric: Option<Arc<dyn BiometricPrompt>>,
    settings: SettingsRepository,
    session: RwLock<SessionContext>,
    language: Language,
}

impl InventoryClient {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
        settings: SettingsRepository,
        config: &ClientConfig,
    ) -> Self {
        let cache = Arc::new(QueryCache::new());
        Self {
            services: Services::new(store, config.language),
            queries: QueryClient::new(cache.clone(), config.query.clone()),
            mutations: MutationController::new(cache),
            auth,
            biometric: None,
            settings,
            session: RwLock::new(SessionContext::new()),
            language: config.language,
        }
    }

    /// Open the device settings database named by `config` (in memory when
    /// unset) and build a client over it
    pub async fn open(
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
        config: &ClientConfig,
    ) -> ClientResult<Self> {
        let db_path = config
            .db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(":memory:"));
        let db = match init_db(&db_path).await {
            Ok(db) => {
                let _ = rolling_logger::info(&format!("settings db ready at {}", db_path.display()));
                db
            }
            Err(e) => {
                let _ = rolling_logger::error(&format!("settings db init failed: {}", e));
                return Err(e.into());
            }
        };
        Ok(Self::new(
            store,
            auth,
            SettingsRepository::new(db.connection()),
            config,
        ))
    }

    pub fn with_biometric(mut self, prompt: Arc<dyn BiometricPrompt>) -> Self {
        self.biometric = Some(prompt);
        self
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn settings(&self) -> &SettingsRepository {
        &self.settings
    }

    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    /// Snapshot of the current session
    pub fn session(&self) -> SessionContext {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update_session<R>(&self, f: impl FnOnce(&mut SessionContext) -> R) -> R {
        let mut session = self.session.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut session)
    }

    fn user_id(&self) -> ClientResult<String> {
        let session = self.session.read().unwrap_or_else(PoisonError::into_inner);
        if !session.is_authenticated() {
            return Err(ClientError::NotAuthenticated);
        }
        session
            .user_id()
            .map(String::from)
            .ok_or(ClientError::NotAuthenticated)
    }

    fn household_id(&self) -> ClientResult<String> {
        self.user_id()?;
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .selected_household()
            .map(String::from)
            .ok_or(ClientError::NoHousehold)
    }

    /// Dashboard figures derive from items and loans
    fn invalidate_stats(&self, household_id: &str) {
        self.queries
            .invalidate(&QueryPrefix::new(EntityKind::Stats, household_id));
    }
}
