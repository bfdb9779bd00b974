//! Device Settings Repository
//!
//! Small set of device-local flags persisted in SQLite.

use std::sync::Arc;

use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;

use crate::domain::{DomainResult, Language, Theme};

const ONBOARDING_COMPLETED: &str = "onboarding_completed";
const SELECTED_HOUSEHOLD: &str = "selected_household";
const BIOMETRIC_ENABLED: &str = "biometric_enabled";
const THEME: &str = "theme";
const LANGUAGE: &str = "language";
const LAST_SYNC: &str = "last_sync";

#[derive(Clone)]
pub struct SettingsRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SettingsRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    async fn get(&self, key: &str) -> DomainResult<Option<String>> {
        let conn = self.conn.lock().await;
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?, ?)",
            params![key, value],
        )?;
        Ok(())
    }

    async fn get_bool(&self, key: &str) -> DomainResult<bool> {
        Ok(self.get(key).await?.as_deref() == Some("true"))
    }

    async fn set_bool(&self, key: &str, value: bool) -> DomainResult<()> {
        self.set(key, if value { "true" } else { "false" }).await
    }

    pub async fn onboarding_completed(&self) -> DomainResult<bool> {
        self.get_bool(ONBOARDING_COMPLETED).await
    }

    pub async fn set_onboarding_completed(&self, completed: bool) -> DomainResult<()> {
        self.set_bool(ONBOARDING_COMPLETED, completed).await
    }

    pub async fn selected_household(&self) -> DomainResult<Option<String>> {
        self.get(SELECTED_HOUSEHOLD).await
    }

    pub async fn set_selected_household(&self, household_id: &str) -> DomainResult<()> {
        self.set(SELECTED_HOUSEHOLD, household_id).await
    }

    pub async fn biometric_enabled(&self) -> DomainResult<bool> {
        self.get_bool(BIOMETRIC_ENABLED).await
    }

    pub async fn set_biometric_enabled(&self, enabled: bool) -> DomainResult<()> {
        self.set_bool(BIOMETRIC_ENABLED, enabled).await
    }

    pub async fn theme(&self) -> DomainResult<Theme> {
        Ok(self
            .get(THEME)
            .await?
            .map(|t| Theme::from_str(&t))
            .unwrap_or_default())
    }

    pub async fn set_theme(&self, theme: Theme) -> DomainResult<()> {
        self.set(THEME, theme.as_str()).await
    }

    pub async fn language(&self) -> DomainResult<Language> {
        Ok(self
            .get(LANGUAGE)
            .await?
            .map(|l| Language::from_str(&l))
            .unwrap_or_default())
    }

    pub async fn set_language(&self, language: Language) -> DomainResult<()> {
        self.set(LANGUAGE, language.as_str()).await
    }

    /// Last sync timestamp in milliseconds, 0 if never synced
    pub async fn last_sync(&self) -> DomainResult<i64> {
        Ok(self
            .get(LAST_SYNC)
            .await?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0))
    }

    pub async fn set_last_sync(&self, timestamp_ms: i64) -> DomainResult<()> {
        self.set(LAST_SYNC, &timestamp_ms.to_string()).await
    }

    pub async fn clear_all(&self) -> DomainResult<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM settings", [])?;
        Ok(())
    }
}
