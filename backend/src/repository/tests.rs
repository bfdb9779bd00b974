//! Repository Integration Tests
//!
//! Runs the same document-store checks against the in-memory store and
//! an in-memory SQLite database.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;

use crate::domain::{
    Collection, Direction, Document, DomainError, Item, ItemPatch, ListQuery, Scope, Theme,
};
use crate::repository::{
    init_db, DocumentStore, MemoryStore, Repository, SettingsRepository, SqliteStore,
};

async fn setup_sqlite() -> Arc<dyn DocumentStore> {
    let db_path = PathBuf::from(":memory:");
    let db_state = init_db(&db_path).await.expect("Failed to init test DB");
    Arc::new(SqliteStore::new(db_state.connection()))
}

async fn all_stores() -> Vec<(&'static str, Arc<dyn DocumentStore>)> {
    vec![
        ("memory", Arc::new(MemoryStore::new()) as Arc<dyn DocumentStore>),
        ("sqlite", setup_sqlite().await),
    ]
}

fn doc(v: serde_json::Value) -> Document {
    v.as_object().cloned().unwrap()
}

fn items_scope() -> Scope {
    Scope::household("h1", Collection::Items)
}

fn sample_item(id: &str, name: &str, price: f64) -> Item {
    Item {
        id: id.into(),
        household_id: "h1".into(),
        name: name.into(),
        description: None,
        category_id: None,
        location_id: None,
        brand: None,
        model: None,
        serial_number: None,
        barcode: None,
        purchase_price: Some(price),
        purchase_date: None,
        quantity: 1,
        unit: "stk".into(),
        min_stock: None,
        tags: vec![],
        notes: None,
        created_by: "u1".into(),
        is_archived: false,
        created_at: 0,
        updated_at: 0,
    }
}

#[tokio::test]
async fn test_create_stamps_timestamps() {
    for (name, store) in all_stores().await {
        let created = store
            .create(&items_scope(), "a", doc(json!({"id": "a", "name": "Drill"})))
            .await
            .unwrap_or_else(|e| panic!("{name}: {e}"));

        assert!(created["created_at"].as_i64().unwrap() > 0, "{name}");
        assert_eq!(created["created_at"], created["updated_at"], "{name}");
    }
}

#[tokio::test]
async fn test_create_duplicate_is_conflict() {
    for (name, store) in all_stores().await {
        store.create(&items_scope(), "a", doc(json!({"id": "a"}))).await.unwrap();
        let err = store
            .create(&items_scope(), "a", doc(json!({"id": "a"})))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)), "{name}");
    }
}

#[tokio::test]
async fn test_update_merges_fields() {
    for (name, store) in all_stores().await {
        store
            .create(&items_scope(), "a", doc(json!({"id": "a", "name": "Drill", "quantity": 3})))
            .await
            .unwrap();

        let updated = store
            .update(&items_scope(), "a", doc(json!({"quantity": 5})))
            .await
            .unwrap();
        assert_eq!(updated["quantity"], 5, "{name}");
        assert_eq!(updated["name"], "Drill", "{name}");

        let found = store.get(&items_scope(), "a").await.unwrap().unwrap();
        assert_eq!(found["quantity"], 5, "{name}");
    }
}

#[tokio::test]
async fn test_update_missing_is_not_found() {
    for (name, store) in all_stores().await {
        let err = store
            .update(&items_scope(), "missing", doc(json!({"quantity": 1})))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)), "{name}");
    }
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    for (name, store) in all_stores().await {
        store.create(&items_scope(), "a", doc(json!({"id": "a"}))).await.unwrap();
        store.delete(&items_scope(), "a").await.unwrap();
        store.delete(&items_scope(), "a").await.unwrap();
        assert!(store.get(&items_scope(), "a").await.unwrap().is_none(), "{name}");
    }
}

#[tokio::test]
async fn test_list_is_scoped_filtered_and_ordered() {
    for (name, store) in all_stores().await {
        let other = Scope::household("h2", Collection::Items);
        store
            .create(&items_scope(), "a", doc(json!({"name": "b", "archived": false})))
            .await
            .unwrap();
        store
            .create(&items_scope(), "b", doc(json!({"name": "a", "archived": false})))
            .await
            .unwrap();
        store
            .create(&items_scope(), "c", doc(json!({"name": "c", "archived": true})))
            .await
            .unwrap();
        store.create(&other, "d", doc(json!({"name": "z"}))).await.unwrap();

        let query = ListQuery::new()
            .filter("archived", false)
            .order_by("name", Direction::Asc);
        let names: Vec<String> = store
            .list(&items_scope(), &query)
            .await
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a", "b"], "{name}");
    }
}

#[tokio::test]
async fn test_typed_repository_roundtrip() {
    for (name, store) in all_stores().await {
        let repo: Repository<Item> = Repository::in_household(store, "h1");

        repo.create(&sample_item("i1", "TV", 5999.0)).await.unwrap();
        repo.create(&sample_item("i2", "Drill", 1299.0)).await.unwrap();

        let updated = repo.update("i1", &ItemPatch::quantity(2)).await.unwrap();
        assert_eq!(updated.quantity, 2, "{name}");
        assert_eq!(updated.name, "TV", "{name}");

        let by_price = repo
            .list(&ListQuery::new().order_by("purchase_price", Direction::Desc))
            .await
            .unwrap();
        assert_eq!(by_price[0].id, "i1", "{name}");
        assert_eq!(by_price.len(), 2, "{name}");

        repo.delete("i2").await.unwrap();
        assert!(repo.find_by_id("i2").await.unwrap().is_none(), "{name}");
    }
}

#[tokio::test]
async fn test_sqlite_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hms.db");

    {
        let db = init_db(&path).await.unwrap();
        let store = SqliteStore::new(db.connection());
        store.create(&items_scope(), "a", doc(json!({"name": "TV"}))).await.unwrap();
    }

    let db = init_db(&path).await.unwrap();
    let store = SqliteStore::new(db.connection());
    let found = store.get(&items_scope(), "a").await.unwrap().unwrap();
    assert_eq!(found["name"], "TV");
}

#[tokio::test]
async fn test_documents_table_stores_json_bodies_only() {
    let db = init_db(&PathBuf::from(":memory:")).await.unwrap();
    let conn = db.connection();
    let conn = conn.lock().await;
    let mut stmt = conn.prepare("PRAGMA table_info(documents)").unwrap();
    let columns: Vec<String> = stmt
        .query_map([], |row| row.get(1))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(columns, vec!["scope", "id", "body"]);
}

#[tokio::test]
async fn test_settings_defaults_and_updates() {
    let db = init_db(&PathBuf::from(":memory:")).await.unwrap();
    let settings = SettingsRepository::new(db.connection());

    assert!(!settings.onboarding_completed().await.unwrap());
    assert!(!settings.biometric_enabled().await.unwrap());
    assert_eq!(settings.theme().await.unwrap(), Theme::Auto);
    assert_eq!(settings.language().await.unwrap().as_str(), "nb-NO");
    assert_eq!(settings.last_sync().await.unwrap(), 0);
    assert!(settings.selected_household().await.unwrap().is_none());

    settings.set_selected_household("h1").await.unwrap();
    settings.set_onboarding_completed(true).await.unwrap();
    settings.set_theme(Theme::Dark).await.unwrap();
    settings.set_last_sync(42).await.unwrap();

    assert_eq!(settings.selected_household().await.unwrap().as_deref(), Some("h1"));
    assert!(settings.onboarding_completed().await.unwrap());
    assert_eq!(settings.theme().await.unwrap(), Theme::Dark);
    assert_eq!(settings.last_sync().await.unwrap(), 42);

    settings.clear_all().await.unwrap();
    assert!(settings.selected_household().await.unwrap().is_none());
}
