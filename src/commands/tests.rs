//! Client Command Tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use hms_backend::auth::{AuthProvider, CredentialProvider, MemoryAuthProvider};
use hms_backend::biometric::{BiometricKind, BiometricOutcome, BiometricPrompt};
use hms_backend::domain::{
    Collection, Document, DomainError, DomainResult, ListQuery, LoanContact, Scope,
};
use hms_backend::repository::{DocumentStore, MemoryStore};
use tokio::sync::Notify;

use super::{ClientError, InventoryClient};
use crate::config::{ClientConfig, QueryConfig};
use crate::models::{
    Item, ItemListOptions, ItemPatch, Language, LoanStatus, Location, NewHousehold, NewItem,
    NewLoan, NewLocation,
};
use crate::query::{EntityKind, QueryKey};
use crate::tree::flatten_tree;

/// Memory store with switchable update failures and a gate that holds
/// updates until released
#[derive(Default)]
struct FaultyStore {
    inner: MemoryStore,
    fail_updates: AtomicBool,
    hold_updates: AtomicBool,
    update_started: Notify,
    release_update: Notify,
    list_calls: AtomicUsize,
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn create(&self, scope: &Scope, id: &str, fields: Document) -> DomainResult<Document> {
        self.inner.create(scope, id, fields).await
    }

    async fn get(&self, scope: &Scope, id: &str) -> DomainResult<Option<Document>> {
        self.inner.get(scope, id).await
    }

    async fn list(&self, scope: &Scope, query: &ListQuery) -> DomainResult<Vec<Document>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.list(scope, query).await
    }

    async fn update(&self, scope: &Scope, id: &str, patch: Document) -> DomainResult<Document> {
        if self.hold_updates.load(Ordering::SeqCst) {
            self.update_started.notify_one();
            self.release_update.notified().await;
        }
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("PERMISSION_DENIED: write rejected".into()));
        }
        self.inner.update(scope, id, patch).await
    }

    async fn delete(&self, scope: &Scope, id: &str) -> DomainResult<()> {
        self.inner.delete(scope, id).await
    }
}

struct FakePrompt {
    outcome: BiometricOutcome,
}

#[async_trait]
impl BiometricPrompt for FakePrompt {
    async fn has_hardware(&self) -> bool {
        true
    }
    async fn is_enrolled(&self) -> bool {
        true
    }
    async fn supported_kinds(&self) -> Vec<BiometricKind> {
        vec![BiometricKind::Fingerprint]
    }
    async fn authenticate(&self, _prompt_message: &str) -> BiometricOutcome {
        self.outcome.clone()
    }
}

fn config() -> ClientConfig {
    ClientConfig {
        language: Language::EnUs,
        query: QueryConfig {
            retry: 0,
            ..Default::default()
        },
        ..Default::default()
    }
}

async fn client_over(store: Arc<FaultyStore>, auth: Arc<MemoryAuthProvider>) -> InventoryClient {
    InventoryClient::open(store, auth, &config()).await.unwrap()
}

/// Signed-up user with a selected household
async fn signed_in() -> (Arc<FaultyStore>, InventoryClient, String) {
    let store = Arc::new(FaultyStore::default());
    let client = client_over(store.clone(), Arc::new(MemoryAuthProvider::new())).await;
    client
        .sign_up("kari@example.no", "hemmelig1", "Kari")
        .await
        .unwrap();
    let household = client
        .create_household(NewHousehold::named("Hjemme"))
        .await
        .unwrap();
    (store, client, household.id)
}

fn detail(hid: &str, id: &str) -> QueryKey {
    QueryKey::detail(EntityKind::Items, hid, id)
}

fn cached_item(client: &InventoryClient, key: &QueryKey) -> Item {
    client.queries().cache().get_as::<Item>(key).unwrap().unwrap()
}

// ========================
// Session and households
// ========================

#[tokio::test]
async fn test_commands_require_session() {
    let store = Arc::new(FaultyStore::default());
    let client = client_over(store, Arc::new(MemoryAuthProvider::new())).await;

    let err = client.list_items(&ItemListOptions::default()).await.unwrap_err();
    assert!(matches!(err, ClientError::NotAuthenticated));
}

#[tokio::test]
async fn test_create_household_selects_it() {
    let (_, client, hid) = signed_in().await;

    let session = client.session();
    assert!(session.is_authenticated());
    assert_eq!(session.selected_household(), Some(hid.as_str()));
    assert_eq!(session.profile().unwrap().households, vec![hid.clone()]);
    assert_eq!(
        client.settings().selected_household().await.unwrap(),
        Some(hid.clone())
    );

    let households = client.list_households().await.unwrap();
    assert_eq!(households.len(), 1);
    assert_eq!(households[0].owner_id, session.user_id().unwrap());

    assert!(matches!(
        client.select_household("someone-else").await,
        Err(ClientError::NoHousehold)
    ));
}

#[tokio::test]
async fn test_sign_out_clears_session_and_cache() {
    let (_, client, _) = signed_in().await;
    client.create_item(NewItem::new("Drill", 1)).await.unwrap();
    client.active_items().await.unwrap();
    assert!(!client.queries().cache().is_empty());

    client.sign_out().await.unwrap();
    assert!(!client.session().is_authenticated());
    assert!(client.queries().cache().is_empty());

    let profile = client.sign_in("KARI@example.no", "hemmelig1").await.unwrap();
    assert_eq!(profile.display_name, "Kari");
    assert!(client.session().selected_household().is_some());
}

#[tokio::test]
async fn test_auth_failures_are_translated() {
    let (_, client, _) = signed_in().await;
    client.sign_out().await.unwrap();

    let err = client.sign_in("kari@example.no", "feilpassord").await.unwrap_err();
    assert_eq!(err.to_string(), "Wrong password");

    let err = client.sign_in("kari", "x").await.unwrap_err();
    match err {
        ClientError::Validation(fields) => {
            assert!(fields.get("email").is_some());
            assert!(fields.get("password").is_some());
        }
        other => panic!("expected validation error, got {:?}", other),
    }

    let err = client.reset_password("nobody@example.no").await.unwrap_err();
    assert_eq!(err.to_string(), "No user found with this email");
    assert!(client.reset_password("kari@example.no").await.is_ok());
}

#[tokio::test]
async fn test_credential_sign_in_creates_missing_profile() {
    let store = Arc::new(FaultyStore::default());
    let auth = Arc::new(MemoryAuthProvider::new());
    auth.register_credential(CredentialProvider::Google, "google-token", "per.hansen@gmail.com", None)
        .await;
    let client = client_over(store, auth).await;

    let profile = client
        .sign_in_with_credential(CredentialProvider::Google, "google-token")
        .await
        .unwrap();
    assert_eq!(profile.display_name, "per.hansen");
    assert!(client.session().is_authenticated());
    assert!(client.session().selected_household().is_none());

    client.sign_out().await.unwrap();
    let again = client
        .sign_in_with_credential(CredentialProvider::Google, "google-token")
        .await
        .unwrap();
    assert_eq!(again.uid, profile.uid);

    let err = client
        .sign_in_with_credential(CredentialProvider::Apple, "forged")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Something went wrong. Try again");
}

#[tokio::test]
async fn test_email_sign_in_creates_missing_profile() {
    let store = Arc::new(FaultyStore::default());
    let auth = Arc::new(MemoryAuthProvider::new());
    // Account exists at the provider but has no profile document
    auth.sign_up_with_email("ola@example.no", "hemmelig1", "Ola Nordmann")
        .await
        .unwrap();
    auth.sign_out().await.unwrap();
    let client = client_over(store, auth).await;

    let profile = client.sign_in("ola@example.no", "hemmelig1").await.unwrap();
    assert_eq!(profile.display_name, "Ola Nordmann");
    assert_eq!(profile.email, "ola@example.no");
    assert!(client.session().is_authenticated());
}

#[tokio::test]
async fn test_biometric_unlock_requires_preference() {
    let store = Arc::new(FaultyStore::default());
    let auth = Arc::new(MemoryAuthProvider::new());
    let client = client_over(store.clone(), auth.clone())
        .await
        .with_biometric(Arc::new(FakePrompt {
            outcome: BiometricOutcome::Success,
        }));
    client.sign_up("kari@example.no", "hemmelig1", "Kari").await.unwrap();

    assert!(matches!(
        client.biometric_unlock().await,
        Err(ClientError::BiometricDisabled)
    ));

    client.set_biometric_enabled(true).await.unwrap();
    let profile = client.biometric_unlock().await.unwrap();
    let current = auth.current_user().await.unwrap();
    assert_eq!(profile.uid, current.uid);
    assert!(client.session().is_authenticated());

    let no_prompt = client_over(store, auth).await;
    assert!(no_prompt.set_biometric_enabled(true).await.is_err());
}

#[tokio::test]
async fn test_cancelled_biometric_prompt_keeps_session_locked() {
    let store = Arc::new(FaultyStore::default());
    let auth = Arc::new(MemoryAuthProvider::new());
    let client = client_over(store, auth)
        .await
        .with_biometric(Arc::new(FakePrompt {
            outcome: BiometricOutcome::Cancelled,
        }));
    client.sign_up("kari@example.no", "hemmelig1", "Kari").await.unwrap();
    client.set_biometric_enabled(true).await.unwrap();
    client.sign_out().await.unwrap();

    let err = client.biometric_unlock().await.unwrap_err();
    assert_eq!(err.to_string(), "Authentication cancelled");
    assert!(!client.session().is_authenticated());
}

// ========================
// Items
// ========================

#[tokio::test]
async fn test_optimistic_quantity_visible_during_write() {
    let (store, client, hid) = signed_in().await;
    let item = client.create_item(NewItem::new("Drill", 3)).await.unwrap();
    let key = detail(&hid, &item.id);
    client.item(&item.id).await.unwrap();

    store.hold_updates.store(true, Ordering::SeqCst);
    let update = client.update_item(&item.id, ItemPatch::quantity(5));
    let observe = async {
        store.update_started.notified().await;
        let during = cached_item(&client, &key);
        store.release_update.notify_one();
        during
    };
    let (result, during) = tokio::join!(update, observe);

    assert_eq!(during.quantity, 5);
    assert_eq!(result.unwrap().quantity, 5);
    assert_eq!(client.item(&item.id).await.unwrap().quantity, 5);
}

#[tokio::test]
async fn test_failed_update_rolls_back_quantity() {
    let (store, client, hid) = signed_in().await;
    let item = client.create_item(NewItem::new("Drill", 3)).await.unwrap();
    let key = detail(&hid, &item.id);
    client.item(&item.id).await.unwrap();

    store.fail_updates.store(true, Ordering::SeqCst);
    let err = client
        .update_item(&item.id, ItemPatch::quantity(5))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Could not update item");
    assert!(!err.to_string().contains("PERMISSION_DENIED"));
    assert_eq!(cached_item(&client, &key).quantity, 3);
}

#[tokio::test]
async fn test_failed_update_rolls_back_price() {
    let (store, client, hid) = signed_in().await;
    let item = client
        .create_item(NewItem::new("Saw", 1).with_price(100.0))
        .await
        .unwrap();
    let key = detail(&hid, &item.id);
    client.item(&item.id).await.unwrap();

    store.fail_updates.store(true, Ordering::SeqCst);
    let err = client
        .update_item(&item.id, ItemPatch::price(150.0))
        .await
        .unwrap_err();

    assert!(!err.to_string().is_empty());
    assert_eq!(cached_item(&client, &key).purchase_price, Some(100.0));
    store.fail_updates.store(false, Ordering::SeqCst);
    assert_eq!(client.item(&item.id).await.unwrap().purchase_price, Some(100.0));
}

#[tokio::test]
async fn test_list_refreshes_after_create_and_archive() {
    let (_, client, _) = signed_in().await;
    let drill = client.create_item(NewItem::new("Drill", 1)).await.unwrap();
    assert_eq!(client.active_items().await.unwrap().len(), 1);

    client.create_item(NewItem::new("Hammer", 2)).await.unwrap();
    assert_eq!(client.active_items().await.unwrap().len(), 2);

    let archived = client.archive_item(&drill.id, true).await.unwrap();
    assert!(archived.is_archived);
    let names: Vec<String> = client
        .active_items()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names, vec!["Hammer"]);

    client.delete_item(&drill.id).await.unwrap();
    assert_eq!(client.item(&drill.id).await.unwrap_err().to_string(), "Item not found");
}

#[tokio::test]
async fn test_invalid_item_never_reaches_store() {
    let (store, client, hid) = signed_in().await;
    let err = client.create_item(NewItem::new("", 0)).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(ref f) if f.len() == 2));
    assert_eq!(
        store
            .inner
            .count(&Scope::household(hid.as_str(), Collection::Items))
            .await,
        0
    );
}

#[tokio::test]
async fn test_short_search_terms_do_not_query() {
    let (store, client, _) = signed_in().await;
    client.create_item(NewItem::new("Drill", 1)).await.unwrap();

    let before = store.list_calls.load(Ordering::SeqCst);
    assert!(client.search_items("dr").await.unwrap().is_empty());
    assert_eq!(store.list_calls.load(Ordering::SeqCst), before);

    let found = client.search_items("DRI").await.unwrap();
    assert_eq!(found.len(), 1);
    client.search_items("dri").await.unwrap();
    assert_eq!(store.list_calls.load(Ordering::SeqCst), before + 1);
}

#[tokio::test]
async fn test_dashboard_total_value() {
    let (_, client, _) = signed_in().await;
    let mut a = NewItem::new("Lamp", 1).with_price(100.0);
    a.min_stock = Some(1);
    let mut b = NewItem::new("Bulb", 5).with_price(50.0);
    b.min_stock = Some(1);
    client.create_item(a).await.unwrap();
    let bulb = client.create_item(b).await.unwrap();

    let stats = client.dashboard_stats().await.unwrap();
    assert_eq!(stats.item_count, 2);
    assert_eq!(stats.total_value, 350.0);
    assert_eq!(stats.low_stock_count, 0);

    client.update_item(&bulb.id, ItemPatch::quantity(0)).await.unwrap();
    let stats = client.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_value, 100.0);
    assert_eq!(stats.low_stock_count, 1);
}

// ========================
// Locations
// ========================

#[tokio::test]
async fn test_location_tree_and_guarded_delete() {
    let (_, client, _) = signed_in().await;
    let garage = client.create_location(NewLocation::root("Garage")).await.unwrap();
    let shelf = client
        .create_location(NewLocation::child("Shelf A", &garage.id))
        .await
        .unwrap();
    let bin = client
        .create_location(NewLocation::child("Bin 1", &shelf.id))
        .await
        .unwrap();
    assert_eq!(bin.path, vec![garage.id.clone(), shelf.id.clone(), bin.id.clone()]);

    let flat: Vec<(String, usize)> = flatten_tree(&client.location_tree().await.unwrap())
        .into_iter()
        .map(|(l, depth)| (l.name, depth))
        .collect();
    assert_eq!(
        flat,
        vec![
            ("Garage".to_string(), 0),
            ("Shelf A".to_string(), 1),
            ("Bin 1".to_string(), 2)
        ]
    );

    let err = client.delete_location(&garage.id).await.unwrap_err();
    assert_eq!(err.to_string(), "Cannot delete a location that has sub-locations");
    assert_eq!(client.list_locations().await.unwrap().len(), 3);

    client.delete_location(&bin.id).await.unwrap();
    assert_eq!(client.child_locations(Some(&shelf.id)).await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_move_location_recomputes_own_path() {
    let (_, client, _) = signed_in().await;
    let garage = client.create_location(NewLocation::root("Garage")).await.unwrap();
    let kitchen = client.create_location(NewLocation::root("Kitchen")).await.unwrap();
    let shelf = client
        .create_location(NewLocation::child("Shelf", &garage.id))
        .await
        .unwrap();
    client.location(&shelf.id).await.unwrap();

    let moved = client
        .move_location(&shelf.id, Some(kitchen.id.clone()))
        .await
        .unwrap();
    assert_eq!(moved.path, vec![kitchen.id.clone(), shelf.id.clone()]);
    assert_eq!(client.location(&shelf.id).await.unwrap().parent_id, Some(kitchen.id.clone()));

    let err = client
        .move_location(&kitchen.id, Some(shelf.id.clone()))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "A location cannot be moved inside itself");

    let roots = client.child_locations(None).await.unwrap();
    assert_eq!(roots.len(), 2);
}

#[tokio::test]
async fn test_move_location_keeps_cached_path_consistent_during_write() {
    let (store, client, hid) = signed_in().await;
    let garage = client.create_location(NewLocation::root("Garage")).await.unwrap();
    let kitchen = client.create_location(NewLocation::root("Kitchen")).await.unwrap();
    let shelf = client
        .create_location(NewLocation::child("Shelf", &garage.id))
        .await
        .unwrap();
    client.location(&kitchen.id).await.unwrap();
    client.location(&shelf.id).await.unwrap();
    let key = QueryKey::detail(EntityKind::Locations, &hid, &shelf.id);

    store.hold_updates.store(true, Ordering::SeqCst);
    let update = client.move_location(&shelf.id, Some(kitchen.id.clone()));
    let observe = async {
        store.update_started.notified().await;
        let during = client.queries().cache().get_as::<Location>(&key).unwrap().unwrap();
        store.release_update.notify_one();
        during
    };
    let (result, during) = tokio::join!(update, observe);

    assert_eq!(during.parent_id.as_deref(), Some(kitchen.id.as_str()));
    assert_eq!(during.path, vec![kitchen.id.clone(), shelf.id.clone()]);
    assert_eq!(result.unwrap().path, during.path);
}

// ========================
// Loans and demo data
// ========================

#[tokio::test]
async fn test_loan_lifecycle_updates_stats() {
    let (_, client, _) = signed_in().await;
    let drill = client.create_item(NewItem::new("Drill", 1)).await.unwrap();
    let loan = client
        .create_loan(NewLoan {
            item_id: drill.id.clone(),
            item_name: drill.name.clone(),
            quantity: 1,
            unit: "stk".into(),
            loaned_to: LoanContact {
                name: "Ola".into(),
                ..Default::default()
            },
            loan_date: 0,
            due_date: Some(1),
            notes: None,
        })
        .await
        .unwrap();

    assert_eq!(client.overdue_loans().await.unwrap().len(), 1);
    assert_eq!(client.dashboard_stats().await.unwrap().overdue_loans, 1);

    let returned = client.return_loan(&loan.id).await.unwrap();
    assert_eq!(returned.status, LoanStatus::Returned);
    assert!(client.overdue_loans().await.unwrap().is_empty());
    assert_eq!(client.dashboard_stats().await.unwrap().overdue_loans, 0);
    assert_eq!(
        client.list_loans(Some(LoanStatus::Returned)).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn test_seed_demo_data_refreshes_lists() {
    let (_, client, _) = signed_in().await;
    assert!(client.active_items().await.unwrap().is_empty());

    let written = client.seed_demo_data().await.unwrap();
    assert_eq!(written, 11);
    assert_eq!(client.active_items().await.unwrap().len(), 5);
    assert_eq!(client.list_categories().await.unwrap().len(), 2);
    assert_eq!(client.list_projects(None).await.unwrap().len(), 1);
    assert_eq!(client.seed_demo_data().await.unwrap(), 0);
}
