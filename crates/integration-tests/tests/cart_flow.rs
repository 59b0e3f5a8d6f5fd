//! Integration tests for the cart store against a live catalog API.
//!
//! The catalog is served by [`FakeCatalog`] over HTTP and the cart is persisted
//! in a temporary data directory, so these tests cover the same code paths the
//! binary uses.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use rocketshoes_core::{
    CartError, CartStorage, CatalogError, MSG_ADD_FAILED, MSG_OUT_OF_STOCK, MSG_REMOVE_FAILED,
    MSG_UPDATE_FAILED, ProductId,
};
use rocketshoes_integration_tests::{FakeCatalog, Fault};
use rocketshoes_storefront::catalog::ApiClient;
use rocketshoes_storefront::config::CatalogConfig;
use rocketshoes_storefront::services::{CartSettings, CartStore, RecordingNotifier, StockPolicy};
use rocketshoes_storefront::storage::FileStorage;
use serde_json::{Value, json};
use tempfile::TempDir;

const KEY: &str = "@RocketShoes:cart";

struct Session {
    store: CartStore,
    storage: FileStorage,
    notifier: Arc<RecordingNotifier>,
}

fn open(catalog: &FakeCatalog, dir: &TempDir, settings: CartSettings) -> Session {
    let client = ApiClient::new(&CatalogConfig::new(catalog.base_url())).unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    let notifier = Arc::new(RecordingNotifier::new());
    let store = CartStore::load(
        settings,
        Arc::new(client),
        Arc::new(storage.clone()),
        notifier.clone(),
    )
    .unwrap();

    Session {
        store,
        storage,
        notifier,
    }
}

fn session(catalog: &FakeCatalog, dir: &TempDir) -> Session {
    open(catalog, dir, CartSettings::default())
}

fn stored(storage: &FileStorage) -> Value {
    serde_json::from_str(&storage.get(KEY).unwrap().unwrap()).unwrap()
}

fn id(n: i32) -> ProductId {
    ProductId::new(n)
}

// =============================================================================
// Add
// =============================================================================

#[tokio::test]
async fn test_add_new_product_copies_catalog_attributes() {
    let catalog = FakeCatalog::start().await;
    catalog.add_sneaker(1, "Tênis de Caminhada Leve Confortável", 179.9, 3);
    let dir = tempfile::tempdir().unwrap();
    let s = session(&catalog, &dir);

    let cart = s.store.add_product(id(1)).await.unwrap();

    assert_eq!(cart.len(), 1);
    let stored = stored(&s.storage);
    assert_eq!(
        stored,
        json!([{
            "id": 1,
            "amount": 1,
            "title": "Tênis de Caminhada Leve Confortável",
            "price": 179.9,
            "image": "https://cdn.rocketshoes.example/sneakers/1.jpg",
        }])
    );
    assert!(s.notifier.notifications().is_empty());
}

#[tokio::test]
async fn test_add_until_stock_runs_out() {
    let catalog = FakeCatalog::start().await;
    catalog.add_sneaker(1, "Tênis VR Caminhada", 139.9, 2);
    let dir = tempfile::tempdir().unwrap();
    let s = session(&catalog, &dir);

    s.store.add_product(id(1)).await.unwrap();
    let cart = s.store.add_product(id(1)).await.unwrap();
    assert_eq!(cart.get(id(1)).unwrap().amount, 2);

    let err = s.store.add_product(id(1)).await.unwrap_err();
    assert!(matches!(
        err,
        CartError::OutOfStock {
            requested: 3,
            available: 2,
            ..
        }
    ));
    assert_eq!(s.notifier.messages(), vec![MSG_OUT_OF_STOCK]);
    assert_eq!(stored(&s.storage)[0]["amount"], 2);
}

#[tokio::test]
async fn test_add_new_product_with_no_stock_succeeds_by_default() {
    let catalog = FakeCatalog::start().await;
    catalog.add_sneaker(5, "Tênis Esgotado", 99.9, 0);
    let dir = tempfile::tempdir().unwrap();
    let s = session(&catalog, &dir);

    let cart = s.store.add_product(id(5)).await.unwrap();
    assert_eq!(cart.get(id(5)).unwrap().amount, 1);
}

#[tokio::test]
async fn test_add_new_product_with_no_stock_fails_when_strict() {
    let catalog = FakeCatalog::start().await;
    catalog.add_sneaker(5, "Tênis Esgotado", 99.9, 0);
    let dir = tempfile::tempdir().unwrap();
    let settings = CartSettings {
        stock_policy: StockPolicy::Strict,
        ..CartSettings::default()
    };
    let s = open(&catalog, &dir, settings);

    let err = s.store.add_product(id(5)).await.unwrap_err();
    assert!(matches!(err, CartError::OutOfStock { available: 0, .. }));
    assert!(s.store.cart().is_empty());
    assert_eq!(s.notifier.messages(), vec![MSG_OUT_OF_STOCK]);
}

#[tokio::test]
async fn test_oversold_product_is_out_of_stock() {
    let catalog = FakeCatalog::start().await;
    catalog.add_sneaker(1, "Tênis VR Caminhada", 139.9, 2);
    let dir = tempfile::tempdir().unwrap();
    let s = session(&catalog, &dir);
    s.store.add_product(id(1)).await.unwrap();

    catalog.set_stock(1, -1);
    let err = s.store.add_product(id(1)).await.unwrap_err();
    assert!(matches!(err, CartError::OutOfStock { available: -1, .. }));
    assert!(s.store.update_product_amount(id(1), 1).await.is_err());

    assert_eq!(s.notifier.messages(), vec![MSG_OUT_OF_STOCK, MSG_OUT_OF_STOCK]);
    assert_eq!(stored(&s.storage)[0]["amount"], 1);
}

#[tokio::test]
async fn test_add_unknown_product() {
    let catalog = FakeCatalog::start().await;
    let dir = tempfile::tempdir().unwrap();
    let s = session(&catalog, &dir);

    let err = s.store.add_product(id(404)).await.unwrap_err();
    assert!(matches!(err, CartError::Lookup(CatalogError::NotFound(_))));
    assert_eq!(s.notifier.messages(), vec![MSG_ADD_FAILED]);
    assert_eq!(s.storage.get(KEY).unwrap(), None);
}

#[tokio::test]
async fn test_add_when_catalog_fails() {
    let catalog = FakeCatalog::start().await;
    catalog.add_sneaker(1, "Tênis VR Caminhada", 139.9, 5);
    catalog.break_product(1, Fault::Status(500));
    let dir = tempfile::tempdir().unwrap();
    let s = session(&catalog, &dir);

    let err = s.store.add_product(id(1)).await.unwrap_err();
    assert!(matches!(
        err,
        CartError::Lookup(CatalogError::Api { status: 500, .. })
    ));
    assert_eq!(s.notifier.messages(), vec![MSG_ADD_FAILED]);
}

#[tokio::test]
async fn test_add_when_catalog_answers_garbage() {
    let catalog = FakeCatalog::start().await;
    catalog.break_product(1, Fault::Garbage);
    let dir = tempfile::tempdir().unwrap();
    let s = session(&catalog, &dir);

    let err = s.store.add_product(id(1)).await.unwrap_err();
    assert!(matches!(err, CartError::Lookup(CatalogError::Parse(_))));
    assert_eq!(s.notifier.messages(), vec![MSG_ADD_FAILED]);
}

#[tokio::test]
async fn test_add_rejects_product_with_mismatched_id() {
    let catalog = FakeCatalog::start().await;
    catalog.add_sneaker(1, "Tênis VR Caminhada", 139.9, 5);
    catalog.set_product(1, json!({"id": 2, "title": "Outro Tênis"}));
    let dir = tempfile::tempdir().unwrap();
    let s = session(&catalog, &dir);

    let err = s.store.add_product(id(1)).await.unwrap_err();
    assert!(matches!(err, CartError::Lookup(CatalogError::Parse(_))));
    assert!(s.store.cart().is_empty());
}

// =============================================================================
// Remove
// =============================================================================

#[tokio::test]
async fn test_remove_keeps_other_items_in_order() {
    let catalog = FakeCatalog::start().await;
    for n in 1..=3 {
        catalog.add_sneaker(n, &format!("Tênis {n}"), 100.0, 5);
    }
    let dir = tempfile::tempdir().unwrap();
    let s = session(&catalog, &dir);
    for n in 1..=3 {
        s.store.add_product(id(n)).await.unwrap();
    }

    let cart = s.store.remove_product(id(2)).unwrap();

    let ids: Vec<_> = cart.iter().map(|item| item.id).collect();
    assert_eq!(ids, vec![id(1), id(3)]);
    let stored = stored(&s.storage);
    assert_eq!(stored[0]["id"], 1);
    assert_eq!(stored[1]["id"], 3);
}

#[tokio::test]
async fn test_remove_missing_product() {
    let catalog = FakeCatalog::start().await;
    let dir = tempfile::tempdir().unwrap();
    let s = session(&catalog, &dir);

    let err = s.store.remove_product(id(9)).unwrap_err();
    assert!(matches!(err, CartError::NotInCart(_)));
    assert_eq!(s.notifier.messages(), vec![MSG_REMOVE_FAILED]);
}

// =============================================================================
// Update amount
// =============================================================================

#[tokio::test]
async fn test_update_amount_within_stock() {
    let catalog = FakeCatalog::start().await;
    catalog.add_sneaker(1, "Tênis VR Caminhada", 139.9, 4);
    let dir = tempfile::tempdir().unwrap();
    let s = session(&catalog, &dir);
    s.store.add_product(id(1)).await.unwrap();

    let cart = s.store.update_product_amount(id(1), 4).await.unwrap();
    assert_eq!(cart.get(id(1)).unwrap().amount, 4);
    assert_eq!(stored(&s.storage)[0]["amount"], 4);

    let err = s.store.update_product_amount(id(1), 5).await.unwrap_err();
    assert!(matches!(err, CartError::OutOfStock { requested: 5, .. }));
    assert_eq!(s.notifier.messages(), vec![MSG_OUT_OF_STOCK]);
    assert_eq!(s.store.cart().get(id(1)).unwrap().amount, 4);
}

#[tokio::test]
async fn test_update_amount_below_one_never_reaches_catalog() {
    let catalog = FakeCatalog::start().await;
    catalog.add_sneaker(1, "Tênis VR Caminhada", 139.9, 4);
    let dir = tempfile::tempdir().unwrap();
    let s = session(&catalog, &dir);
    s.store.add_product(id(1)).await.unwrap();

    // A broken catalog would turn any lookup into a lookup error.
    catalog.break_product(1, Fault::Status(503));
    let err = s.store.update_product_amount(id(1), 0).await.unwrap_err();
    assert!(matches!(err, CartError::InvalidAmount(0)));
    assert_eq!(s.notifier.messages(), vec![MSG_UPDATE_FAILED]);
}

#[tokio::test]
async fn test_update_amount_follows_fresh_stock() {
    let catalog = FakeCatalog::start().await;
    catalog.add_sneaker(1, "Tênis VR Caminhada", 139.9, 1);
    let dir = tempfile::tempdir().unwrap();
    let s = session(&catalog, &dir);
    s.store.add_product(id(1)).await.unwrap();

    assert!(s.store.update_product_amount(id(1), 3).await.is_err());

    catalog.set_stock(1, 3);
    let cart = s.store.update_product_amount(id(1), 3).await.unwrap();
    assert_eq!(cart.get(id(1)).unwrap().amount, 3);
}

#[tokio::test]
async fn test_update_amount_for_product_not_in_cart() {
    let catalog = FakeCatalog::start().await;
    catalog.add_sneaker(1, "Tênis VR Caminhada", 139.9, 5);
    catalog.add_sneaker(2, "Tênis Casual", 99.9, 5);
    let dir = tempfile::tempdir().unwrap();
    let s = session(&catalog, &dir);
    s.store.add_product(id(1)).await.unwrap();

    let cart = s.store.update_product_amount(id(2), 2).await.unwrap();
    assert_eq!(cart.len(), 1);
    assert!(!cart.contains(id(2)));
    assert!(s.notifier.notifications().is_empty());
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_cart_survives_restart() {
    let catalog = FakeCatalog::start().await;
    catalog.add_sneaker(1, "Tênis VR Caminhada", 139.9, 5);
    catalog.add_sneaker(2, "Tênis Casual", 99.9, 5);
    let dir = tempfile::tempdir().unwrap();

    let before = {
        let s = session(&catalog, &dir);
        s.store.add_product(id(1)).await.unwrap();
        s.store.add_product(id(2)).await.unwrap();
        s.store.update_product_amount(id(2), 3).await.unwrap()
    };

    let s = session(&catalog, &dir);
    assert_eq!(s.store.cart(), before);
    assert_eq!(s.store.cart().total_units(), 4);
}

#[tokio::test]
async fn test_restart_with_malformed_file_starts_empty() {
    let catalog = FakeCatalog::start().await;
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::open(dir.path()).unwrap();
    std::fs::write(storage.path_for(KEY), "{not json").unwrap();

    let s = session(&catalog, &dir);

    assert!(s.store.cart().is_empty());
    assert_eq!(s.storage.get(KEY).unwrap().as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_separate_storage_keys_hold_separate_carts() {
    let catalog = FakeCatalog::start().await;
    catalog.add_sneaker(1, "Tênis VR Caminhada", 139.9, 5);
    let dir = tempfile::tempdir().unwrap();

    let first = session(&catalog, &dir);
    first.store.add_product(id(1)).await.unwrap();

    let other = open(
        &catalog,
        &dir,
        CartSettings {
            storage_key: "@RocketShoes:cart:guest".to_string(),
            ..CartSettings::default()
        },
    );
    assert!(other.store.cart().is_empty());
}
