//! Multi-session eventual consistency over one shared store.

use std::sync::Arc;
use std::time::Duration;

use driftwood_cart::{CartStore, MemoryStore, SyncCoordinator};
use driftwood_core::{ItemId, ProductRef};
use driftwood_integration_tests::{fast_config, init_tracing};
use rust_decimal_macros::dec;

fn session(shared: &MemoryStore) -> CartStore {
    CartStore::new(Arc::new(shared.handle()), &fast_config())
}

async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_manual_reconcile_converges() {
    init_tracing();
    let shared = MemoryStore::new();
    let tab_a = session(&shared);
    let tab_b = session(&shared);

    tab_a.add_item(&ProductRef::new("Stoneware Mug", dec!(39)));
    tab_a.flush();

    assert_eq!(tab_b.count(), 0);
    assert!(tab_b.reconcile());
    assert_eq!(tab_b.count(), 1);
    assert_eq!(
        tab_b.items().first().expect("item").id,
        ItemId::derive("Stoneware Mug")
    );
}

#[tokio::test(start_paused = true)]
async fn test_storage_notice_converges_before_poll() {
    init_tracing();
    let shared = MemoryStore::new();
    let tab_a = session(&shared);
    let tab_b = session(&shared);
    // poll far in the future so only the notice can explain convergence
    let _sync_b = SyncCoordinator::spawn(tab_b.clone(), Duration::from_secs(3600));
    settle().await;

    tab_a.add_item(&ProductRef::new("Canvas Tote", dec!(24.50)));
    tab_a.flush();
    settle().await;

    assert_eq!(tab_b.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_promo_state_converges_too() {
    init_tracing();
    let shared = MemoryStore::new();
    let tab_a = session(&shared);
    let tab_b = session(&shared);
    let _sync_b = SyncCoordinator::spawn(tab_b.clone(), Duration::from_secs(3600));
    settle().await;

    tab_a.add_item(&ProductRef::new("Stoneware Mug", dec!(39)));
    tab_a.apply_promo("WELCOME10").expect("apply");
    tab_a.flush();
    settle().await;

    let promo = tab_b.active_promo().expect("promo");
    assert_eq!(promo.code, "WELCOME10");
    assert_eq!(promo.amount, dec!(3.9));
    assert_eq!(tab_b.total(), dec!(35.1));
}

#[tokio::test(start_paused = true)]
async fn test_last_writer_wins_across_tabs() {
    init_tracing();
    let shared = MemoryStore::new();
    let tab_a = session(&shared);
    let tab_b = session(&shared);

    // both tabs mutate concurrently; whichever save lands last wins whole
    tab_a.add_item(&ProductRef::new("Stoneware Mug", dec!(39)));
    tab_b.add_item(&ProductRef::new("Canvas Tote", dec!(24.50)));
    tab_a.flush();
    tab_b.flush();

    tab_a.reconcile();
    tab_b.reconcile();

    // no per-item merge: both converge to tab B's snapshot
    assert_eq!(tab_a.items(), tab_b.items());
    assert_eq!(
        tab_a.items().first().expect("item").id,
        ItemId::derive("Canvas Tote")
    );
}

#[tokio::test(start_paused = true)]
async fn test_both_tabs_under_coordinators_converge() {
    init_tracing();
    let shared = MemoryStore::new();
    let tab_a = session(&shared);
    let tab_b = session(&shared);
    let _sync_a = SyncCoordinator::spawn(tab_a.clone(), Duration::from_millis(500));
    let _sync_b = SyncCoordinator::spawn(tab_b.clone(), Duration::from_millis(500));
    settle().await;

    tab_a.add_item(&ProductRef::new("Stoneware Mug", dec!(39)));
    tab_a.flush();
    settle().await;
    tab_b.add_item(&ProductRef::new("Stoneware Mug", dec!(39)));
    tab_b.flush();
    settle().await;

    tokio::time::advance(Duration::from_millis(600)).await;
    settle().await;

    assert_eq!(tab_a.count(), 2);
    assert_eq!(tab_b.count(), 2);
    assert_eq!(tab_a.items(), tab_b.items());
}

#[tokio::test(start_paused = true)]
async fn test_ready_signal_waits_for_first_load() {
    init_tracing();
    let shared = MemoryStore::new();
    let seeder = session(&shared);
    seeder.add_item(&ProductRef::new("Stoneware Mug", dec!(39)));
    seeder.flush();
    drop(seeder);

    let tab = session(&shared);
    let sync = SyncCoordinator::spawn(tab.clone(), Duration::from_secs(5));
    let mut ready = sync.ready();
    ready.changed().await.expect("ready");
    assert!(*ready.borrow());
    assert_eq!(tab.count(), 1);
}
