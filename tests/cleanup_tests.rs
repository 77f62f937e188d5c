//! Leaf collection tests.

mod common;

use std::sync::Arc;

use common::TestBook;
use folio_rs::{BookEvent, Config, ImageEntity, TurnDirection};

const LONG_BOOK: &[&str] = &[
    "p01", "p02", "p03", "p04", "p05", "p06", "p07", "p08", "p09", "p10", "p11", "p12",
];

#[tokio::test]
async fn test_evicted_leaves_leave_the_scene() {
    let mut t = TestBook::open(LONG_BOOK, Config::default()).await;
    let first = t.book.store().get(0).unwrap();
    assert!(t.scene.is_attached(first.id()));

    t.book.turn(TurnDirection::Forward).await;
    t.settle().await;

    assert!(t.book.store().get(0).is_none());
    assert!(!t.scene.is_attached(first.id()));
    assert_eq!(t.attached_ids(), t.stored_ids());
}

#[tokio::test]
async fn test_paging_through_keeps_store_bounded() {
    let mut t = TestBook::open(LONG_BOOK, Config::default()).await;
    let last = t.book.pair_count() - 1;

    while t.book.cursor() < last {
        assert!(t.book.turn(TurnDirection::Forward).await.is_turned());
        // One turning leaf, the new spread and the leaf behind it at most.
        assert!(t.book.store().len() <= 3);
        t.settle().await;
        assert_eq!(t.book.store().len(), 2);
        assert_eq!(t.scene.len(), 2);
    }

    while t.book.cursor() > 1 {
        assert!(t.book.turn(TurnDirection::Backward).await.is_turned());
        t.settle().await;
        assert_eq!(t.book.store().len(), 2);
    }
    assert_eq!(t.indices(), vec![0, 1]);
}

#[tokio::test]
async fn test_turning_leaf_survives_collection() {
    let mut t = TestBook::open(LONG_BOOK, Config::default()).await;

    t.book.turn(TurnDirection::Forward).await;
    t.book.turn(TurnDirection::Forward).await;
    t.book.turn(TurnDirection::Forward).await;
    assert_eq!(t.book.cursor(), 4);

    // The last leaf has the shortest way to go and lands alone.
    let mut landed = Vec::new();
    while landed.is_empty() {
        landed = t.frame().await;
    }
    tokio::task::yield_now().await;

    let store = t.book.store();
    assert!(store.get(0).is_none());
    for index in 1..=4 {
        let leaf = store.get(index);
        assert!(leaf.is_some(), "leaf {} collected too early", index);
    }
    assert!(store.get(2).unwrap().is_animating());

    t.settle().await;
    assert_eq!(t.indices(), vec![3, 4]);
}

#[tokio::test]
async fn test_collection_reports_evictions() {
    let mut t = TestBook::open(LONG_BOOK, Config::default()).await;
    let mut events = t.book.subscribe();

    t.book.turn(TurnDirection::Forward).await;
    t.settle().await;

    let mut evicted = Vec::new();
    let mut cleanups = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            BookEvent::LeafEvicted { leaf } => evicted.push(leaf),
            BookEvent::CleanupFinished { cursor } => {
                assert_eq!(cursor, 2);
                cleanups += 1;
            }
            _ => {}
        }
    }
    assert_eq!(evicted, vec![0]);
    assert!(cleanups >= 1);
}

#[tokio::test]
async fn test_dropped_leaf_is_released() {
    let mut t = TestBook::open(LONG_BOOK, Config::default()).await;
    let first = Arc::downgrade(&t.book.store().get(0).unwrap());

    t.book.turn(TurnDirection::Forward).await;
    t.settle().await;

    assert!(first.upgrade().is_none());
    assert_eq!(t.scene.live_leaves().len(), 2);
}

#[tokio::test]
async fn test_load_initial_reopens_first_spread() {
    let mut t = TestBook::open(LONG_BOOK, Config::default()).await;
    for _ in 0..3 {
        t.book.turn(TurnDirection::Forward).await;
        t.settle().await;
    }
    assert_eq!(t.indices(), vec![3, 4]);

    t.book.load_initial().await.unwrap();
    t.book.update(0.0);

    assert_eq!(t.book.cursor(), 1);
    assert_eq!(t.indices(), vec![0, 1]);
    assert_eq!(t.attached_ids(), t.stored_ids());
}
