use std::sync::Arc;

use eventdex_core::{Gender, Record};
use eventdex_engine::{InventoryStore, MemoryStore};

fn records(ids: &[u64]) -> Vec<Record> {
    ids.iter()
        .map(|id| Record::new(*id, "Eevee", Gender::Female).with_level(*id as u32))
        .collect()
}

#[tokio::test]
async fn bulk_add_is_idempotent() {
    let store = MemoryStore::new();
    let batch = records(&[1, 2, 3]);

    let first = store.bulk_add(9, &batch).await.unwrap();
    let count_after_first = store.count_for_user(9).await.unwrap();
    let second = store.bulk_add(9, &batch).await.unwrap();

    assert_eq!(first, 3);
    assert_eq!(second, 0);
    assert_eq!(store.count_for_user(9).await.unwrap(), count_after_first);
}

#[tokio::test]
async fn identifiers_are_scoped_per_user() {
    let store = MemoryStore::new();
    store.bulk_add(1, &records(&[5, 6])).await.unwrap();
    assert_eq!(store.bulk_add(2, &records(&[5])).await.unwrap(), 1);

    assert_eq!(store.count_for_user(1).await.unwrap(), 2);
    assert_eq!(store.count_for_user(2).await.unwrap(), 1);
    assert_eq!(store.count_for_user(3).await.unwrap(), 0);
}

#[tokio::test]
async fn re_adding_keeps_last_write() {
    let store = MemoryStore::new();
    store
        .bulk_add(1, &[Record::new(5, "Eevee", Gender::Female)])
        .await
        .unwrap();
    let inserted = store
        .bulk_add(1, &[Record::new(5, "Eevee", Gender::Female).with_level(40)])
        .await
        .unwrap();

    assert_eq!(inserted, 0);
    let listed = store.list_all(1).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].level(), 40);
}

#[tokio::test]
async fn remove_clear_and_list() {
    let store = MemoryStore::new();
    store.bulk_add(1, &records(&[3, 1, 2, 4])).await.unwrap();

    assert_eq!(store.remove_by_ids(1, &[2, 2, 99]).await.unwrap(), 1);
    let ids: Vec<u64> = store
        .list_all(1)
        .await
        .unwrap()
        .iter()
        .map(Record::identifier)
        .collect();
    assert_eq!(ids, vec![1, 3, 4]);

    assert_eq!(store.clear_all(1).await.unwrap(), 3);
    assert_eq!(store.clear_all(1).await.unwrap(), 0);
    assert!(store.list_all(1).await.unwrap().is_empty());
    assert_eq!(store.remove_by_ids(42, &[1]).await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_overlapping_adds_never_duplicate() {
    let store = Arc::new(MemoryStore::new());
    let mut handles = Vec::new();
    for offset in 0..8u64 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let ids: Vec<u64> = (offset..offset + 20).collect();
            store.bulk_add(7, &records(&ids)).await.unwrap()
        }));
    }

    let mut inserted_total = 0;
    for handle in handles {
        inserted_total += handle.await.unwrap();
    }

    // ids 0..27 in total
    assert_eq!(inserted_total, 27);
    assert_eq!(store.count_for_user(7).await.unwrap(), 27);
}
