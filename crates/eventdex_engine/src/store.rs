use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use eventdex_core::{Identifier, Record, UserId};
use tokio::sync::Mutex;

use crate::StoreError;

/// Persistence gateway for tracked records. The natural key is `(user, identifier)`.
///
/// Implementations must be safe to call concurrently for the same user.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Upserts `records`; returns how many identifiers were not stored before.
    /// Re-adding a stored identifier replaces its fields and counts 0.
    async fn bulk_add(&self, user_id: UserId, records: &[Record]) -> Result<usize, StoreError>;

    async fn count_for_user(&self, user_id: UserId) -> Result<usize, StoreError>;

    async fn remove_by_ids(
        &self,
        user_id: UserId,
        ids: &[Identifier],
    ) -> Result<usize, StoreError>;

    async fn clear_all(&self, user_id: UserId) -> Result<usize, StoreError>;

    /// All records of a user, ordered by identifier.
    async fn list_all(&self, user_id: UserId) -> Result<Vec<Record>, StoreError>;
}

pub type Inventory = HashMap<UserId, BTreeMap<Identifier, Record>>;

/// Upsert into one user's rows, returning the number of new identifiers.
pub fn upsert_records(rows: &mut BTreeMap<Identifier, Record>, records: &[Record]) -> usize {
    let mut inserted = 0;
    for record in records {
        if rows.insert(record.identifier(), record.clone()).is_none() {
            inserted += 1;
        }
    }
    inserted
}

/// In-memory gateway. One lock guards the whole map, so concurrent bulk adds
/// for the same user serialize and never duplicate a row.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inventory: Mutex<Inventory>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn bulk_add(&self, user_id: UserId, records: &[Record]) -> Result<usize, StoreError> {
        let mut inventory = self.inventory.lock().await;
        let rows = inventory.entry(user_id).or_default();
        Ok(upsert_records(rows, records))
    }

    async fn count_for_user(&self, user_id: UserId) -> Result<usize, StoreError> {
        let inventory = self.inventory.lock().await;
        Ok(inventory.get(&user_id).map_or(0, BTreeMap::len))
    }

    async fn remove_by_ids(
        &self,
        user_id: UserId,
        ids: &[Identifier],
    ) -> Result<usize, StoreError> {
        let mut inventory = self.inventory.lock().await;
        let Some(rows) = inventory.get_mut(&user_id) else {
            return Ok(0);
        };
        Ok(ids.iter().filter(|id| rows.remove(id).is_some()).count())
    }

    async fn clear_all(&self, user_id: UserId) -> Result<usize, StoreError> {
        let mut inventory = self.inventory.lock().await;
        Ok(inventory.remove(&user_id).map_or(0, |rows| rows.len()))
    }

    async fn list_all(&self, user_id: UserId) -> Result<Vec<Record>, StoreError> {
        let inventory = self.inventory.lock().await;
        Ok(inventory
            .get(&user_id)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }
}
