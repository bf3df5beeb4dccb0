use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use eventdex_core::{Gender, Identifier, Record, UserId};
use eventdex_engine::{
    read_snapshot, upsert_records, AtomicSnapshotWriter, Inventory, InventoryStore, StoreError,
};
use eventdex_logging::{dex_debug, dex_info};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedRecord {
    id: Identifier,
    name: String,
    gender: String,
    level: u32,
    iv_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PersistedInventory {
    updated_utc: Option<String>,
    users: BTreeMap<UserId, Vec<PersistedRecord>>,
}

/// Inventory store kept in a single RON file, rewritten atomically after every change.
///
/// The file is only replaced once a change has been written successfully, so a
/// failed write leaves both the file and the in-memory view untouched.
pub(crate) struct RonInventoryStore {
    writer: AtomicSnapshotWriter,
    inventory: Mutex<Inventory>,
}

impl RonInventoryStore {
    pub(crate) fn open(path: PathBuf) -> Result<Self, StoreError> {
        let inventory = load(&path)?;
        dex_info!(
            "Loaded inventory for {} users from {:?}",
            inventory.len(),
            path
        );
        Ok(Self {
            writer: AtomicSnapshotWriter::new(path),
            inventory: Mutex::new(inventory),
        })
    }

    async fn mutate<T>(&self, apply: impl FnOnce(&mut Inventory) -> T) -> Result<T, StoreError> {
        let mut inventory = self.inventory.lock().await;
        let mut next = inventory.clone();
        let result = apply(&mut next);
        self.save(&next)?;
        *inventory = next;
        Ok(result)
    }

    fn save(&self, inventory: &Inventory) -> Result<(), StoreError> {
        let state = PersistedInventory {
            updated_utc: Some(Utc::now().to_rfc3339()),
            users: inventory
                .iter()
                .filter(|(_, rows)| !rows.is_empty())
                .map(|(user_id, rows)| (*user_id, rows.values().map(to_persisted).collect()))
                .collect(),
        };
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&state, pretty)
            .map_err(|err| StoreError::Serialize(err.to_string()))?;
        self.writer
            .write(&content)
            .map_err(|err| StoreError::Io(err.to_string()))?;
        dex_debug!("Wrote inventory snapshot to {:?}", self.writer.target());
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for RonInventoryStore {
    async fn bulk_add(&self, user_id: UserId, records: &[Record]) -> Result<usize, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }
        self.mutate(|inventory| upsert_records(inventory.entry(user_id).or_default(), records))
            .await
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
        self.mutate(|inventory| match inventory.get_mut(&user_id) {
            Some(rows) => ids.iter().filter(|id| rows.remove(id).is_some()).count(),
            None => 0,
        })
        .await
    }

    async fn clear_all(&self, user_id: UserId) -> Result<usize, StoreError> {
        self.mutate(|inventory| inventory.remove(&user_id).map_or(0, |rows| rows.len()))
            .await
    }

    async fn list_all(&self, user_id: UserId) -> Result<Vec<Record>, StoreError> {
        let inventory = self.inventory.lock().await;
        Ok(inventory
            .get(&user_id)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default())
    }
}

fn load(path: &Path) -> Result<Inventory, StoreError> {
    let Some(content) = read_snapshot(path).map_err(|err| StoreError::Io(err.to_string()))? else {
        return Ok(Inventory::new());
    };
    let state: PersistedInventory =
        ron::from_str(&content).map_err(|err| StoreError::Deserialize(err.to_string()))?;

    Ok(state
        .users
        .into_iter()
        .map(|(user_id, rows)| {
            let rows = rows
                .into_iter()
                .map(|row| (row.id, from_persisted(row)))
                .collect();
            (user_id, rows)
        })
        .collect())
}

fn to_persisted(record: &Record) -> PersistedRecord {
    PersistedRecord {
        id: record.identifier(),
        name: record.species_name().to_string(),
        gender: record.gender().as_str().to_string(),
        level: record.level(),
        iv_percent: record.iv_percent(),
    }
}

fn from_persisted(row: PersistedRecord) -> Record {
    Record::new(row.id, row.name, Gender::from_icon(&row.gender))
        .with_level(row.level)
        .with_iv_percent(row.iv_percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn eevee(id: Identifier) -> Record {
        Record::new(id, "Eevee", Gender::Female)
            .with_level(12)
            .with_iv_percent(33.5)
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("inventory.ron");

        let store = RonInventoryStore::open(path.clone()).unwrap();
        assert_eq!(store.bulk_add(1, &[eevee(5), eevee(6)]).await.unwrap(), 2);
        assert_eq!(store.bulk_add(1, &[eevee(6)]).await.unwrap(), 0);
        drop(store);

        let reopened = RonInventoryStore::open(path).unwrap();
        assert_eq!(reopened.count_for_user(1).await.unwrap(), 2);
        assert_eq!(reopened.list_all(1).await.unwrap()[0], eevee(5));
    }

    #[tokio::test]
    async fn remove_and_clear_are_written_through() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("inventory.ron");

        let store = RonInventoryStore::open(path.clone()).unwrap();
        store.bulk_add(1, &[eevee(1), eevee(2), eevee(3)]).await.unwrap();
        store.bulk_add(2, &[eevee(1)]).await.unwrap();
        assert_eq!(store.remove_by_ids(1, &[1, 9]).await.unwrap(), 1);
        assert_eq!(store.clear_all(2).await.unwrap(), 1);

        let reopened = RonInventoryStore::open(path).unwrap();
        assert_eq!(reopened.count_for_user(1).await.unwrap(), 2);
        assert_eq!(reopened.count_for_user(2).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_untouched() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("inventory.ron");
        let store = RonInventoryStore::open(path.clone()).unwrap();
        // A directory in place of the snapshot makes the final rename fail.
        std::fs::create_dir(&path).unwrap();

        let err = store.bulk_add(1, &[eevee(1)]).await.unwrap_err();

        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.count_for_user(1).await.unwrap(), 0);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("inventory.ron");
        std::fs::write(&path, "not ron at all {").unwrap();

        assert!(matches!(
            RonInventoryStore::open(path),
            Err(StoreError::Deserialize(_))
        ));
    }
}
