//! Eventdex engine: extraction, persistence gateway and the async tracking driver.
mod catalog;
mod decode;
mod extract;
mod persist;
mod report;
mod settings;
mod source;
mod stats;
mod store;
mod tracker;
mod types;

pub use catalog::{SpeciesCatalog, StaticCatalog};
pub use decode::{decode_page, DecodeError, DecodedPage};
pub use extract::{extract_page, ids_in_page, LinePatternExtractor, RecordExtractor, SENTINEL};
pub use persist::{ensure_parent_dir, read_snapshot, AtomicSnapshotWriter, PersistError};
pub use report::{ChannelReporter, LogReporter, ProgressReporter, ReporterEvent};
pub use settings::TrackerSettings;
pub use source::{
    DirectorySources, EditBus, EditNotification, EditSubscription, MemorySources,
    SourceFetcher, SourceSnapshot,
};
pub use stats::{collection_stats, CollectionStats, SpeciesCount};
pub use store::{upsert_records, Inventory, InventoryStore, MemoryStore};
pub use tracker::{RemovalReport, Tracker};
pub use types::{AuthorId, FetchError, FetchFailureKind, ReportError, StoreError, TrackError};
