use std::fmt;

use eventdex_core::SourceId;
use thiserror::Error;

/// Author of a source page, used to reject pages not produced by the listing bot.
pub type AuthorId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchFailureKind {
    NotFound,
    Forbidden,
    Deleted,
    /// Reachable, but not an inventory listing (wrong author or no content).
    NotAListing,
    Timeout,
    Io,
}

impl fmt::Display for FetchFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailureKind::NotFound => write!(f, "not found"),
            FetchFailureKind::Forbidden => write!(f, "forbidden"),
            FetchFailureKind::Deleted => write!(f, "deleted"),
            FetchFailureKind::NotAListing => write!(f, "not an inventory listing"),
            FetchFailureKind::Timeout => write!(f, "timed out"),
            FetchFailureKind::Io => write!(f, "io error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("source {source_id}: {kind}: {message}")]
pub struct FetchError {
    pub source_id: SourceId,
    pub kind: FetchFailureKind,
    pub message: String,
}

impl FetchError {
    pub fn new(source_id: SourceId, kind: FetchFailureKind, message: impl Into<String>) -> Self {
        Self {
            source_id,
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(String),
    #[error("failed to serialize inventory: {0}")]
    Serialize(String),
    #[error("failed to read stored inventory: {0}")]
    Deserialize(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
#[error("progress rendering failed: {0}")]
pub struct ReportError(pub String);

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("monitored source unavailable: {0}")]
    SourceUnavailable(#[source] FetchError),
    #[error("persistence failed: {0}")]
    Persistence(#[from] StoreError),
}
