use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use eventdex_core::SourceId;
use eventdex_logging::{dex_debug, dex_warn};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::{decode_page, AuthorId, FetchError, FetchFailureKind};

/// Content of a listing page at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSnapshot {
    pub source_id: SourceId,
    pub author_id: Option<AuthorId>,
    /// Structured listing text; `None` when the page carries none.
    pub content: Option<String>,
}

impl SourceSnapshot {
    pub fn new(source_id: SourceId, content: impl Into<String>) -> Self {
        Self {
            source_id,
            author_id: None,
            content: Some(content.into()),
        }
    }

    pub fn authored_by(mut self, author_id: AuthorId) -> Self {
        self.author_id = Some(author_id);
        self
    }

    /// Non-empty content, if any.
    pub fn text(&self) -> Option<&str> {
        self.content
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// A page was edited; delivered with the snapshots from before and after the edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditNotification {
    pub before: SourceSnapshot,
    pub after: SourceSnapshot,
}

impl EditNotification {
    pub fn new(before: SourceSnapshot, after: SourceSnapshot) -> Self {
        Self { before, after }
    }
}

#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, source_id: SourceId) -> Result<SourceSnapshot, FetchError>;
}

/// Sources held in memory, with optional scripted failures.
#[derive(Debug, Default)]
pub struct MemorySources {
    pages: Mutex<HashMap<SourceId, Result<SourceSnapshot, FetchFailureKind>>>,
}

impl MemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, snapshot: SourceSnapshot) {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(snapshot.source_id, Ok(snapshot));
    }

    pub fn fail(&self, source_id: SourceId, kind: FetchFailureKind) {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(source_id, Err(kind));
    }
}

#[async_trait]
impl SourceFetcher for MemorySources {
    async fn fetch(&self, source_id: SourceId) -> Result<SourceSnapshot, FetchError> {
        let pages = self.pages.lock().unwrap_or_else(PoisonError::into_inner);
        match pages.get(&source_id) {
            Some(Ok(snapshot)) => Ok(snapshot.clone()),
            Some(Err(kind)) => Err(FetchError::new(source_id, kind.clone(), "scripted failure")),
            None => Err(FetchError::new(
                source_id,
                FetchFailureKind::NotFound,
                "unknown source",
            )),
        }
    }
}

/// Pages stored as `<dir>/<source_id>.txt`.
///
/// A first line of the form `author: <id>` records who posted the page and is
/// not part of the listing text.
#[derive(Debug, Clone)]
pub struct DirectorySources {
    dir: PathBuf,
}

impl DirectorySources {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path_for(&self, source_id: SourceId) -> PathBuf {
        self.dir.join(format!("{source_id}.txt"))
    }
}

#[async_trait]
impl SourceFetcher for DirectorySources {
    async fn fetch(&self, source_id: SourceId) -> Result<SourceSnapshot, FetchError> {
        let path = self.path_for(source_id);
        let bytes = tokio::fs::read(&path).await.map_err(|err| {
            let kind = match err.kind() {
                io::ErrorKind::NotFound => FetchFailureKind::NotFound,
                io::ErrorKind::PermissionDenied => FetchFailureKind::Forbidden,
                _ => FetchFailureKind::Io,
            };
            FetchError::new(source_id, kind, format!("{}: {err}", path.display()))
        })?;
        let decoded = decode_page(&bytes).map_err(|err| {
            FetchError::new(source_id, FetchFailureKind::NotAListing, err.to_string())
        })?;
        dex_debug!(
            "read source {} from {:?} ({})",
            source_id,
            path,
            decoded.encoding_label
        );
        let (author_id, body) = split_author_header(&decoded.text);
        let snapshot = SourceSnapshot::new(source_id, body);
        Ok(match author_id {
            Some(author_id) => snapshot.authored_by(author_id),
            None => snapshot,
        })
    }
}

fn split_author_header(text: &str) -> (Option<AuthorId>, &str) {
    let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
    first
        .trim()
        .strip_prefix("author:")
        .and_then(|id| id.trim().parse().ok())
        .map_or((None, text), |author_id| (Some(author_id), rest))
}

/// Fan-out of edit notifications to every live tracking session.
#[derive(Debug, Clone)]
pub struct EditBus {
    tx: broadcast::Sender<EditNotification>,
}

impl Default for EditBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EditBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Returns how many subscriptions received the notification.
    pub fn publish(&self, notification: EditNotification) -> usize {
        self.tx.send(notification).unwrap_or(0)
    }

    pub fn subscribe(&self) -> EditSubscription {
        EditSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// One session's listener on the edit bus. Dropping it unsubscribes.
#[derive(Debug)]
pub struct EditSubscription {
    rx: broadcast::Receiver<EditNotification>,
}

impl EditSubscription {
    /// Next notification, or `None` once the bus is gone. Cancel safe.
    pub async fn recv(&mut self) -> Option<EditNotification> {
        loop {
            match self.rx.recv().await {
                Ok(notification) => return Some(notification),
                Err(RecvError::Lagged(skipped)) => {
                    dex_warn!("edit subscription lagged, {} notifications dropped", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_header_is_split_from_listing() {
        let (author, body) = split_author_header("author: 77\r\n✨ Eevee");
        assert_eq!(author, Some(77));
        assert_eq!(body, "✨ Eevee");
    }

    #[test]
    fn page_without_header_is_kept_whole() {
        let text = "✨ Eevee\nauthor: 77";
        assert_eq!(split_author_header(text), (None, text));
    }
}
