use std::sync::Arc;
use std::time::Duration;

use eventdex_core::SourceId;
use eventdex_engine::{EditBus, EditNotification, SourceFetcher, SourceSnapshot};
use eventdex_logging::{dex_debug, dex_info, dex_warn};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Turns changes to one source page into edit notifications by polling it.
pub(crate) struct FileEditFeed {
    sources: Arc<dyn SourceFetcher>,
    source_id: SourceId,
    poll: Duration,
    baseline: Option<SourceSnapshot>,
}

impl FileEditFeed {
    pub(crate) fn new(
        sources: Arc<dyn SourceFetcher>,
        source_id: SourceId,
        poll: Duration,
    ) -> Self {
        Self {
            sources,
            source_id,
            poll: poll.max(Duration::from_millis(10)),
            baseline: None,
        }
    }

    /// Content already known to the session; the first poll that differs is published.
    pub(crate) fn with_baseline(mut self, snapshot: SourceSnapshot) -> Self {
        self.baseline = Some(snapshot);
        self
    }

    /// Publishes every observed change on `bus` until `cancel` fires.
    pub(crate) async fn run(self, bus: EditBus, cancel: CancellationToken) {
        let mut ticker = interval(self.poll);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last = self.baseline;
        dex_info!("watching source {} every {:?}", self.source_id, self.poll);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }
            let current = match self.sources.fetch(self.source_id).await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    dex_warn!("watch read failed: {}", err);
                    continue;
                }
            };
            match last.replace(current.clone()) {
                Some(before) if before != current => {
                    let delivered = bus.publish(EditNotification::new(before, current));
                    dex_debug!("source {} changed, {} listeners", self.source_id, delivered);
                }
                _ => {}
            }
        }
        dex_debug!("stopped watching source {}", self.source_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventdex_engine::MemorySources;

    #[tokio::test(start_paused = true)]
    async fn publishes_only_changes() {
        let sources = Arc::new(MemorySources::new());
        sources.insert(SourceSnapshot::new(5, "first"));
        let bus = EditBus::default();
        let mut subscription = bus.subscribe();
        let cancel = CancellationToken::new();
        let feed = FileEditFeed::new(sources.clone(), 5, Duration::from_millis(100));
        let handle = tokio::spawn(feed.run(bus.clone(), cancel.clone()));

        tokio::time::sleep(Duration::from_millis(350)).await;
        sources.insert(SourceSnapshot::new(5, "second"));
        let notification = subscription.recv().await.unwrap();

        assert_eq!(notification.before.text(), Some("first"));
        assert_eq!(notification.after.text(), Some("second"));

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn change_before_the_first_poll_is_published() {
        let sources = Arc::new(MemorySources::new());
        sources.insert(SourceSnapshot::new(5, "second"));
        let bus = EditBus::default();
        let mut subscription = bus.subscribe();
        let cancel = CancellationToken::new();
        let feed = FileEditFeed::new(sources, 5, Duration::from_millis(100))
            .with_baseline(SourceSnapshot::new(5, "first"));
        let handle = tokio::spawn(feed.run(bus.clone(), cancel.clone()));

        let notification = subscription.recv().await.unwrap();

        assert_eq!(notification.before.text(), Some("first"));
        assert_eq!(notification.after.text(), Some("second"));

        cancel.cancel();
        handle.await.unwrap();
    }
}
