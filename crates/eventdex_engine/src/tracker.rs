use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use eventdex_core::{
    update, Effect, Identifier, Msg, Record, SessionState, SessionSummary, SourceId, SourceMode,
    UserId,
};
use eventdex_logging::{dex_error, dex_info, dex_warn};
use tokio::time::{timeout, Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    collection_stats, extract_page, ids_in_page, CollectionStats, EditBus, EditNotification,
    EditSubscription, FetchError, FetchFailureKind, InventoryStore, LinePatternExtractor,
    ProgressReporter, RecordExtractor, ReportError, SourceFetcher, SourceSnapshot,
    SpeciesCatalog, StoreError, TrackError, TrackerSettings,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalReport {
    pub ids_found: usize,
    pub removed: usize,
    /// `None` when nothing was listed and the store was not consulted.
    pub inventory_total: Option<usize>,
}

impl fmt::Display for RemovalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ids_found == 0 {
            return write!(f, "No Pokemon IDs found in this message!");
        }
        writeln!(f, "IDs Found in Message: {}", self.ids_found)?;
        writeln!(f, "Event Shinies Removed: {}", self.removed)?;
        write!(
            f,
            "Currently In Inventory: {}",
            self.inventory_total.unwrap_or_default()
        )?;
        if self.removed == 0 {
            write!(f, "\nNone of these IDs were in your tracked event shinies.")?;
        }
        Ok(())
    }
}

/// Drives tracking sessions: fetches pages, feeds the core state machine and
/// executes the effects it asks for.
pub struct Tracker {
    store: Arc<dyn InventoryStore>,
    catalog: Arc<dyn SpeciesCatalog>,
    sources: Arc<dyn SourceFetcher>,
    extractor: Arc<dyn RecordExtractor>,
    reporter: Arc<dyn ProgressReporter>,
    settings: TrackerSettings,
}

impl Tracker {
    pub fn new(
        store: Arc<dyn InventoryStore>,
        catalog: Arc<dyn SpeciesCatalog>,
        sources: Arc<dyn SourceFetcher>,
        reporter: Arc<dyn ProgressReporter>,
        settings: TrackerSettings,
    ) -> Self {
        Self {
            store,
            catalog,
            sources,
            extractor: Arc::new(LinePatternExtractor::new()),
            reporter,
            settings,
        }
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn RecordExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Runs one tracking session to its terminal state.
    ///
    /// In monitor mode the session keeps listening on `edits` until a deadline
    /// fires or `cancel` is triggered; the subscription is released before
    /// this returns, whatever the outcome.
    pub async fn track(
        &self,
        user_id: UserId,
        mode: SourceMode,
        edits: &EditBus,
        cancel: &CancellationToken,
    ) -> Result<SessionSummary, TrackError> {
        let clock = Instant::now();
        // Subscribe before the first fetch so an edit racing it is not lost.
        let subscription = mode.monitored().map(|_| edits.subscribe());
        let mut initial = Vec::new();

        match &mode {
            SourceMode::Monitor(source_id) => {
                if cancel.is_cancelled() {
                    initial.push(Msg::Cancelled);
                } else {
                    let snapshot = self
                        .fetch_listing(*source_id)
                        .await
                        .map_err(TrackError::SourceUnavailable)?;
                    initial.push(self.initial_page(&snapshot, clock.elapsed()));
                }
            }
            SourceMode::Fetch(source_ids) => {
                for &source_id in source_ids {
                    if cancel.is_cancelled() {
                        initial.push(Msg::Cancelled);
                        break;
                    }
                    match self.fetch_listing(source_id).await {
                        Ok(snapshot) => {
                            initial.push(self.initial_page(&snapshot, clock.elapsed()))
                        }
                        Err(err) => {
                            dex_warn!("skipping source: {}", err);
                            initial.push(Msg::SourceSkipped { source_id });
                        }
                    }
                }
            }
        }
        initial.push(Msg::InitialPagesDone {
            at: clock.elapsed(),
        });

        let state = SessionState::new(user_id, &mode, self.settings.deadlines());
        self.drive(state, initial, subscription, clock, cancel).await
    }

    /// One-shot ingestion of a page the caller already holds.
    pub async fn add_from_page(
        &self,
        user_id: UserId,
        snapshot: &SourceSnapshot,
    ) -> Result<SessionSummary, TrackError> {
        if self.listing_text(snapshot).is_none() {
            return Err(TrackError::SourceUnavailable(not_a_listing(
                snapshot.source_id,
            )));
        }
        let clock = Instant::now();
        let mode = SourceMode::Fetch(vec![snapshot.source_id]);
        let initial = vec![
            self.initial_page(snapshot, clock.elapsed()),
            Msg::InitialPagesDone {
                at: clock.elapsed(),
            },
        ];
        let state = SessionState::new(user_id, &mode, self.settings.deadlines());
        self.drive(state, initial, None, clock, &CancellationToken::new())
            .await
    }

    /// Removes every identifier listed on `page` from the user's inventory.
    pub async fn remove_listed(
        &self,
        user_id: UserId,
        page: &str,
    ) -> Result<RemovalReport, StoreError> {
        self.remove_ids(user_id, &ids_in_page(page)).await
    }

    pub async fn remove_ids(
        &self,
        user_id: UserId,
        ids: &[Identifier],
    ) -> Result<RemovalReport, StoreError> {
        if ids.is_empty() {
            return Ok(RemovalReport::default());
        }
        let removed = self
            .gateway("remove", self.store.remove_by_ids(user_id, ids))
            .await?;
        let inventory_total = self
            .gateway("count", self.store.count_for_user(user_id))
            .await?;
        dex_info!(
            "removed {} of {} listed ids for user {}",
            removed,
            ids.len(),
            user_id
        );
        Ok(RemovalReport {
            ids_found: ids.len(),
            removed,
            inventory_total: Some(inventory_total),
        })
    }

    /// Drops the user's whole inventory, returning how many records went.
    pub async fn clear(&self, user_id: UserId) -> Result<usize, StoreError> {
        let cleared = self
            .gateway("clear", self.store.clear_all(user_id))
            .await?;
        dex_info!("cleared {} records for user {}", cleared, user_id);
        Ok(cleared)
    }

    pub async fn inventory(&self, user_id: UserId) -> Result<Vec<Record>, StoreError> {
        self.gateway("list", self.store.list_all(user_id)).await
    }

    /// Statistics over everything stored for the user, `None` when nothing is tracked.
    pub async fn stats(&self, user_id: UserId) -> Result<Option<CollectionStats>, StoreError> {
        let records = self.inventory(user_id).await?;
        Ok(collection_stats(&records, self.catalog.as_ref()))
    }

    async fn drive(
        &self,
        mut state: SessionState,
        initial: Vec<Msg>,
        mut subscription: Option<EditSubscription>,
        clock: Instant,
        cancel: &CancellationToken,
    ) -> Result<SessionSummary, TrackError> {
        let mut inbox: VecDeque<Msg> = initial.into();
        loop {
            while let Some(msg) = inbox.pop_front() {
                let phase_before = state.phase();
                let (next, effects) = update(state, msg);
                state = next;
                if state.phase() != phase_before {
                    dex_info!(
                        "session for user {}: {:?} -> {:?}",
                        state.user_id(),
                        phase_before,
                        state.phase()
                    );
                }

                for effect in effects {
                    match effect {
                        Effect::Persist { records } => {
                            let user_id = state.user_id();
                            let inserted = self
                                .gateway("bulk add", self.store.bulk_add(user_id, &records))
                                .await
                                .inspect_err(|err| {
                                    dex_error!("bulk add for user {} failed: {}", user_id, err)
                                })?;
                            let inventory_total = self
                                .gateway("count", self.store.count_for_user(user_id))
                                .await?;
                            inbox.push_back(Msg::Persisted {
                                inserted,
                                inventory_total,
                                at: clock.elapsed(),
                            });
                        }
                        Effect::Render(report) => {
                            self.report("render", self.reporter.render(&report)).await;
                        }
                        Effect::Unsubscribe => {
                            if let Some(subscription) = subscription.take() {
                                subscription.unsubscribe();
                            }
                        }
                        Effect::Finish(summary) => {
                            self.report("finish", self.reporter.finish(&summary)).await;
                            return Ok(summary);
                        }
                    }
                }
            }

            let msg = self
                .wait_for_edit(&state, subscription.as_mut(), clock, cancel)
                .await;
            inbox.push_back(msg);
        }
    }

    /// One bounded wait on the edit feed.
    async fn wait_for_edit(
        &self,
        state: &SessionState,
        subscription: Option<&mut EditSubscription>,
        clock: Instant,
        cancel: &CancellationToken,
    ) -> Msg {
        let (Some(wait), Some(subscription)) = (state.next_wait(clock.elapsed()), subscription)
        else {
            dex_error!(
                "session for user {} stalled in {:?}",
                state.user_id(),
                state.phase()
            );
            return Msg::Cancelled;
        };
        // A zero wait skips the feed entirely so a busy feed cannot outlive a deadline.
        if wait.is_zero() {
            return Msg::SliceElapsed {
                at: clock.elapsed(),
            };
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Msg::Cancelled,
            received = timeout(wait, subscription.recv()) => match received {
                Ok(Some(notification)) => self.edit_msg(state, notification, clock.elapsed()),
                Ok(None) => {
                    dex_warn!("edit feed closed while waiting");
                    Msg::Cancelled
                }
                Err(_) => Msg::SliceElapsed { at: clock.elapsed() },
            },
        }
    }

    fn edit_msg(&self, state: &SessionState, notification: EditNotification, at: Duration) -> Msg {
        let after = notification.after;
        let page = if state.monitored() == Some(after.source_id) {
            self.listing_text(&after)
                .map(|text| extract_page(self.extractor.as_ref(), self.catalog.as_ref(), text))
        } else {
            None
        };
        Msg::EditReceived {
            source_id: after.source_id,
            page,
            at,
        }
    }

    fn initial_page(&self, snapshot: &SourceSnapshot, at: Duration) -> Msg {
        let text = self.listing_text(snapshot).unwrap_or_default();
        Msg::InitialPage {
            source_id: snapshot.source_id,
            page: extract_page(self.extractor.as_ref(), self.catalog.as_ref(), text),
            at,
        }
    }

    /// Listing text of a snapshot, if it came from the trusted author and has content.
    fn listing_text<'a>(&self, snapshot: &'a SourceSnapshot) -> Option<&'a str> {
        if let Some(trusted) = self.settings.trusted_author {
            if snapshot.author_id != Some(trusted) {
                return None;
            }
        }
        snapshot.text()
    }

    async fn fetch_listing(&self, source_id: SourceId) -> Result<SourceSnapshot, FetchError> {
        let snapshot = timeout(self.settings.fetch_timeout, self.sources.fetch(source_id))
            .await
            .map_err(|_| {
                FetchError::new(source_id, FetchFailureKind::Timeout, "fetch timed out")
            })??;
        if self.listing_text(&snapshot).is_none() {
            return Err(not_a_listing(source_id));
        }
        Ok(snapshot)
    }

    /// Reporter calls are bounded and their failures only logged.
    async fn report(
        &self,
        operation: &str,
        call: impl Future<Output = Result<(), ReportError>>,
    ) {
        let outcome = match timeout(self.settings.report_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ReportError(format!("{operation} timed out"))),
        };
        if let Err(err) = outcome {
            dex_warn!("{}", err);
        }
    }

    async fn gateway<T>(
        &self,
        operation: &str,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, StoreError> {
        match timeout(self.settings.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Unavailable(format!("{operation} timed out"))),
        }
    }
}

fn not_a_listing(source_id: SourceId) -> FetchError {
    FetchError::new(
        source_id,
        FetchFailureKind::NotAListing,
        "no listing content from the expected author",
    )
}
