use std::time::Duration;

use crate::view_model::{ProgressReport, ReportStage, SessionOutcome, SessionSummary};
use crate::{DedupTracker, ExtractedPage, Record, SourceId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initial,
    Waiting,
    ProcessingUpdate,
    Done(SessionOutcome),
}

impl Phase {
    pub fn is_done(&self) -> bool {
        matches!(self, Phase::Done(_))
    }
}

/// Wait budgets for a monitoring session. All offsets count from session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    /// Hard stop measured from session start.
    pub overall: Duration,
    /// Stop after this long without a page that added something new.
    pub idle: Duration,
    /// Upper bound for a single wait on the edit feed.
    pub wait_slice: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            overall: Duration::from_secs(300),
            idle: Duration::from_secs(15),
            wait_slice: Duration::from_secs(30),
        }
    }
}

/// Where the pages of a session come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceMode {
    /// One page, re-read every time it is edited.
    Monitor(SourceId),
    /// Each named page is fetched once; no live monitoring.
    Fetch(Vec<SourceId>),
}

impl SourceMode {
    /// Explicit ids select fetch-only mode; otherwise a replied-to page is monitored.
    pub fn from_command(explicit_ids: &[SourceId], reply_to: Option<SourceId>) -> Option<Self> {
        if !explicit_ids.is_empty() {
            return Some(SourceMode::Fetch(explicit_ids.to_vec()));
        }
        reply_to.map(SourceMode::Monitor)
    }

    pub fn monitored(&self) -> Option<SourceId> {
        match self {
            SourceMode::Monitor(id) => Some(*id),
            SourceMode::Fetch(_) => None,
        }
    }
}

/// Everything one tracking session accumulates. Discarded when the session ends.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    user_id: UserId,
    monitored: Option<SourceId>,
    deadlines: Deadlines,
    phase: Phase,
    dedup: DedupTracker,
    accumulated: Vec<Record>,
    pending: Vec<Record>,
    pages_seen: usize,
    candidate_lines_seen: usize,
    sources_skipped: usize,
    newly_persisted: usize,
    inventory_total: usize,
    last_accepted_at: Duration,
}

impl SessionState {
    pub fn new(user_id: UserId, mode: &SourceMode, deadlines: Deadlines) -> Self {
        Self {
            user_id,
            monitored: mode.monitored(),
            deadlines,
            phase: Phase::Initial,
            dedup: DedupTracker::new(),
            accumulated: Vec::new(),
            pending: Vec::new(),
            pages_seen: 0,
            candidate_lines_seen: 0,
            sources_skipped: 0,
            newly_persisted: 0,
            inventory_total: 0,
            last_accepted_at: Duration::ZERO,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn monitored(&self) -> Option<SourceId> {
        self.monitored
    }

    pub fn deadlines(&self) -> Deadlines {
        self.deadlines
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn records(&self) -> &[Record] {
        &self.accumulated
    }

    pub fn candidate_lines_seen(&self) -> usize {
        self.candidate_lines_seen
    }

    pub fn sources_skipped(&self) -> usize {
        self.sources_skipped
    }

    pub fn last_accepted_at(&self) -> Duration {
        self.last_accepted_at
    }

    /// Accepted records that went to the gateway without being new there.
    pub fn duplicates_ignored(&self) -> usize {
        self.accumulated.len().saturating_sub(self.newly_persisted)
    }

    /// How long the next wait on the edit feed may block, or `None` outside `Waiting`.
    ///
    /// Never overshoots either deadline, so expiry is observed exactly when it happens.
    pub fn next_wait(&self, now: Duration) -> Option<Duration> {
        if self.phase != Phase::Waiting {
            return None;
        }
        let mut wait = self
            .deadlines
            .wait_slice
            .min(self.deadlines.overall.saturating_sub(now));
        if let Some(idle_at) = self.idle_deadline_at() {
            wait = wait.min(idle_at.saturating_sub(now));
        }
        Some(wait)
    }

    /// The deadline that has elapsed at `now`, overall first.
    pub fn deadline_reached(&self, now: Duration) -> Option<SessionOutcome> {
        if now >= self.deadlines.overall {
            Some(SessionOutcome::OverallTimeout)
        } else if self.idle_deadline_at().is_some_and(|idle_at| now >= idle_at) {
            Some(SessionOutcome::IdleTimeout)
        } else {
            None
        }
    }

    /// `None` when the idle budget is too large to ever elapse.
    fn idle_deadline_at(&self) -> Option<Duration> {
        self.last_accepted_at.checked_add(self.deadlines.idle)
    }

    pub fn progress(&self) -> ProgressReport {
        let stage = match self.phase {
            Phase::Initial => ReportStage::InProgress,
            Phase::Waiting | Phase::ProcessingUpdate => {
                if self.pages_seen > 1 {
                    ReportStage::PageDetected
                } else {
                    ReportStage::InProgress
                }
            }
            Phase::Done(_) => ReportStage::Complete,
        };
        ProgressReport {
            stage,
            live: self.monitored.is_some() && !self.phase.is_done(),
            tracked: self.candidate_lines_seen,
            added: self.newly_persisted,
            inventory_total: self.inventory_total,
            duplicates_ignored: self.duplicates_ignored(),
            pages_seen: self.pages_seen,
            sources_skipped: self.sources_skipped,
        }
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        match self.phase {
            Phase::Done(outcome) => Some(SessionSummary {
                outcome,
                report: self.progress(),
                records: self.accumulated.clone(),
            }),
            _ => None,
        }
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    /// Runs one page through the dedup tracker and returns what is new this session.
    pub(crate) fn admit_page(&mut self, page: ExtractedPage, at: Duration) -> Vec<Record> {
        self.pages_seen += 1;
        self.candidate_lines_seen += page.candidate_lines;
        let accepted = self.dedup.admit(page.records);
        if !accepted.is_empty() {
            self.last_accepted_at = at;
            self.accumulated.extend(accepted.iter().cloned());
        }
        accepted
    }

    pub(crate) fn queue_pending(&mut self, records: Vec<Record>) {
        self.pending.extend(records);
    }

    pub(crate) fn take_pending(&mut self) -> Vec<Record> {
        std::mem::take(&mut self.pending)
    }

    pub(crate) fn note_skipped_source(&mut self) {
        self.sources_skipped += 1;
    }

    pub(crate) fn apply_persisted(&mut self, inserted: usize, inventory_total: usize) {
        self.newly_persisted += inserted;
        self.inventory_total = inventory_total;
    }
}
