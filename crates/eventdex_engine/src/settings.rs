use std::time::Duration;

use eventdex_core::Deadlines;

use crate::AuthorId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerSettings {
    pub overall_deadline: Duration,
    pub idle_deadline: Duration,
    pub wait_slice: Duration,
    /// Bound on a single source fetch.
    pub fetch_timeout: Duration,
    /// Bound on a single persistence gateway call.
    pub store_timeout: Duration,
    /// Bound on a single progress render; an overrun is logged and skipped.
    pub report_timeout: Duration,
    /// When set, only pages authored by this id count as listings.
    pub trusted_author: Option<AuthorId>,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        let deadlines = Deadlines::default();
        Self {
            overall_deadline: deadlines.overall,
            idle_deadline: deadlines.idle,
            wait_slice: deadlines.wait_slice,
            fetch_timeout: Duration::from_secs(10),
            store_timeout: Duration::from_secs(10),
            report_timeout: Duration::from_secs(5),
            trusted_author: None,
        }
    }
}

impl TrackerSettings {
    pub fn deadlines(&self) -> Deadlines {
        Deadlines {
            overall: self.overall_deadline,
            idle: self.idle_deadline,
            // A zero slice would spin.
            wait_slice: self.wait_slice.max(Duration::from_millis(1)),
        }
    }
}
