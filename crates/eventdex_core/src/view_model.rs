use std::fmt;

use crate::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Every supplied page was processed and nothing is being monitored.
    Completed,
    /// No page added anything new for the idle deadline.
    IdleTimeout,
    /// The session hit its overall deadline.
    OverallTimeout,
    /// The invoking context went away.
    Cancelled,
    /// No eligible record on any supplied page; nothing was persisted.
    NoContentFound,
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SessionOutcome::Completed => "completed",
            SessionOutcome::IdleTimeout => "stopped after inactivity",
            SessionOutcome::OverallTimeout => "time limit reached",
            SessionOutcome::Cancelled => "cancelled",
            SessionOutcome::NoContentFound => "no event shinies found to track",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStage {
    InProgress,
    PageDetected,
    Complete,
}

/// Running counters shown to the user after each processed page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressReport {
    pub stage: ReportStage,
    /// Still waiting for more pages.
    pub live: bool,
    /// Candidate lines seen across all pages, repeats included.
    pub tracked: usize,
    /// Records that were new to the inventory.
    pub added: usize,
    pub inventory_total: usize,
    pub duplicates_ignored: usize,
    pub pages_seen: usize,
    pub sources_skipped: usize,
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headline = match self.stage {
            ReportStage::InProgress => "Event Shiny Tracking In Progress",
            ReportStage::PageDetected => "Page detected! Adding more event shinies",
            ReportStage::Complete => "Event Shiny Tracking Complete",
        };
        writeln!(f, "{headline}")?;
        writeln!(f, "Total Event Shinies Tracked: {}", self.tracked)?;
        writeln!(f, "Total Event Shinies Added: {}", self.added)?;
        writeln!(f, "Currently In Inventory: {}", self.inventory_total)?;
        write!(f, "Duplicates Ignored: {}", self.duplicates_ignored)?;
        if self.sources_skipped > 0 {
            write!(f, "\nSources Skipped: {}", self.sources_skipped)?;
        }
        if self.live {
            write!(f, "\n\nKeep clicking pages, I'll auto-detect more!")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub outcome: SessionOutcome,
    pub report: ProgressReport,
    /// Records accepted this session, first occurrence order.
    pub records: Vec<Record>,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.outcome == SessionOutcome::NoContentFound {
            return write!(f, "No event shinies found to track!");
        }
        write!(f, "{}\n({})", self.report, self.outcome)
    }
}
