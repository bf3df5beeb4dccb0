use crate::{ProgressReport, Record, SessionSummary};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Bulk-add these records, then answer with `Msg::Persisted`.
    Persist { records: Vec<Record> },
    /// Re-render the running counters.
    Render(ProgressReport),
    /// Drop the edit-feed subscription.
    Unsubscribe,
    /// Terminal: emit the final summary.
    Finish(SessionSummary),
}
