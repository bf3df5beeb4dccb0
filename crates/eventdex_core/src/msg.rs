use std::time::Duration;

use crate::{ExtractedPage, SourceId};

/// Inputs to the tracking state machine. `at` is the offset from session start.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// A page supplied at invocation has been extracted and filtered.
    InitialPage {
        source_id: SourceId,
        page: ExtractedPage,
        at: Duration,
    },
    /// A named source could not be fetched and was skipped.
    SourceSkipped { source_id: SourceId },
    /// Every page supplied at invocation has been handed over.
    InitialPagesDone { at: Duration },
    /// An edit arrived on the feed. `page` is `None` when the snapshot had no usable content.
    EditReceived {
        source_id: SourceId,
        page: Option<ExtractedPage>,
        at: Duration,
    },
    /// The gateway stored a batch requested through `Effect::Persist`.
    Persisted {
        inserted: usize,
        inventory_total: usize,
        at: Duration,
    },
    /// A wait slice ran out without a matching edit.
    SliceElapsed { at: Duration },
    /// The invoking context is going away.
    Cancelled,
}
