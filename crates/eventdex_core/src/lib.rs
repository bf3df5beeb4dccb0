//! Eventdex core: records, session bookkeeping and the pure tracking state machine.
mod dedup;
mod effect;
mod msg;
mod record;
mod session;
mod update;
mod view_model;

pub use dedup::DedupTracker;
pub use effect::Effect;
pub use msg::Msg;
pub use record::{
    parse_identifiers, ExtractedPage, Gender, Identifier, InvalidIdentifier, Record, SourceId,
    UserId,
};
pub use session::{Deadlines, Phase, SessionState, SourceMode};
pub use update::update;
pub use view_model::{ProgressReport, ReportStage, SessionOutcome, SessionSummary};
