use std::time::Duration;

use crate::{Effect, Msg, Phase, SessionOutcome, SessionState};

/// Pure update function: applies a message to session state and returns any effects.
pub fn update(mut state: SessionState, msg: Msg) -> (SessionState, Vec<Effect>) {
    let effects = match msg {
        Msg::InitialPage { page, at, .. } => {
            if state.phase() != Phase::Initial {
                return (state, Vec::new());
            }
            let accepted = state.admit_page(page, at);
            state.queue_pending(accepted);
            Vec::new()
        }
        Msg::SourceSkipped { .. } => {
            if state.phase() == Phase::Initial {
                state.note_skipped_source();
            }
            Vec::new()
        }
        Msg::InitialPagesDone { .. } => {
            if state.phase() != Phase::Initial {
                return (state, Vec::new());
            }
            let records = state.take_pending();
            if records.is_empty() {
                finish(&mut state, SessionOutcome::NoContentFound)
            } else {
                vec![Effect::Persist { records }]
            }
        }
        Msg::EditReceived {
            source_id,
            page,
            at,
        } => {
            // Foreign or empty edits leave every deadline untouched.
            if state.phase() != Phase::Waiting || state.monitored() != Some(source_id) {
                return (state, Vec::new());
            }
            let Some(page) = page else {
                return (state, Vec::new());
            };
            state.set_phase(Phase::ProcessingUpdate);
            let records = state.admit_page(page, at);
            if records.is_empty() {
                settle_after_update(&mut state, at)
            } else {
                vec![Effect::Persist { records }]
            }
        }
        Msg::Persisted {
            inserted,
            inventory_total,
            at,
        } => match state.phase() {
            Phase::Initial => {
                state.apply_persisted(inserted, inventory_total);
                if state.monitored().is_some() {
                    settle_after_update(&mut state, at)
                } else {
                    let mut effects = vec![Effect::Render(state.progress())];
                    effects.extend(finish(&mut state, SessionOutcome::Completed));
                    effects
                }
            }
            Phase::ProcessingUpdate => {
                state.apply_persisted(inserted, inventory_total);
                settle_after_update(&mut state, at)
            }
            Phase::Waiting | Phase::Done(_) => Vec::new(),
        },
        Msg::SliceElapsed { at } => {
            if state.phase() != Phase::Waiting {
                return (state, Vec::new());
            }
            match state.deadline_reached(at) {
                Some(outcome) => finish(&mut state, outcome),
                None => Vec::new(),
            }
        }
        Msg::Cancelled => {
            if state.phase().is_done() {
                return (state, Vec::new());
            }
            finish(&mut state, SessionOutcome::Cancelled)
        }
    };

    (state, effects)
}

/// Back to `Waiting` after a page, unless the overall deadline already passed.
fn settle_after_update(state: &mut SessionState, at: Duration) -> Vec<Effect> {
    state.set_phase(Phase::Waiting);
    let mut effects = vec![Effect::Render(state.progress())];
    if at >= state.deadlines().overall {
        effects.extend(finish(state, SessionOutcome::OverallTimeout));
    }
    effects
}

fn finish(state: &mut SessionState, outcome: SessionOutcome) -> Vec<Effect> {
    state.set_phase(Phase::Done(outcome));
    let mut effects = Vec::with_capacity(2);
    if state.monitored().is_some() {
        effects.push(Effect::Unsubscribe);
    }
    if let Some(summary) = state.summary() {
        effects.push(Effect::Finish(summary));
    }
    effects
}
