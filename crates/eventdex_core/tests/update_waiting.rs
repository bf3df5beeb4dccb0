use std::time::Duration;

use eventdex_core::{
    update, Deadlines, Effect, ExtractedPage, Gender, Msg, Phase, Record, SessionOutcome,
    SessionState, SourceMode,
};

const MONITORED: u64 = 500;

fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

fn page(ids: &[u64]) -> ExtractedPage {
    ExtractedPage {
        candidate_lines: ids.len(),
        records: ids
            .iter()
            .map(|id| Record::new(*id, "Vulpix", Gender::Female))
            .collect(),
    }
}

/// A monitoring session whose first page was accepted at `t = 0`.
fn waiting_session() -> SessionState {
    waiting_session_with(Deadlines::default(), Duration::ZERO)
}

fn waiting_session_with(deadlines: Deadlines, at: Duration) -> SessionState {
    let state = SessionState::new(1, &SourceMode::Monitor(MONITORED), deadlines);
    let (state, _) = update(
        state,
        Msg::InitialPage {
            source_id: MONITORED,
            page: page(&[1]),
            at,
        },
    );
    let (state, _) = update(state, Msg::InitialPagesDone { at });
    let (state, _) = update(
        state,
        Msg::Persisted {
            inserted: 1,
            inventory_total: 1,
            at,
        },
    );
    assert_eq!(state.phase(), Phase::Waiting);
    state
}

#[test]
fn wait_slices_never_overshoot_idle_deadline() {
    let state = waiting_session();
    assert_eq!(state.next_wait(Duration::ZERO), Some(secs(15)));
    assert_eq!(state.next_wait(secs(10)), Some(secs(5)));
    assert_eq!(state.next_wait(secs(15)), Some(Duration::ZERO));
}

#[test]
fn idle_deadline_fires_exactly_not_earlier() {
    let state = waiting_session();

    let (state, effects) = update(
        state,
        Msg::SliceElapsed {
            at: secs(15) - Duration::from_millis(1),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Waiting);

    let (state, effects) = update(state, Msg::SliceElapsed { at: secs(15) });
    assert_eq!(state.phase(), Phase::Done(SessionOutcome::IdleTimeout));
    assert_eq!(effects.len(), 2);
    assert_eq!(effects[0], Effect::Unsubscribe);
    assert!(matches!(
        &effects[1],
        Effect::Finish(summary) if summary.outcome == SessionOutcome::IdleTimeout
    ));
}

#[test]
fn matching_edit_with_new_records_resets_idle_clock() {
    let state = waiting_session();
    let (state, effects) = update(
        state,
        Msg::EditReceived {
            source_id: MONITORED,
            page: Some(page(&[1, 2, 3])),
            at: secs(10),
        },
    );
    assert_eq!(state.phase(), Phase::ProcessingUpdate);
    let ids: Vec<u64> = match effects.as_slice() {
        [Effect::Persist { records }] => records.iter().map(Record::identifier).collect(),
        other => panic!("unexpected effects {other:?}"),
    };
    assert_eq!(ids, vec![2, 3]);

    let (state, effects) = update(
        state,
        Msg::Persisted {
            inserted: 2,
            inventory_total: 3,
            at: secs(10),
        },
    );
    assert_eq!(state.phase(), Phase::Waiting);
    assert_eq!(state.last_accepted_at(), secs(10));
    match effects.as_slice() {
        [Effect::Render(report)] => {
            assert_eq!(report.tracked, 4);
            assert_eq!(report.added, 3);
            assert_eq!(report.inventory_total, 3);
            assert_eq!(report.pages_seen, 2);
        }
        other => panic!("unexpected effects {other:?}"),
    }

    let (state, effects) = update(state, Msg::SliceElapsed { at: secs(20) });
    assert!(effects.is_empty());
    let (state, _) = update(state, Msg::SliceElapsed { at: secs(25) });
    assert_eq!(state.phase(), Phase::Done(SessionOutcome::IdleTimeout));
}

#[test]
fn repeated_page_renders_but_keeps_idle_clock() {
    let state = waiting_session();
    let (state, effects) = update(
        state,
        Msg::EditReceived {
            source_id: MONITORED,
            page: Some(page(&[1])),
            at: secs(5),
        },
    );
    assert_eq!(state.phase(), Phase::Waiting);
    assert!(matches!(effects.as_slice(), [Effect::Render(report)] if report.tracked == 2));
    assert_eq!(state.last_accepted_at(), Duration::ZERO);
    assert_eq!(state.records().len(), 1);
}

#[test]
fn foreign_or_empty_edits_are_ignored() {
    let state = waiting_session();
    let before = state.clone();

    let (state, effects) = update(
        state,
        Msg::EditReceived {
            source_id: MONITORED + 1,
            page: Some(page(&[7])),
            at: secs(3),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);

    let (state, effects) = update(
        state,
        Msg::EditReceived {
            source_id: MONITORED,
            page: None,
            at: secs(4),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state, before);
}

#[test]
fn steady_edits_are_cut_off_at_overall_deadline() {
    let mut state = waiting_session();
    let mut next_id = 10;
    let mut at = secs(10);
    loop {
        let (next, effects) = update(
            state,
            Msg::EditReceived {
                source_id: MONITORED,
                page: Some(page(&[next_id])),
                at,
            },
        );
        assert!(matches!(effects.as_slice(), [Effect::Persist { .. }]));
        let (next, effects) = update(
            next,
            Msg::Persisted {
                inserted: 1,
                inventory_total: next_id as usize,
                at,
            },
        );
        state = next;
        if state.phase().is_done() {
            assert_eq!(state.phase(), Phase::Done(SessionOutcome::OverallTimeout));
            assert!(effects.contains(&Effect::Unsubscribe));
            assert!(at >= secs(300));
            break;
        }
        assert!(at < secs(300));
        // Check the deadline between pages the way the driver does.
        assert_eq!(state.deadline_reached(at), None);
        next_id += 1;
        at += secs(10);
    }
}

#[test]
fn unbounded_idle_budget_leaves_only_the_overall_deadline() {
    let deadlines = Deadlines {
        idle: Duration::MAX,
        ..Deadlines::default()
    };
    let state = waiting_session_with(deadlines, secs(1));

    assert_eq!(state.next_wait(secs(1)), Some(secs(30)));
    assert_eq!(state.next_wait(secs(290)), Some(secs(10)));
    assert_eq!(state.deadline_reached(secs(299)), None);

    let (state, _) = update(state, Msg::SliceElapsed { at: secs(120) });
    assert_eq!(state.phase(), Phase::Waiting);
    let (state, _) = update(state, Msg::SliceElapsed { at: secs(300) });
    assert_eq!(state.phase(), Phase::Done(SessionOutcome::OverallTimeout));
}

#[test]
fn overall_deadline_wins_over_idle() {
    let state = waiting_session();
    assert_eq!(
        state.deadline_reached(secs(300)),
        Some(SessionOutcome::OverallTimeout)
    );
    let (state, _) = update(state, Msg::SliceElapsed { at: secs(301) });
    assert_eq!(state.phase(), Phase::Done(SessionOutcome::OverallTimeout));
}

#[test]
fn cancellation_unsubscribes_once() {
    let state = waiting_session();
    let (state, effects) = update(state, Msg::Cancelled);
    assert_eq!(state.phase(), Phase::Done(SessionOutcome::Cancelled));
    assert_eq!(effects[0], Effect::Unsubscribe);

    let (state, effects) = update(state, Msg::Cancelled);
    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Done(SessionOutcome::Cancelled));
}
