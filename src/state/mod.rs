//! Entity state machine: folds the event stream into per-pallet state.

use crate::model::{EventKind, EventRecord, HistoryStep, PalletId, PalletState, PalletStatus};
use std::collections::BTreeMap;

/// Per-pallet state derived by folding the stream in order, plus the
/// first-appearance ordering used for the active roster.
///
/// State is rebuilt from scratch on every query (the log is replayed
/// wholesale), so nothing here is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PalletStates {
    states: BTreeMap<PalletId, PalletState>,
    order: Vec<PalletId>,
}

impl PalletStates {
    /// State of one pallet, if it has ever been referenced.
    pub fn get(&self, id: &PalletId) -> Option<&PalletState> {
        self.states.get(id)
    }

    /// All pallet states, keyed by id.
    pub fn states(&self) -> &BTreeMap<PalletId, PalletState> {
        &self.states
    }

    /// Pallets still inside the system, ordered by first appearance.
    pub fn active_roster(&self) -> Vec<&PalletId> {
        self.order
            .iter()
            .filter(|id| self.states.get(id).is_some_and(|s| !s.exited))
            .collect()
    }

    /// The pallet the dashboard highlights first: head of the active roster.
    pub fn current(&self) -> Option<&PalletId> {
        self.active_roster().first().copied()
    }

    /// The second pallet of interest on the active roster.
    pub fn next(&self) -> Option<&PalletId> {
        self.active_roster().get(1).copied()
    }
}

/// Folds the stream left-to-right, grouped implicitly by pallet id.
///
/// Records without a pallet id contribute nothing here; they remain in the
/// raw chronological stream only. Once a pallet has exited, later events
/// are recorded in its raw history but no longer move it.
pub fn fold_states(events: &[EventRecord]) -> PalletStates {
    let mut states: BTreeMap<PalletId, PalletState> = BTreeMap::new();
    let mut order: Vec<PalletId> = Vec::new();

    for event in events {
        let Some(id) = event.pallet_id() else {
            continue;
        };

        let state = states.entry(id.clone()).or_insert_with(|| {
            order.push(id.clone());
            PalletState::unknown(event.timestamp())
        });

        if state.exited {
            continue;
        }

        let from = event.from_location().cloned();
        let to = event.to_location().cloned();

        match event.kind() {
            EventKind::SetDest => {
                state.status = PalletStatus::Moving;
                if from.is_some() {
                    state.current_location = from;
                }
                // An empty destination clears rather than preserves.
                state.next_destination = to;
            }
            EventKind::Arrival if to.as_ref().is_some_and(|t| t.is_outbound()) => {
                state.status = PalletStatus::Exited;
                state.current_location = to;
                state.next_destination = None;
                state.exited = true;
            }
            EventKind::Arrival => {
                state.status = PalletStatus::Arrived;
                if let Some(loc) = to.or(from) {
                    state.current_location = Some(loc);
                }
            }
            EventKind::LocExit => {
                state.status = PalletStatus::Exited;
                state.current_location = from;
                state.next_destination = None;
                state.exited = true;
            }
            EventKind::Fault | EventKind::Other(_) => {}
        }
    }

    PalletStates { states, order }
}

/// Chronological history of one pallet as 1-indexed steps, or `None` when
/// no event references the id (distinguishing "unknown pallet" from a
/// pallet that exists but has no current destination).
pub fn pallet_history(events: &[EventRecord], id: &PalletId) -> Option<Vec<HistoryStep>> {
    let steps: Vec<HistoryStep> = events
        .iter()
        .filter(|e| e.pallet_id() == Some(id))
        .enumerate()
        .map(|(i, e)| HistoryStep {
            step: i + 1,
            kind: e.kind().clone(),
            from: e.from_location().cloned(),
            to: e.to_location().cloned(),
        })
        .collect();

    if steps.is_empty() {
        None
    } else {
        Some(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventKind;
    use crate::stream::EventStream;

    fn fold(lines: &[&str]) -> PalletStates {
        fold_states(EventStream::from_lines(lines).events())
    }

    fn id(raw: &str) -> PalletId {
        PalletId::new(raw).expect("valid pallet id")
    }

    // ===== Transitions =====

    #[test]
    fn setdest_marks_moving_and_sets_destination() {
        let states = fold(&["SYS..SETDEST..LOC2..LOC3....11112222.."]);
        let state = states.get(&id("11112222")).expect("tracked pallet");
        assert_eq!(state.status, PalletStatus::Moving);
        assert_eq!(state.current_location.as_ref().map(|l| l.as_str()), Some("LOC2"));
        assert_eq!(state.next_destination.as_ref().map(|l| l.as_str()), Some("LOC3"));
    }

    #[test]
    fn setdest_without_source_keeps_current_location() {
        let states = fold(&[
            "SYS..ARRIVAL..LOC1..LOC2....11112222..",
            "SYS..SETDEST........11112222",
        ]);
        let state = states.get(&id("11112222")).expect("tracked pallet");
        assert_eq!(
            state.current_location.as_ref().map(|l| l.as_str()),
            Some("LOC2"),
            "Empty SETDEST source leaves location unchanged"
        );
    }

    #[test]
    fn setdest_with_empty_destination_clears_it() {
        let states = fold(&[
            "SYS..SETDEST..LOC2..LOC3....11112222..",
            "SYS..SETDEST..LOC3......11112222",
        ]);
        let state = states.get(&id("11112222")).expect("tracked pallet");
        assert_eq!(state.status, PalletStatus::Moving);
        assert!(
            state.next_destination.is_none(),
            "Empty destination clears rather than preserves"
        );
    }

    #[test]
    fn arrival_sets_arrived_at_destination() {
        let states = fold(&["SYS..ARRIVAL..LOC1..LOC2....11112222.."]);
        let state = states.get(&id("11112222")).expect("tracked pallet");
        assert_eq!(state.status, PalletStatus::Arrived);
        assert_eq!(state.current_location.as_ref().map(|l| l.as_str()), Some("LOC2"));
        assert!(!state.exited);
    }

    #[test]
    fn arrival_without_destination_falls_back_to_source() {
        let states = fold(&["SYS..ARRIVAL..LOC1......11112222.."]);
        let state = states.get(&id("11112222")).expect("tracked pallet");
        assert_eq!(
            state.current_location.as_ref().map(|l| l.as_str()),
            Some("LOC1"),
            "Missing arrival destination falls back to the source location"
        );
    }

    #[test]
    fn arrival_at_outbound_point_exits() {
        let states = fold(&[
            "SYS..SETDEST..LOC3..OUTPOINT1....11112222..",
            "SYS..ARRIVAL..LOC3..OUTPOINT1....11112222..",
        ]);
        let state = states.get(&id("11112222")).expect("tracked pallet");
        assert_eq!(state.status, PalletStatus::Exited);
        assert!(state.exited);
        assert_eq!(
            state.current_location.as_ref().map(|l| l.as_str()),
            Some("OUTPOINT1")
        );
        assert!(state.next_destination.is_none(), "Exit clears destination");
    }

    #[test]
    fn locexit_exits_at_source_location() {
        let states = fold(&["SYS..LOCEXIT..LOC4......11112222.."]);
        let state = states.get(&id("11112222")).expect("tracked pallet");
        assert_eq!(state.status, PalletStatus::Exited);
        assert!(state.exited);
        assert_eq!(state.current_location.as_ref().map(|l| l.as_str()), Some("LOC4"));
    }

    #[test]
    fn fault_and_unknown_kinds_cause_no_transition() {
        let states = fold(&[
            "SYS..ARRIVAL..LOC1..LOC2....11112222..",
            "SYS..FAULT..LOC2......11112222..",
            "SYS..TELEGRAM..LOC9......11112222..",
        ]);
        let state = states.get(&id("11112222")).expect("tracked pallet");
        assert_eq!(state.status, PalletStatus::Arrived);
        assert_eq!(state.current_location.as_ref().map(|l| l.as_str()), Some("LOC2"));
    }

    #[test]
    fn fault_only_pallet_stays_unknown() {
        let states = fold(&["SYS..FAULT..LOC1......11112222.."]);
        let state = states.get(&id("11112222")).expect("tracked pallet");
        assert_eq!(
            state.status,
            PalletStatus::Unknown,
            "No movement event has classified this pallet yet"
        );
    }

    // ===== Exit monotonicity =====

    #[test]
    fn exited_flag_is_monotonic() {
        let states = fold(&[
            "SYS..ARRIVAL..LOC3..OUTPOINT1....11112222..",
            "SYS..ARRIVAL..LOC1..LOC2....11112222..",
            "SYS..SETDEST..LOC2..LOC3....11112222..",
        ]);
        let state = states.get(&id("11112222")).expect("tracked pallet");
        assert!(state.exited, "Exit is terminal");
        assert_eq!(state.status, PalletStatus::Exited);
        assert_eq!(
            state.current_location.as_ref().map(|l| l.as_str()),
            Some("OUTPOINT1"),
            "Later events never move an exited pallet"
        );
    }

    // ===== Roster / current / next =====

    #[test]
    fn roster_orders_by_first_appearance() {
        let states = fold(&[
            "SYS..ARRIVAL..LOC1..LOC2....22220000..",
            "SYS..ARRIVAL..LOC1..LOC2....11110000..",
            "SYS..ARRIVAL..LOC2..LOC3....22220000..",
        ]);
        let roster = states.active_roster();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].as_str(), "22220000");
        assert_eq!(roster[1].as_str(), "11110000");
        assert_eq!(states.current().map(|p| p.as_str()), Some("22220000"));
        assert_eq!(states.next().map(|p| p.as_str()), Some("11110000"));
    }

    #[test]
    fn exited_pallets_leave_the_roster() {
        let states = fold(&[
            "SYS..ARRIVAL..LOC1..LOC2....22220000..",
            "SYS..ARRIVAL..LOC1..LOC2....11110000..",
            "SYS..LOCEXIT..LOC2......22220000..",
        ]);
        assert_eq!(states.current().map(|p| p.as_str()), Some("11110000"));
        assert_eq!(states.next(), None);
    }

    #[test]
    fn records_without_pallet_id_are_excluded_from_states() {
        let states = fold(&["SYS..ARRIVAL..LOC1..LOC2"]);
        assert!(states.states().is_empty());
        assert_eq!(states.current(), None);
    }

    // ===== History =====

    #[test]
    fn history_numbers_steps_from_one() {
        let stream = EventStream::from_lines([
            "SYS..ARRIVAL..LOC1..LOC2....11112222..",
            "SYS..ARRIVAL..LOC1..LOC2....99990000..",
            "SYS..SETDEST..LOC2..LOC3....11112222..",
        ]);
        let history =
            pallet_history(stream.events(), &id("11112222")).expect("pallet has history");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].step, 1);
        assert_eq!(history[0].kind, EventKind::Arrival);
        assert_eq!(history[1].step, 2);
        assert_eq!(history[1].kind, EventKind::SetDest);
        assert_eq!(history[1].to.as_ref().map(|l| l.as_str()), Some("LOC3"));
    }

    #[test]
    fn history_includes_events_after_exit() {
        let stream = EventStream::from_lines([
            "SYS..LOCEXIT..LOC2......11112222..",
            "SYS..ARRIVAL..LOC1..LOC2....11112222..",
        ]);
        let history =
            pallet_history(stream.events(), &id("11112222")).expect("pallet has history");
        assert_eq!(
            history.len(),
            2,
            "Raw history keeps growing after the pallet exits"
        );
    }

    #[test]
    fn history_for_unknown_pallet_is_none() {
        let stream = EventStream::from_lines(["SYS..ARRIVAL..LOC1..LOC2....11112222.."]);
        assert!(pallet_history(stream.events(), &id("00000000")).is_none());
    }
}
