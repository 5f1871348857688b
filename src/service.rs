//! Query facade: ties the sources, parser, state fold, estimator and
//! simulation together behind the operations the dashboard asks for.
//!
//! Every query except the simulation re-reads and re-parses the log from
//! scratch. The log files involved are small enough that replay cost is
//! irrelevant, and statelessness means a restarted service gives the same
//! answers as one that has been up all along.

use crate::model::{EventKind, EventRecord, HistoryStep, InputError, PalletId, PalletState};
use crate::sim::{Simulation, SimulationSnapshot};
use crate::source::{self, layout::Layout};
use crate::state::{self, PalletStates};
use crate::stats::{self, Edge};
use crate::stream::EventStream;
use chrono::Duration;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// How many events each recent-activity bucket holds by default.
pub const DEFAULT_RECENT_COUNT: usize = 10;

/// Per-pallet states plus the roster picks, as one serializable report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatesReport {
    /// All pallet states keyed by pallet id.
    pub states: BTreeMap<PalletId, PalletState>,
    /// Head of the active roster, if any pallet is still inside.
    pub current: Option<PalletId>,
    /// Second pallet on the active roster.
    pub next: Option<PalletId>,
}

/// The most recent events per activity bucket, oldest first within each.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEvents {
    /// Latest arrivals at tracked locations.
    pub arrivals: Vec<EventRecord>,
    /// Latest destination assignments.
    pub setdests: Vec<EventRecord>,
    /// Latest system departures: location exits, plus any event touching
    /// an outbound point.
    pub exits: Vec<EventRecord>,
}

/// Service over one log file, one layout file and one simulation clock.
#[derive(Debug)]
pub struct ConveyorService {
    log_path: PathBuf,
    layout_path: PathBuf,
    default_travel_seconds: f64,
    sim: Option<Simulation>,
}

impl ConveyorService {
    /// Builds a service over the given input files.
    pub fn new(log_path: PathBuf, layout_path: PathBuf, default_travel_seconds: f64) -> Self {
        Self {
            log_path,
            layout_path,
            default_travel_seconds,
            sim: None,
        }
    }

    /// Reads and parses the whole log into an ordered event stream.
    pub fn parse_stream(&self) -> Result<EventStream, InputError> {
        let lines = source::read_log_lines(&self.log_path)?;
        Ok(EventStream::from_lines(lines))
    }

    /// Loads the facility layout, substituting the empty layout on failure.
    pub fn layout(&self) -> Layout {
        source::layout::load_layout(&self.layout_path)
    }

    /// Chronological 1-indexed history of one pallet, or `None` when the
    /// log never references the id.
    pub fn pallet_history(&self, id: &PalletId) -> Result<Option<Vec<HistoryStep>>, InputError> {
        let stream = self.parse_stream()?;
        Ok(state::pallet_history(stream.events(), id))
    }

    /// Folds the stream into per-pallet states plus the roster picks.
    pub fn pallet_states(&self) -> Result<StatesReport, InputError> {
        let stream = self.parse_stream()?;
        let states = state::fold_states(stream.events());
        Ok(report_from(&states))
    }

    /// Mean observed transit time per directed edge, keyed "FROM->TO".
    pub fn travel_times(&self) -> Result<BTreeMap<String, f64>, InputError> {
        let stream = self.parse_stream()?;
        let means = stats::travel_time_means(stream.events());
        Ok(means
            .into_iter()
            .map(|(edge, mean)| (edge.to_string(), mean))
            .collect())
    }

    /// The last `count` events of each activity bucket, in stream order.
    ///
    /// The exit bucket is broader than the LOCEXIT kind: any event whose
    /// source or destination is an outbound point counts as departure
    /// activity, so outbound arrivals show up here too.
    pub fn recent(&self, count: usize) -> Result<RecentEvents, InputError> {
        let stream = self.parse_stream()?;
        let events = stream.events();

        let arrivals = last_matching(events, count, |e| e.kind() == &EventKind::Arrival);
        let setdests = last_matching(events, count, |e| e.kind() == &EventKind::SetDest);
        let exits = last_matching(events, count, |e| {
            e.kind() == &EventKind::LocExit
                || e.from_location().is_some_and(|l| l.is_outbound())
                || e.to_location().is_some_and(|l| l.is_outbound())
        });

        Ok(RecentEvents {
            arrivals,
            setdests,
            exits,
        })
    }

    /// Advances the simulation clock and returns the resulting snapshot.
    ///
    /// The simulation is built lazily from the log as it stands on the
    /// first step and then persists across calls, so repeated steps walk
    /// forward through the recorded movements.
    pub fn step(&mut self, delta: Duration) -> Result<SimulationSnapshot, InputError> {
        let mut sim = match self.sim.take() {
            Some(sim) => sim,
            None => {
                let stream = self.parse_stream()?;
                let means: BTreeMap<Edge, f64> = stats::travel_time_means(stream.events());
                Simulation::new(stream.events(), means, self.default_travel_seconds)
            }
        };
        let snapshot = sim.step(delta);
        self.sim = Some(sim);
        Ok(snapshot)
    }
}

fn report_from(states: &PalletStates) -> StatesReport {
    StatesReport {
        states: states.states().clone(),
        current: states.current().cloned(),
        next: states.next().cloned(),
    }
}

fn last_matching<F>(events: &[EventRecord], count: usize, predicate: F) -> Vec<EventRecord>
where
    F: Fn(&EventRecord) -> bool,
{
    let matching: Vec<&EventRecord> = events.iter().filter(|e| predicate(e)).collect();
    let start = matching.len().saturating_sub(count);
    matching[start..].iter().map(|e| (*e).clone()).collect()
}
