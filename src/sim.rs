//! Simulation clock: replays historical movements over virtual time.

use crate::model::{EventRecord, Location, PalletId};
use crate::stats::Edge;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Latest transit state of one pallet under the simulation.
///
/// `current_location` is set to the destination as soon as the movement
/// event is applied - optimistic rather than interpolated; a deliberate
/// simplification, not a bug.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PalletTransit {
    /// Pallet being moved.
    pub pallet_id: PalletId,
    /// Transit origin.
    pub moving_from: Location,
    /// Transit destination.
    pub moving_to: Location,
    /// Event time at which the move began.
    pub move_start: DateTime<Utc>,
    /// Forecast arrival: move start plus the edge's mean transit time.
    pub expected_arrival: DateTime<Utc>,
    /// Last known location (the destination, optimistically).
    pub current_location: Location,
}

/// Virtual clock value plus every pallet currently known to the replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSnapshot {
    /// Current virtual time.
    pub sim_time: DateTime<Utc>,
    /// Latest transit state per pallet, ordered by pallet id.
    pub pallets: Vec<PalletTransit>,
}

/// Time-stepped replay of the movement stream.
///
/// Holds a monotone cursor into the time-sorted stream; `advance` applies
/// every due event, and `snapshot` exposes the resulting per-pallet state.
/// The cursor never rewinds. This state is shared across all callers in
/// the process; a concurrent host must serialize `advance` + `snapshot`
/// behind a single lock, since cursor monotonicity is not safe under
/// concurrent mutation.
#[derive(Debug)]
pub struct Simulation {
    events: Vec<EventRecord>,
    travel_means: BTreeMap<Edge, f64>,
    default_travel: Duration,
    sim_time: DateTime<Utc>,
    cursor: usize,
    transits: BTreeMap<PalletId, PalletTransit>,
}

impl Simulation {
    /// Builds a replay over the movement events of the stream.
    ///
    /// Only records carrying a timestamp, a pallet id, and both locations
    /// define a transit; everything else is skipped here (the full stream
    /// stays available to the other views). Virtual time starts at the
    /// first movement's timestamp, or the Unix epoch for an empty stream.
    pub fn new(
        events: &[EventRecord],
        travel_means: BTreeMap<Edge, f64>,
        default_travel_seconds: f64,
    ) -> Self {
        let mut movements: Vec<EventRecord> = events
            .iter()
            .filter(|e| {
                e.timestamp().is_some()
                    && e.pallet_id().is_some()
                    && e.from_location().is_some()
                    && e.to_location().is_some()
            })
            .cloned()
            .collect();
        movements.sort_by_key(|e| e.timestamp());

        let sim_time = movements
            .first()
            .and_then(|e| e.timestamp())
            .unwrap_or(DateTime::UNIX_EPOCH);

        Self {
            events: movements,
            travel_means,
            default_travel: seconds_to_duration(default_travel_seconds),
            sim_time,
            cursor: 0,
            transits: BTreeMap::new(),
        }
    }

    /// Current virtual time.
    pub fn sim_time(&self) -> DateTime<Utc> {
        self.sim_time
    }

    /// Moves virtual time forward and applies every due event.
    ///
    /// A zero or negative delta still updates virtual time but applies
    /// nothing; the cursor never rewinds.
    pub fn advance(&mut self, delta: Duration) {
        self.sim_time += delta;
        if delta <= Duration::zero() {
            return;
        }

        while let Some(event) = self.events.get(self.cursor) {
            let Some(timestamp) = event.timestamp() else {
                break;
            };
            if timestamp > self.sim_time {
                break;
            }
            self.apply(event.clone(), timestamp);
            self.cursor += 1;
        }
    }

    /// Virtual time plus the latest per-pallet transit states, values only.
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            sim_time: self.sim_time,
            pallets: self.transits.values().cloned().collect(),
        }
    }

    /// Convenience used by the query surface: advance then snapshot.
    pub fn step(&mut self, delta: Duration) -> SimulationSnapshot {
        self.advance(delta);
        self.snapshot()
    }

    fn apply(&mut self, event: EventRecord, move_start: DateTime<Utc>) {
        // Construction filtered for these fields.
        let (Some(pallet_id), Some(from), Some(to)) = (
            event.pallet_id().cloned(),
            event.from_location().cloned(),
            event.to_location().cloned(),
        ) else {
            return;
        };

        let edge = Edge {
            from: from.clone(),
            to: to.clone(),
        };
        let travel = self
            .travel_means
            .get(&edge)
            .map(|&secs| seconds_to_duration(secs))
            .unwrap_or(self.default_travel);

        let transit = PalletTransit {
            pallet_id: pallet_id.clone(),
            moving_from: from,
            moving_to: to.clone(),
            move_start,
            expected_arrival: move_start + travel,
            current_location: to,
        };
        self.transits.insert(pallet_id, transit);
    }
}

fn seconds_to_duration(seconds: f64) -> Duration {
    Duration::milliseconds((seconds * 1000.0).round() as i64)
}
