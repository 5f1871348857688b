//! Travel-time estimator: mean transit duration per directed edge.

use crate::model::{EventKind, EventRecord, Location, PalletId};
use std::collections::BTreeMap;
use std::fmt;

/// Directed pair of locations between which transit time is measured.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    /// Transit origin.
    pub from: Location,
    /// Transit destination.
    pub to: Location,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// Computes, for each observed edge, the arithmetic mean of transit
/// durations (in seconds) across all pallets that traversed it.
///
/// Events are grouped by pallet and time-sorted within each group; each
/// consecutive pair contributes its elapsed seconds. Non-positive
/// durations are discarded (clock anomalies, duplicate timestamps). The
/// duration is attributed to the edge of the pair's arrival event - the
/// later one when both are arrivals (the arriving event's from/to, not
/// the departing one's) - so a pair with no arrival contributes nothing.
/// Edges with zero qualifying observations are absent from the mapping.
///
/// There is deliberately no outlier rejection: the mean is unweighted
/// over every qualifying observation. Known limitation, not a bug.
pub fn travel_time_means(events: &[EventRecord]) -> BTreeMap<Edge, f64> {
    let mut by_pallet: BTreeMap<&PalletId, Vec<&EventRecord>> = BTreeMap::new();
    for event in events {
        if event.timestamp().is_none() {
            continue;
        }
        if let Some(id) = event.pallet_id() {
            by_pallet.entry(id).or_default().push(event);
        }
    }

    let mut durations: BTreeMap<Edge, Vec<f64>> = BTreeMap::new();
    for group in by_pallet.values_mut() {
        group.sort_by_key(|e| e.timestamp());

        for pair in group.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            let (Some(start), Some(end)) = (prev.timestamp(), curr.timestamp()) else {
                continue;
            };
            let elapsed = (end - start).num_milliseconds() as f64 / 1000.0;
            if elapsed <= 0.0 {
                continue;
            }

            let Some(edge) = pair_edge(prev, curr) else {
                continue;
            };
            durations.entry(edge).or_default().push(elapsed);
        }
    }

    durations
        .into_iter()
        .map(|(edge, samples)| {
            let mean = samples.iter().sum::<f64>() / samples.len() as f64;
            (edge, mean)
        })
        .collect()
}

/// The edge a pair's duration measures: taken from the arrival event of
/// the pair, preferring the later one. Requires both locations.
fn pair_edge(prev: &EventRecord, curr: &EventRecord) -> Option<Edge> {
    let anchor = if curr.kind() == &EventKind::Arrival {
        curr
    } else if prev.kind() == &EventKind::Arrival {
        prev
    } else {
        return None;
    };

    Some(Edge {
        from: anchor.from_location()?.clone(),
        to: anchor.to_location()?.clone(),
    })
}
