//! Per-pallet state records derived from the event stream.

use crate::model::{EventKind, Location};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle status of a tracked pallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PalletStatus {
    /// Seen in the log but no movement event has classified it yet.
    Unknown,
    /// Last movement event was an arrival at a tracked location.
    Arrived,
    /// Controller assigned a destination; pallet is in transit.
    Moving,
    /// Pallet left the system (outbound point or location exit).
    Exited,
}

/// Current state of one pallet, rebuilt from scratch on every query by
/// folding its events in stream order.
///
/// `exited` is monotonic: once a pallet leaves the system, later events
/// still land in its raw history but never move it again.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PalletState {
    /// Lifecycle status.
    pub status: PalletStatus,
    /// Last known location, if any event carried one.
    pub current_location: Option<Location>,
    /// Destination from the most recent SETDEST, cleared on exit.
    pub next_destination: Option<Location>,
    /// True once the pallet has left the system; never reset.
    pub exited: bool,
    /// Timestamp of the first event referencing this pallet (ordering only;
    /// `None` for the simple grammar, which carries no timestamps).
    pub first_seen: Option<DateTime<Utc>>,
}

impl PalletState {
    /// State of a pallet just referenced for the first time.
    pub fn unknown(first_seen: Option<DateTime<Utc>>) -> Self {
        Self {
            status: PalletStatus::Unknown,
            current_location: None,
            next_destination: None,
            exited: false,
            first_seen,
        }
    }
}

/// One entry of a pallet's chronological history: the n-th event in the
/// log that referenced the pallet, 1-indexed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStep {
    /// 1-indexed position within this pallet's event sequence.
    pub step: usize,
    /// Event kind.
    pub kind: EventKind,
    /// Source location as recorded on the line.
    pub from: Option<Location>,
    /// Destination location as recorded on the line.
    pub to: Option<Location>,
}
