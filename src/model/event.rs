//! Canonical event records extracted from the controller log.

use crate::model::{Location, PalletId};
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

// Kind label constants as written by the controller (after uppercasing).
const KIND_ARRIVAL: &str = "ARRIVAL";
const KIND_SETDEST: &str = "SETDEST";
const KIND_LOCEXIT: &str = "LOCEXIT";
const KIND_FAULT: &str = "FAULT";

/// Closed enumeration of event kinds.
///
/// Unrecognized labels are retained as [`EventKind::Other`] so they stay in
/// the full chronological stream, but they are excluded from per-kind
/// groupings and cause no state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Pallet arrived at a location (carries from/to of the completed move).
    Arrival,
    /// Controller assigned the pallet a new destination.
    SetDest,
    /// Pallet left a tracked location without a recorded arrival.
    LocExit,
    /// Controller fault report.
    Fault,
    /// Any other label, kept verbatim (already uppercased).
    Other(String),
}

impl EventKind {
    /// Maps an uppercased, period-stripped label to a kind.
    pub fn parse(label: &str) -> Self {
        match label {
            KIND_ARRIVAL => EventKind::Arrival,
            KIND_SETDEST => EventKind::SetDest,
            KIND_LOCEXIT => EventKind::LocExit,
            KIND_FAULT => EventKind::Fault,
            other => EventKind::Other(other.to_string()),
        }
    }

    /// The label as written by the controller.
    pub fn label(&self) -> &str {
        match self {
            EventKind::Arrival => KIND_ARRIVAL,
            EventKind::SetDest => KIND_SETDEST,
            EventKind::LocExit => KIND_LOCEXIT,
            EventKind::Fault => KIND_FAULT,
            EventKind::Other(label) => label,
        }
    }

    /// True when the label contains "FAULT" (covers composite labels such
    /// as "CONVFAULT" that the controller writes for subsystem faults).
    pub fn is_fault(&self) -> bool {
        self.label().contains(KIND_FAULT)
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// One canonical event from the log, immutable once constructed.
///
/// A record with no discoverable pallet id is still retained in the raw
/// chronological stream; it is only excluded from per-pallet views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    timestamp: Option<DateTime<Utc>>,
    kind: EventKind,
    from_location: Option<Location>,
    to_location: Option<Location>,
    pallet_id: Option<PalletId>,
}

impl EventRecord {
    /// Constructs an immutable record. Only the parser should call this.
    pub fn new(
        timestamp: Option<DateTime<Utc>>,
        kind: EventKind,
        from_location: Option<Location>,
        to_location: Option<Location>,
        pallet_id: Option<PalletId>,
    ) -> Self {
        Self {
            timestamp,
            kind,
            from_location,
            to_location,
            pallet_id,
        }
    }

    /// Parsed timestamp; `None` for the simple grammar, which carries none.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Event kind.
    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Source location, when the line carried one.
    pub fn from_location(&self) -> Option<&Location> {
        self.from_location.as_ref()
    }

    /// Destination location, when the line carried one.
    pub fn to_location(&self) -> Option<&Location> {
        self.to_location.as_ref()
    }

    /// Pallet identifier recovered from the raw line.
    pub fn pallet_id(&self) -> Option<&PalletId> {
        self.pallet_id.as_ref()
    }
}
