//! Event stream builder: whole-log parse into an ordered record sequence.

use crate::model::EventRecord;
use crate::parser;
use tracing::debug;

/// The full ordered event sequence plus the derived fault subsequence.
///
/// Ordering follows file order for the simple grammar. When every retained
/// record carries a timestamp (the timestamped grammar), the stream is
/// explicitly timestamp-sorted instead, since that format's source writes
/// may not be line-ordered. A file mixing grammars keeps file order: a
/// record without a timestamp cannot be placed on the time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct EventStream {
    events: Vec<EventRecord>,
    faults: Vec<EventRecord>,
}

impl EventStream {
    /// Parses every line, skipping non-data lines silently.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut events = Vec::new();
        let mut skipped = 0usize;

        for line in lines {
            match parser::parse_line(line.as_ref()) {
                Some(record) => events.push(record),
                None => skipped += 1,
            }
        }

        if !events.is_empty() && events.iter().all(|e| e.timestamp().is_some()) {
            events.sort_by_key(|e| e.timestamp());
        }

        let faults: Vec<EventRecord> = events
            .iter()
            .filter(|e| e.kind().is_fault())
            .cloned()
            .collect();

        debug!(
            retained = events.len(),
            faults = faults.len(),
            skipped,
            "parsed log stream"
        );

        Self { events, faults }
    }

    /// Full ordered record sequence.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    /// Records whose kind label contains "FAULT", in stream order.
    pub fn faults(&self) -> &[EventRecord] {
        &self.faults
    }

    /// True when no data line survived parsing.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
