//! Line tokenizer and event extractor for the conveyor controller log.
//!
//! The log mixes two line grammars across controller firmware revisions:
//!
//! - **Simple**: fields separated by the period-pair delimiter, no
//!   timestamp. Fields are kept positionally (empty fields matter - the
//!   SETDEST destination sometimes lands one column further right).
//!   Example: `t1..ARRIVAL..LOC1..LOC2....11112222..`
//! - **Timestamped**: a `yy-mm-dd HH:MM:SS.fff` prefix, then the message
//!   payload after the first double space. Payload fields are split on the
//!   period-pair delimiter, stray periods stripped, empties discarded.
//!   Example: `08-12-25 08:25:42.818  ~PLC1WMS1...ARRIVAL..NOTIPOINT01..NOTIPOINT02....10000000...##`
//!
//! The grammar is probed per line by structural shape, never declared
//! globally. Tokenizing and extracting never panic: anything that cannot be
//! read as an event degrades to `None` ("not a data line"), including the
//! truncated final line a concurrent external writer can leave behind.

use crate::model::{EventKind, EventRecord, Location, PalletId};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Field separator used by both grammars.
const FIELD_DELIMITER: &str = "..";

/// Timestamp pattern of the timestamped grammar, e.g. `08-12-25 08:25:42.818`.
const TIMESTAMP_FORMAT: &str = "%y-%m-%d %H:%M:%S%.f";

/// Minimum field counts below which a line is not a data line.
const MIN_SIMPLE_FIELDS: usize = 2;
const MIN_TIMESTAMPED_FIELDS: usize = 3;

// Field positions shared by both grammars (field 0 is the system name).
const KIND_FIELD: usize = 1;
const FROM_FIELD: usize = 2;
const TO_FIELD: usize = 3;
const ALT_TO_FIELD: usize = 4;

/// Tokenized form of one data line, tagged with the grammar that matched.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenizedLine {
    /// Simple grammar: positional fields, empties retained.
    Simple {
        /// Whitespace-trimmed fields in line order.
        fields: Vec<String>,
    },
    /// Timestamped grammar: cleaned non-empty fields plus the parsed prefix.
    Timestamped {
        /// Parsed line timestamp.
        timestamp: DateTime<Utc>,
        /// Period-stripped, non-empty fields in line order.
        fields: Vec<String>,
    },
}

impl TokenizedLine {
    fn fields(&self) -> &[String] {
        match self {
            TokenizedLine::Simple { fields } => fields,
            TokenizedLine::Timestamped { fields, .. } => fields,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            TokenizedLine::Simple { .. } => None,
            TokenizedLine::Timestamped { timestamp, .. } => Some(*timestamp),
        }
    }
}

/// Splits one raw line into fields, or `None` for "not a data line".
///
/// A line whose first two whitespace tokens have the shape of the
/// timestamped grammar's prefix but fail to parse is dropped entirely: a
/// record without a trustworthy timestamp cannot be placed in the
/// travel-time or simulation timelines, so re-reading it under the simple
/// grammar would only manufacture a misfielded event.
pub fn tokenize(raw: &str) -> Option<TokenizedLine> {
    let line = raw.trim();
    if line.is_empty() {
        return None;
    }

    let mut words = line.split_whitespace();
    if let (Some(date), Some(time)) = (words.next(), words.next()) {
        if looks_like_log_date(date) {
            return tokenize_timestamped(line, date, time);
        }
    }

    tokenize_simple(line)
}

fn tokenize_simple(line: &str) -> Option<TokenizedLine> {
    let fields: Vec<String> = line
        .split(FIELD_DELIMITER)
        .map(|field| field.trim().to_string())
        .collect();

    if fields.len() < MIN_SIMPLE_FIELDS {
        return None;
    }

    Some(TokenizedLine::Simple { fields })
}

fn tokenize_timestamped(line: &str, date: &str, time: &str) -> Option<TokenizedLine> {
    let stamp = format!("{date} {time}");
    let timestamp = NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT)
        .ok()?
        .and_utc();

    // The message payload follows the first double space; when the writer
    // collapsed it, fall back to everything after the two prefix tokens.
    let payload = match line.split_once("  ") {
        Some((_, rest)) => rest.to_string(),
        None => line
            .split_whitespace()
            .skip(2)
            .collect::<Vec<_>>()
            .join(" "),
    };

    let fields: Vec<String> = payload
        .split(FIELD_DELIMITER)
        .map(|field| field.replace('.', "").trim().to_string())
        .filter(|field| !field.is_empty())
        .collect();

    if fields.len() < MIN_TIMESTAMPED_FIELDS {
        return None;
    }

    Some(TokenizedLine::Timestamped { timestamp, fields })
}

/// Shape probe for the timestamped grammar: `dd-dd-dd` exactly.
fn looks_like_log_date(token: &str) -> bool {
    let bytes = token.as_bytes();
    bytes.len() == 8
        && bytes[2] == b'-'
        && bytes[5] == b'-'
        && [0, 1, 3, 4, 6, 7]
            .iter()
            .all(|&i| bytes[i].is_ascii_digit())
}

/// Extracts the canonical event from a tokenized line.
///
/// The raw line is consulted independently of the token split for the
/// pallet identifier, since identifiers are not reliably isolated by the
/// primary delimiter. Returns `None` when the kind field is absent.
pub fn extract(tokens: &TokenizedLine, raw: &str) -> Option<EventRecord> {
    let fields = tokens.fields();

    let kind_label = fields
        .get(KIND_FIELD)
        .map(|f| f.trim_end_matches('.').to_uppercase())
        .filter(|label| !label.is_empty())?;
    let kind = EventKind::parse(&kind_label);

    let from_location = field_location(fields, FROM_FIELD);

    // In the timestamped grammar a purely numeric token at the destination
    // position is a pallet count, not a location.
    let reject_numeric = matches!(tokens, TokenizedLine::Timestamped { .. });
    let mut to_location = destination(fields, TO_FIELD, reject_numeric);

    // Format quirk: the SETDEST destination sometimes lands one column
    // further right, leaving the usual column empty.
    if kind == EventKind::SetDest && to_location.is_none() && fields.len() > ALT_TO_FIELD {
        to_location = destination(fields, ALT_TO_FIELD, reject_numeric);
    }

    let pallet_id = scan_pallet_id(raw);

    Some(EventRecord::new(
        tokens.timestamp(),
        kind,
        from_location,
        to_location,
        pallet_id,
    ))
}

/// Tokenizes and extracts in one step. `None` means "not a data line".
pub fn parse_line(raw: &str) -> Option<EventRecord> {
    let tokens = tokenize(raw)?;
    extract(&tokens, raw)
}

fn field_location(fields: &[String], index: usize) -> Option<Location> {
    fields.get(index).and_then(|f| Location::new(f).ok())
}

fn destination(fields: &[String], index: usize, reject_numeric: bool) -> Option<Location> {
    field_location(fields, index)
        .filter(|loc| !(reject_numeric && loc.as_str().bytes().all(|b| b.is_ascii_digit())))
}

/// Finds the first standalone eight-digit run in the raw line.
///
/// "Standalone" means a maximal digit run: `123456789` contains no pallet
/// id, which guards against false positives from weights and counts whose
/// digit runs have other lengths.
fn scan_pallet_id(raw: &str) -> Option<PalletId> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i - start == 8 {
                return PalletId::new(&raw[start..i]).ok();
            }
        } else {
            i += 1;
        }
    }
    None
}
