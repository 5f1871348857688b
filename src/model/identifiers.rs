//! Core identifier newtypes with smart constructors.
//!
//! Identifiers validate their shape at construction time.
//! Raw constructors are never exported - use smart constructors only.

use serde::Serialize;
use std::fmt;

/// Location-name prefix marking the system boundary: a pallet whose
/// destination starts with this prefix is leaving the tracked area.
pub const OUTBOUND_POINT_PREFIX: &str = "OUTPOINT";

/// Eight-digit pallet identifier stamped by the conveyor controller.
///
/// The controller writes pallet ids as standalone eight-digit runs; any
/// other digit run in a log line (weights, counts, timestamps) has a
/// different length, which is what makes the shape check a reliable guard.
/// NEVER export the constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PalletId(String);

impl PalletId {
    /// Smart constructor: requires exactly eight ASCII digits.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidPalletId> {
        let raw = raw.into();
        if raw.len() == 8 && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw))
        } else {
            Err(InvalidPalletId::NotEightDigits(raw))
        }
    }

    /// Returns the identifier as written in the log.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PalletId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Named conveyor location (notification point, station, outbound point).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Location(String);

impl Location {
    /// Smart constructor: validates non-empty location name.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidLocation> {
        let raw = raw.into();
        if raw.is_empty() {
            Err(InvalidLocation::Empty)
        } else {
            Ok(Self(raw))
        }
    }

    /// Returns the location name as written in the log.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when this location is an outbound point (system boundary).
    pub fn is_outbound(&self) -> bool {
        self.0.starts_with(OUTBOUND_POINT_PREFIX)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ===== Error Types =====

/// Rejection reason for a malformed pallet identifier.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvalidPalletId {
    /// The candidate was not exactly eight ASCII digits.
    #[error("Pallet id must be exactly eight digits, got '{0}'")]
    NotEightDigits(String),
}

/// Rejection reason for a malformed location name.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvalidLocation {
    /// Empty string.
    #[error("Location name cannot be empty")]
    Empty,
}

// ===== Tests =====
