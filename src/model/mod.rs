//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod event;
pub mod identifiers;
pub mod pallet;

// Re-export for convenience
pub use error::InputError;
pub use event::{EventKind, EventRecord};
pub use identifiers::{InvalidLocation, InvalidPalletId, Location, PalletId};
pub use pallet::{HistoryStep, PalletState, PalletStatus};
