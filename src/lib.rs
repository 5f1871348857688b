//! palletrace
//!
//! Parses the delimiter-based event log written by a warehouse conveyor
//! controller and derives per-pallet movement history, per-pallet current
//! status, per-edge travel-time statistics, and a time-stepped replay of
//! pallet positions for a live dashboard.
//!
//! The web layer that serves these views is an external collaborator: it
//! calls into [`service::ConveyorService`] and receives plain, serializable
//! data structures back. Nothing in this crate performs network I/O.

pub mod config;
pub mod logging;
pub mod model;
pub mod parser;
pub mod service;
pub mod sim;
pub mod source;
pub mod state;
pub mod stats;
pub mod stream;
