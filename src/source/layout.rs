//! Facility layout passthrough.
//!
//! The layout file is authored for the rendering frontend; this module
//! validates only the top-level shape (floors and edges arrays) and passes
//! the element values through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Facility layout as authored for the frontend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Floor descriptions, opaque to this service.
    pub floors: Vec<Value>,
    /// Conveyor edge descriptions, opaque to this service.
    pub edges: Vec<Value>,
}

/// Loads the layout file, substituting the empty layout on any failure.
///
/// A missing or malformed layout must not take the dashboard down; the
/// frontend renders an empty facility instead. Both failure modes are
/// logged at WARN so the operator can tell why the floor plan is blank.
pub fn load_layout(path: &Path) -> Layout {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(path = %path.display(), %err, "layout file unreadable, using empty layout");
            return Layout::default();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(layout) => layout,
        Err(err) => {
            warn!(path = %path.display(), %err, "layout file unparseable, using empty layout");
            Layout::default()
        }
    }
}
