//! Input sources: the controller log file and the facility layout file.

pub mod layout;

use crate::model::InputError;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Reads the log file and splits it into lines.
///
/// A missing file is not an error: the dashboard may start before the
/// controller has written anything, so an absent log yields an empty line
/// list and a WARN. Invalid UTF-8 is replaced rather than rejected, since
/// controller dumps occasionally contain stray bytes and one bad byte must
/// not discard the surrounding lines.
pub fn read_log_lines(path: &Path) -> Result<Vec<String>, InputError> {
    if !path.exists() {
        warn!(path = %path.display(), "log file not found, treating as empty");
        return Ok(Vec::new());
    }

    let bytes = fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.lines().map(str::to_string).collect())
}
