//! Grounding-context assembly from ranked matches.

use crate::models::{render_row, Match};

/// Render matches as one `"col: value, ..."` line each, best match first.
///
/// An empty slice yields an empty string; callers should skip answer
/// generation in that case.
pub fn assemble(matches: &[Match]) -> String {
    matches
        .iter()
        .map(|m| render_row(&m.row_data))
        .collect::<Vec<_>>()
        .join("\n")
}
