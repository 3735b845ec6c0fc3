//! Variadic, absence-skipping concatenation helpers.

use std::fmt::{self, Write};

use super::TrailError;

/// Joins the renderings of all non-absent items with `sep`.
///
/// The separator appears only between consecutive appended items, never
/// before the first or after the last, and never for skipped `None`s. Zero
/// non-absent items yield `""`. Total function with no failure modes; runs in
/// linear time and memory (single growing buffer, no quadratic
/// concatenation), so very large item counts are fine.
pub fn join<I, S>(sep: &str, items: I) -> String
where
    I: IntoIterator<Item = Option<S>>,
    S: fmt::Display,
{
    let mut out = String::new();
    for item in items {
        let Some(item) = item else { continue };
        if !out.is_empty() {
            out.push_str(sep);
        }
        // Writing into a String cannot fail.
        let _ = write!(out, "{item}");
    }
    out
}

/// Joins error values, aggregating trails and messages separately.
///
/// The result's trail is the `sep`-joined trails of all non-absent inputs and
/// its message the `sep`-joined messages, so both views of the aggregate stay
/// consistent with their parts. Returns `None` when every input is absent.
pub fn join_errors<I>(sep: &str, errors: I) -> Option<TrailError>
where
    I: IntoIterator<Item = Option<TrailError>>,
{
    use crate::error::HasTrail;

    let mut message = String::new();
    let mut trail = String::new();
    let mut any = false;
    for err in errors.into_iter().flatten() {
        if any {
            message.push_str(sep);
            trail.push_str(sep);
        }
        message.push_str(err.message());
        trail.push_str(err.trail());
        any = true;
    }
    if !any {
        return None;
    }
    Some(TrailError::from_parts(message, trail))
}
