//! Transformation drivers. Each one composes scanner, extractor, synthesizer
//! and planner into a whole-file rewrite.
//!
//! Drivers never fail. A file that lacks a driver's preconditions comes back
//! [`Outcome::NotApplicable`] with its text untouched, and running a driver on
//! its own output is a no-op.

mod collapse;
mod expand;
mod glue;
mod repair;

pub use collapse::Collapse;
pub use expand::Expand;
pub use glue::GlueFix;
pub use repair::Repair;

use crate::scanner;
use crate::types::{AnnotationMarker, LineEnding, MarkerSpec, SourceUnit, Span};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Changed,
    NotApplicable(&'static str),
}

impl Outcome {
    pub fn is_changed(self) -> bool {
        self == Self::Changed
    }
}

/// One direction of the transformation, applied to a single file.
pub trait Driver: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, unit: &mut SourceUnit) -> Outcome;
}

/// Selectable drivers, in the order a combined pass would run them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    Repair,
    GlueFix,
    Expand,
    Collapse,
}

impl DriverKind {
    pub fn driver(self) -> &'static dyn Driver {
        match self {
            Self::Repair => &Repair,
            Self::GlueFix => &GlueFix,
            Self::Expand => &Expand,
            Self::Collapse => &Collapse,
        }
    }
}

/// Compares before and after so a driver that rewrote text into itself does not
/// report a change.
fn outcome(before: &str, after: &str, reason: &'static str) -> Outcome {
    if before == after {
        Outcome::NotApplicable(reason)
    } else {
        Outcome::Changed
    }
}

/// Runs `edit` over `\n`-only text and puts the file's own line ending back on
/// the result. A file the edit leaves alone keeps its exact bytes.
fn rewrite(unit: &mut SourceUnit, edit: impl FnOnce(&mut String) -> Outcome) -> Outcome {
    if unit.line_ending == LineEnding::Lf {
        return edit(&mut unit.text);
    }
    let mut text = unit.text.replace("\r\n", "\n");
    let outcome = edit(&mut text);
    if outcome.is_changed() {
        unit.text = text.replace('\n', "\r\n");
    }
    outcome
}

// ---------------------------------------------------------------------------
// Text edits shared by the drivers
// ---------------------------------------------------------------------------

fn remove_span(text: &mut String, span: Span) {
    text.replace_range(span.start..span.end, "");
}

/// Removes the marker's whole line when the marker stands alone on it, otherwise
/// just the token and the blanks after it.
fn remove_marker(text: &mut String, marker: &AnnotationMarker) {
    let start = scanner::line_start(text, marker.span.start);
    let end = scanner::line_end(text, marker.span.start);
    if text[start..end].trim() == marker.span.slice(text) {
        text.replace_range(start..end, "");
        return;
    }
    let tail = text[marker.span.end..].len() - text[marker.span.end..].trim_start_matches([' ', '\t']).len();
    text.replace_range(marker.span.start..marker.span.end + tail, "");
}

/// Removes every occurrence of `spec`, rescanning after each edit.
fn remove_all_markers(text: &mut String, spec: &MarkerSpec) -> bool {
    let mut removed = false;
    while let Some(marker) = scanner::find_markers(text).into_iter().find(|m| m.name == spec.name) {
        remove_marker(text, &marker);
        removed = true;
    }
    removed
}

/// Removes the first whole line equal to `line`; returns where it started.
fn remove_line(text: &mut String, line: &str) -> Option<usize> {
    let span = scanner::find_line(text, line)?;
    remove_span(text, span);
    Some(span.start)
}
