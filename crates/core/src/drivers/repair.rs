use super::{outcome, remove_span, rewrite, Driver, Outcome};
use crate::scanner;
use crate::synth::synthesize_qualified_logger_field;
use crate::types::SourceUnit;

/// Fixes the closed set of shapes earlier tooling is known to leave behind:
///
/// - a logger declared with an `@Marker.class` argument in front of the class
///   declaration, moved into the class body under the real class name;
/// - `// @Marker removed` tombstone comments, dropped.
pub struct Repair;

impl Driver for Repair {
    fn name(&self) -> &'static str {
        "repair"
    }

    fn apply(&self, unit: &mut SourceUnit) -> Outcome {
        rewrite(unit, |text| {
            let before = text.clone();
            relocate_misplaced_loggers(text);
            for span in scanner::find_tombstones(text).into_iter().rev() {
                remove_span(text, span);
            }
            outcome(&before, text, "no known corruption")
        })
    }
}

fn relocate_misplaced_loggers(text: &mut String) {
    while let Some(sig) = scanner::find_corruption_signature(text) {
        let decl = sig.class_decl.slice(text);
        let lead = if sig.span.start > 0 { "\n" } else { "" };
        // A body that already declares `log` keeps its own field.
        let replacement = if scanner::declares_logger(&text[sig.span.end..]) {
            format!("{lead}{decl}")
        } else {
            format!("{lead}{decl}\n{}", synthesize_qualified_logger_field(&sig.class_name))
        };
        text.replace_range(sig.span.start..sig.span.end, &replacement);
    }
}
