use super::{outcome, rewrite, Driver, Outcome};
use crate::scanner;
use crate::types::SourceUnit;

/// Splits a marker fused to the keyword after it (`@Servicepublic class`) back
/// onto two lines.
pub struct GlueFix;

impl Driver for GlueFix {
    fn name(&self) -> &'static str {
        "fix-glue"
    }

    fn apply(&self, unit: &mut SourceUnit) -> Outcome {
        rewrite(unit, |text| {
            let before = text.clone();
            for span in scanner::find_glued_markers(text).into_iter().rev() {
                text.insert(span.end, '\n');
            }
            outcome(&before, text, "no glued marker")
        })
    }
}
