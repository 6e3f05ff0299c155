use super::{outcome, remove_all_markers, remove_line, rewrite, Driver, Outcome};
use crate::fields::eligible_fields;
use crate::planner::{plan_insertion, InsertionKind};
use crate::scanner;
use crate::synth::{synthesize_constructor, synthesize_logger_field, SLF4J_IMPORTS};
use crate::types::{SourceUnit, REQUIRED_ARGS_CONSTRUCTOR, SLF4J};

/// Marker → explicit code. Drops `@RequiredArgsConstructor` and `@Slf4j` with
/// their imports and writes out the constructor and logger field they stood for.
pub struct Expand;

impl Driver for Expand {
    fn name(&self) -> &'static str {
        "expand"
    }

    fn apply(&self, unit: &mut SourceUnit) -> Outcome {
        rewrite(unit, expand)
    }
}

fn expand(text: &mut String) -> Outcome {
    let scan = scanner::scan(text);
    let Some(class) = scan.class else {
        return Outcome::NotApplicable("no class declaration");
    };
    let wants_ctor = scan.markers.iter().any(|m| m.name == REQUIRED_ARGS_CONSTRUCTOR.name);
    let wants_logger = scan.markers.iter().any(|m| m.name == SLF4J.name);
    if !wants_ctor && !wants_logger {
        return Outcome::NotApplicable("no marker");
    }

    let before = text.clone();
    if wants_ctor {
        expand_constructor(text, &class.name);
    }
    if wants_logger {
        expand_logger(text, &class.name);
    }
    outcome(&before, text, "nothing to expand")
}

fn expand_constructor(text: &mut String, class_name: &str) {
    remove_all_markers(text, &REQUIRED_ARGS_CONSTRUCTOR);
    if let Some(import) = REQUIRED_ARGS_CONSTRUCTOR.import {
        remove_line(text, import);
    }

    let scan = scanner::scan(text);
    let fields = eligible_fields(&scan.fields);
    let Some(ctor) = synthesize_constructor(class_name, &fields) else {
        return;
    };
    if scanner::find_constructors(text, class_name).iter().any(|c| c.params == fields) {
        return;
    }
    if let Some(plan) = plan_insertion(text, InsertionKind::Constructor, &scan) {
        *text = plan.splice(text, &ctor);
    }
}

fn expand_logger(text: &mut String, class_name: &str) {
    remove_all_markers(text, &SLF4J);
    let insert_field = !scanner::declares_logger(text);

    let missing: Vec<&str> = if insert_field {
        SLF4J_IMPORTS
            .iter()
            .copied()
            .filter(|i| scanner::find_line(text.as_str(), i).is_none())
            .collect()
    } else {
        Vec::new()
    };
    let lombok_import = SLF4J.import.and_then(|i| scanner::find_line(text.as_str(), i));
    match lombok_import {
        Some(span) => {
            let replacement: String = missing.iter().map(|i| format!("{i}\n")).collect();
            text.replace_range(span.start..span.end, &replacement);
        }
        None if !missing.is_empty() => {
            let scan = scanner::scan(text);
            if let Some(plan) = plan_insertion(text, InsertionKind::Import, &scan) {
                *text = plan.splice(text, &missing.join("\n"));
            }
        }
        None => {}
    }

    if insert_field {
        let scan = scanner::scan(text);
        if let Some(plan) = plan_insertion(text, InsertionKind::LoggerField, &scan) {
            *text = plan.splice(text, &synthesize_logger_field(class_name));
        }
    }
}
