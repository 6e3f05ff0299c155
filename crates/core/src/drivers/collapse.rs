use super::{outcome, remove_line, remove_span, rewrite, Driver, Outcome};
use crate::fields::eligible_fields;
use crate::planner::{plan_insertion, InsertionKind};
use crate::scanner;
use crate::synth::{is_assignment_body, SLF4J_IMPORTS};
use crate::types::{MarkerSpec, SourceUnit, REQUIRED_ARGS_CONSTRUCTOR, SLF4J};

/// Explicit code → marker. Removes a constructor or logger field that the
/// matching marker would generate and puts the marker and its import back.
///
/// Also reinstates markers whose generated code is evidently missing: a class
/// that calls `log.*` without declaring a logger, or one with uninitialized
/// final fields and no constructor at all.
pub struct Collapse;

impl Driver for Collapse {
    fn name(&self) -> &'static str {
        "collapse"
    }

    fn apply(&self, unit: &mut SourceUnit) -> Outcome {
        let stem = unit.stem.clone();
        rewrite(unit, |text| collapse(text, &stem))
    }
}

fn collapse(text: &mut String, stem: &str) -> Outcome {
    let scan = scanner::scan(text);
    let class_name = match &scan.class {
        Some(class) => class.name.clone(),
        None if !stem.is_empty() => stem.to_string(),
        None => return Outcome::NotApplicable("no class declaration"),
    };
    if plan_insertion(text, InsertionKind::ClassMarker, &scan).is_none() {
        return Outcome::NotApplicable("no anchor for class markers");
    }

    let before = text.clone();
    let mut reinstate: Vec<MarkerSpec> = Vec::new();

    let ctor_collapsed = collapse_constructor(text, &class_name);
    if ctor_collapsed && !scan.has_marker(&REQUIRED_ARGS_CONSTRUCTOR) {
        reinstate.push(REQUIRED_ARGS_CONSTRUCTOR);
    }

    let (logger_collapsed, import_slot) = collapse_logger(text, &class_name);
    if logger_collapsed && !scan.has_marker(&SLF4J) {
        reinstate.push(SLF4J);
    }

    if !reinstate.is_empty() {
        add_imports(text, &reinstate, import_slot);
        add_markers(text, &reinstate);
    }
    outcome(&before, text, "nothing to collapse")
}

/// Removes a constructor identical to the one `@RequiredArgsConstructor` would
/// generate. Returns whether the marker is called for.
fn collapse_constructor(text: &mut String, class_name: &str) -> bool {
    let fields = eligible_fields(&scanner::find_field_declarations(text));
    if fields.is_empty() {
        return false;
    }
    let ctors = scanner::find_constructors(text, class_name);
    let generated = ctors
        .iter()
        .find(|c| !c.annotated && c.params == fields && is_assignment_body(&c.body, &fields));
    match generated {
        Some(ctor) => {
            let span = scanner::detach_span(text, ctor.span);
            remove_span(text, span);
            true
        }
        None => ctors.is_empty() && !scanner::has_generated_constructor(text),
    }
}

/// Removes a logger field bound to this class, and its imports once nothing
/// else needs them. Returns whether `@Slf4j` is called for, plus where the
/// removed imports used to start.
fn collapse_logger(text: &mut String, class_name: &str) -> (bool, Option<usize>) {
    let field = scanner::find_logger_field(text).filter(|f| f.bound_to == class_name);
    let Some(field) = field else {
        let orphaned = scanner::uses_logger(text) && !scanner::declares_logger(text);
        return (orphaned, None);
    };

    let span = scanner::detach_span(text, field.span);
    remove_span(text, span);
    if field.qualified || scanner::references_slf4j_types(text) {
        return (true, None);
    }
    let slot = SLF4J_IMPORTS.iter().rev().filter_map(|i| remove_line(text, i)).min();
    (true, slot)
}

fn add_imports(text: &mut String, markers: &[MarkerSpec], slot: Option<usize>) {
    let lines: Vec<&str> = markers
        .iter()
        .filter_map(|m| m.import)
        .filter(|i| scanner::find_line(text.as_str(), i).is_none())
        .collect();
    if lines.is_empty() {
        return;
    }
    let block = lines.join("\n");
    match slot {
        Some(offset) => text.insert_str(offset, &format!("{block}\n")),
        None => {
            let scan = scanner::scan(text);
            if let Some(plan) = plan_insertion(text, InsertionKind::Import, &scan) {
                *text = plan.splice(text, &block);
            }
        }
    }
}

fn add_markers(text: &mut String, markers: &[MarkerSpec]) {
    let scan = scanner::scan(text);
    let block: Vec<String> =
        markers.iter().filter(|m| !scan.has_marker(m)).map(|m| m.token()).collect();
    if block.is_empty() {
        return;
    }
    if let Some(plan) = plan_insertion(text, InsertionKind::ClassMarker, &scan) {
        *text = plan.splice(text, &block.join("\n"));
    }
}
