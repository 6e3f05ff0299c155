//! Code synthesis. Pure functions of the extracted data: identical input gives
//! byte-identical output, which is what keeps expand and collapse inverse.

use crate::types::{EligibleField, INDENT};

/// Imports required by [`synthesize_logger_field`].
pub const SLF4J_IMPORTS: [&str; 2] = ["import org.slf4j.Logger;", "import org.slf4j.LoggerFactory;"];

/// Constructor taking every field in order and assigning it to the same-named
/// instance field. `None` for an empty field list: a zero-argument constructor
/// would silently change how the class is built.
pub fn synthesize_constructor(class_name: &str, fields: &[EligibleField]) -> Option<String> {
    if fields.is_empty() {
        return None;
    }
    let params: Vec<String> = fields.iter().map(|f| format!("{} {}", f.ty, f.name)).collect();
    let mut out = format!("{INDENT}public {class_name}({}) {{\n", params.join(", "));
    for f in fields {
        out.push_str(&format!("{INDENT}{INDENT}this.{0} = {0};\n", f.name));
    }
    out.push_str(INDENT);
    out.push('}');
    Some(out)
}

/// Logger field relying on [`SLF4J_IMPORTS`].
pub fn synthesize_logger_field(class_name: &str) -> String {
    format!("{INDENT}private static final Logger log = LoggerFactory.getLogger({class_name}.class);")
}

/// Logger field spelled with fully qualified names; needs no imports.
pub fn synthesize_qualified_logger_field(class_name: &str) -> String {
    format!(
        "{INDENT}private static final org.slf4j.Logger log = org.slf4j.LoggerFactory.getLogger({class_name}.class);"
    )
}

/// Body shape of a synthesized constructor, used to recognize one on the way back.
pub fn is_assignment_body(body: &str, fields: &[EligibleField]) -> bool {
    let statements: Vec<String> = body
        .split(';')
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|s| !s.is_empty())
        .collect();
    statements.len() == fields.len()
        && statements
            .iter()
            .zip(fields)
            .all(|(stmt, f)| *stmt == format!("this.{0} = {0}", f.name))
}
