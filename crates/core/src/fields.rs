//! Field extraction: which declared fields become constructor parameters.

use crate::types::{EligibleField, FieldDeclaration};
use std::collections::HashSet;

/// Collapse whitespace runs so `Map<String,   Long>` and `Map<String, Long>`
/// produce the same signature.
pub fn normalize_type(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Non-static fields in declaration order. Parameter and assignment order of a
/// synthesized constructor follow this list exactly.
///
/// A name seen twice (an inner class reusing a field name) is kept once, at its
/// first position, so the parameter list stays valid.
pub fn eligible_fields(fields: &[FieldDeclaration]) -> Vec<EligibleField> {
    let mut seen = HashSet::new();
    fields
        .iter()
        .filter(|f| !f.excluded)
        .filter(|f| seen.insert(f.name.as_str()))
        .map(|f| EligibleField::new(normalize_type(&f.ty), f.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::find_field_declarations;

    #[test]
    fn test_normalize_type() {
        assert_eq!(normalize_type("Map<String,   Long>"), "Map<String, Long>");
        assert_eq!(normalize_type(" List<\tFoo> "), "List< Foo>");
        assert_eq!(normalize_type("int[]"), "int[]");
    }

    #[test]
    fn test_eligible_fields_keep_declaration_order() {
        let text = "    private final String id;\n    private final Long amount;\n";
        let fields = eligible_fields(&find_field_declarations(text));
        assert_eq!(
            fields,
            vec![EligibleField::new("String", "id"), EligibleField::new("Long", "amount")]
        );
    }

    #[test]
    fn test_static_fields_are_excluded() {
        let text = "    private static final Clock CLOCK;\n    private final static Clock OTHER;\n    private final Clock clock;\n";
        let fields = eligible_fields(&find_field_declarations(text));
        assert_eq!(fields, vec![EligibleField::new("Clock", "clock")]);
    }

    #[test]
    fn test_whitespace_variants_synthesize_identically() {
        let a = eligible_fields(&find_field_declarations("private final Map<String,   Long> m;"));
        let b = eligible_fields(&find_field_declarations("private final Map<String, Long> m;"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_duplicate_names_kept_once() {
        let text = "    private final A value;\n    static class Inner {\n        private final B value;\n    }\n";
        let fields = eligible_fields(&find_field_declarations(text));
        assert_eq!(fields, vec![EligibleField::new("A", "value")]);
    }
}
