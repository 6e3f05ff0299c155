//! Shallow scanner over the slice of Java the drivers rewrite.
//!
//! Everything here is pattern matching over raw text, not parsing. Results come
//! back typed and position-tagged ([`ClassSignature`], [`FieldDeclaration`],
//! [`AnnotationMarker`], ...) so synthesis and planning never re-read raw text.
//! Every [`Span`] refers to the text passed in; rescan after each mutation.

use crate::fields::normalize_type;
use crate::types::*;
use regex::Regex;
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\bpublic\s+(?:(?:abstract|final|static|sealed|strictfp)\s+)*(?:class|interface)\s+(\w+)[^{;]*\{",
    )
    .expect("class pattern")
});

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"@({})\b", marker_alternation())).expect("marker pattern")
});

static GLUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"@({})(public|protected|private|abstract|final|class|interface)\b",
        marker_alternation()
    ))
    .expect("glue pattern")
});

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(?:@\w+(?:\([^)\n]*\))?[ \t]+)*((?:(?:public|protected|private|static|final|transient|volatile)[ \t]+)+)([\w$.?<>\[\],&\s]+?)\s+(\w+)[ \t]*;",
    )
    .expect("field pattern")
});

static LOGGER_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"private\s+static\s+final\s+(org\.slf4j\.)?Logger\s+log\s*=\s*(?:org\.slf4j\.)?LoggerFactory\s*\.\s*getLogger\s*\(\s*(\w+)\s*\.\s*class\s*\)\s*;",
    )
    .expect("logger field pattern")
});

static LOGGER_DECL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bLogger\s+log\b").expect("logger decl pattern"));

static LOG_USAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\blog\s*\.\s*(?:trace|debug|info|warn|error)\s*\(").expect("log usage pattern")
});

static SLF4J_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bLogger(?:Factory)?\b").expect("slf4j type pattern"));

static GENERATED_CTOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"@(?:AllArgsConstructor|NoArgsConstructor|Data|Builder|SuperBuilder)\b|import\s+lombok\.Value\s*;",
    )
    .expect("generated constructor pattern")
});

static CORRUPT_LOGGER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\s*private\s+static\s+final\s+(?:org\.slf4j\.)?Logger\s+log\s*=\s*(?:org\.slf4j\.)?LoggerFactory\s*\.\s*getLogger\s*\(\s*@(\w+)\s*\.\s*class\s*\)\s*;\s*(public\s+(?:(?:abstract|final)\s+)*(?:class|interface)\s+(\w+)[^{;]*\{)",
    )
    .expect("corrupt logger pattern")
});

static TOMBSTONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*//[ \t]*@(\w+)[ \t]+removed[ \t]*(?:\r?\n|$)").expect("tombstone pattern")
});

static PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*package\s+[\w.]+\s*;").expect("package pattern"));

static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*import\s").expect("import pattern"));

fn marker_alternation() -> String {
    MARKERS.iter().map(|m| m.name).collect::<Vec<_>>().join("|")
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything the planner needs from one text snapshot.
#[derive(Debug, Clone, Default)]
pub struct SourceScan {
    pub class: Option<ClassSignature>,
    pub fields: Vec<FieldDeclaration>,
    pub markers: Vec<AnnotationMarker>,
}

impl SourceScan {
    pub fn has_marker(&self, spec: &MarkerSpec) -> bool {
        self.markers.iter().any(|m| m.name == spec.name)
    }

    pub fn marker(&self, spec: &MarkerSpec) -> Option<&AnnotationMarker> {
        self.markers.iter().find(|m| m.name == spec.name)
    }
}

pub fn scan(text: &str) -> SourceScan {
    SourceScan {
        class: find_class_signature(text),
        fields: find_field_declarations(text),
        markers: find_markers(text),
    }
}

// ---------------------------------------------------------------------------
// Structural markers
// ---------------------------------------------------------------------------

/// Markers from the closed set, in source order. Commented-out tokens are skipped.
pub fn find_markers(text: &str) -> Vec<AnnotationMarker> {
    MARKER_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if is_commented(text, whole.start()) {
                return None;
            }
            let spec = marker_spec(caps.get(1)?.as_str())?;
            Some(AnnotationMarker { name: spec.name, kind: spec.kind, span: Span::of(&whole) })
        })
        .collect()
}

/// First public class or interface declaration. Later declarations are ignored.
pub fn find_class_signature(text: &str) -> Option<ClassSignature> {
    CLASS_RE.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        if is_commented(text, whole.start()) {
            return None;
        }
        Some(ClassSignature { name: caps[1].to_string(), span: Span::of(&whole) })
    })
}

/// `final` fields without an initializer, in declaration order. An access
/// modifier is required, which keeps `final` locals inside method bodies out.
/// The type may wrap across lines.
pub fn find_field_declarations(text: &str) -> Vec<FieldDeclaration> {
    FIELD_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let modifiers = caps.get(1)?;
            let ty = caps.get(2)?.as_str().trim();
            let words: Vec<&str> = modifiers.as_str().split_whitespace().collect();
            let has_access = words.iter().any(|w| matches!(*w, "public" | "protected" | "private"));
            if !has_access || !words.contains(&"final") || !is_type_like(ty) {
                return None;
            }
            Some(FieldDeclaration {
                modifiers: words.join(" "),
                ty: ty.to_string(),
                name: caps[3].to_string(),
                excluded: words.contains(&"static"),
                span: Span::new(modifiers.start(), caps.get(0)?.end()),
            })
        })
        .collect()
}

/// Rejects multi-variable declarations (`final int a, b;`) and other shapes the
/// field pattern over-matches.
fn is_type_like(ty: &str) -> bool {
    let Some(first) = ty.chars().next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_' || first == '$') {
        return false;
    }
    let mut depth: i32 = 0;
    for ch in ty.chars() {
        match ch {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            ',' if depth == 0 => return false,
            _ => {}
        }
    }
    depth == 0
}

// ---------------------------------------------------------------------------
// Logger fields
// ---------------------------------------------------------------------------

/// First explicit slf4j logger field bound to a real class.
pub fn find_logger_field(text: &str) -> Option<LoggerField> {
    LOGGER_FIELD_RE.captures_iter(text).find_map(|caps| {
        let whole = caps.get(0)?;
        if is_commented(text, whole.start()) {
            return None;
        }
        Some(LoggerField {
            bound_to: caps[2].to_string(),
            qualified: caps.get(1).is_some(),
            span: Span::of(&whole),
        })
    })
}

/// Any `Logger log` declaration, well-formed or not.
pub fn declares_logger(text: &str) -> bool {
    LOGGER_DECL_RE.is_match(text)
}

/// Calls like `log.info(...)`.
pub fn uses_logger(text: &str) -> bool {
    LOG_USAGE_RE.is_match(text)
}

/// `Logger` or `LoggerFactory` referenced anywhere outside their import lines.
pub fn references_slf4j_types(text: &str) -> bool {
    text.lines()
        .filter(|l| !l.trim_start().starts_with("import "))
        .any(|l| SLF4J_TYPE_RE.is_match(l))
}

// ---------------------------------------------------------------------------
// Constructors
// ---------------------------------------------------------------------------

/// Constructors declared for `class_name`, with bodies located by brace matching.
pub fn find_constructors(text: &str, class_name: &str) -> Vec<ConstructorDecl> {
    let pattern = format!(
        r"(?m)^[ \t]*(?:(?:public|protected|private)[ \t]+)?{}[ \t]*\(([^()]*)\)\s*(?:throws\s+[\w.,\s]+?)?\s*\{{",
        regex::escape(class_name)
    );
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    re.captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            if is_commented(text, whole.end() - 1) {
                return None;
            }
            let open = whole.end() - 1;
            let close = matching_brace(text, open)?;
            Some(ConstructorDecl {
                params: parse_params(&caps[1])?,
                body: text[open + 1..close].to_string(),
                annotated: previous_line(text, whole.start())
                    .is_some_and(|l| l.trim_start().starts_with('@')),
                span: Span::new(whole.start(), close + 1),
            })
        })
        .collect()
}

/// Some other Lombok annotation already generates a constructor.
pub fn has_generated_constructor(text: &str) -> bool {
    GENERATED_CTOR_RE.is_match(text)
}

/// Parameters as (normalized type, name). `None` when a parameter carries
/// annotations or otherwise does not look like `Type name`.
fn parse_params(raw: &str) -> Option<Vec<EligibleField>> {
    if raw.trim().is_empty() {
        return Some(Vec::new());
    }
    let mut params = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;
    let mut pieces = Vec::new();
    for (i, ch) in raw.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth -= 1,
            ',' if depth == 0 => {
                pieces.push(&raw[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&raw[start..]);

    for piece in pieces {
        let piece = piece.trim();
        let piece = piece.strip_prefix("final ").unwrap_or(piece).trim_start();
        if piece.starts_with('@') {
            return None;
        }
        let (ty, name) = piece.rsplit_once(char::is_whitespace)?;
        params.push(EligibleField::new(normalize_type(ty), name.trim()));
    }
    Some(params)
}

fn matching_brace(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in text.bytes().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Known corruption
// ---------------------------------------------------------------------------

/// A logger whose class argument is an `@Marker` token, placed in front of the
/// class declaration.
pub fn find_corruption_signature(text: &str) -> Option<CorruptionSignature> {
    let caps = CORRUPT_LOGGER_RE.captures(text)?;
    let whole = caps.get(0)?;
    let decl = caps.get(2)?;
    Some(CorruptionSignature {
        marker: caps[1].to_string(),
        class_name: caps[3].to_string(),
        class_decl: Span::of(&decl),
        span: Span::of(&whole),
    })
}

/// Whole-line spans of `// @Marker removed` comments left by older tooling.
pub fn find_tombstones(text: &str) -> Vec<Span> {
    TOMBSTONE_RE
        .captures_iter(text)
        .filter(|caps| {
            marker_spec(&caps[1]).is_some_and(|m| m.kind != MarkerKind::Role)
        })
        .filter_map(|caps| caps.get(0).map(|m| Span::of(&m)))
        .collect()
}

/// Marker tokens fused to the keyword that follows them (`@Servicepublic class`).
/// Each span covers the marker token only.
pub fn find_glued_markers(text: &str) -> Vec<Span> {
    GLUE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?;
            Some(Span::new(whole.start(), name.end()))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Header anchors
// ---------------------------------------------------------------------------

/// Offset just past the `package ...;` statement.
pub fn find_package_end(text: &str) -> Option<usize> {
    PACKAGE_RE.find(text).map(|m| m.end())
}

/// Line start of the first import.
pub fn find_first_import(text: &str) -> Option<usize> {
    IMPORT_RE.find(text).map(|m| line_start(text, m.start()))
}

/// Whole line (including its newline) whose trimmed content equals `line`.
pub fn find_line(text: &str, line: &str) -> Option<Span> {
    let mut offset = 0;
    for raw in text.split_inclusive('\n') {
        if raw.trim() == line {
            return Some(Span::new(offset, offset + raw.len()));
        }
        offset += raw.len();
    }
    None
}

// ---------------------------------------------------------------------------
// Line helpers
// ---------------------------------------------------------------------------

pub fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Offset just past the newline ending the line that contains `pos`.
pub fn line_end(text: &str, pos: usize) -> usize {
    text[pos..].find('\n').map(|i| pos + i + 1).unwrap_or(text.len())
}

fn previous_line(text: &str, pos: usize) -> Option<&str> {
    let start = line_start(text, pos);
    if start == 0 {
        return None;
    }
    text[..start - 1]
        .split('\n')
        .rev()
        .find(|l| !l.trim().is_empty())
}

fn is_commented(text: &str, pos: usize) -> bool {
    let prefix = &text[line_start(text, pos)..pos];
    let lead = prefix.trim_start();
    prefix.contains("//") || lead.starts_with('*') || lead.starts_with("/*")
}

/// Widens a member's span so removing it also removes its line break and at most
/// one blank line above it.
pub fn detach_span(text: &str, span: Span) -> Span {
    let bytes = text.as_bytes();
    let mut start = span.start;
    while start > 0 && matches!(bytes[start - 1], b' ' | b'\t') {
        start -= 1;
    }
    if start > 0 && bytes[start - 1] == b'\n' {
        start -= 1;
        if start > 0 && bytes[start - 1] == b'\r' {
            start -= 1;
        }
        let prev = line_start(text, start);
        if prev > 0 && text[prev..start].trim().is_empty() {
            start = prev - 1;
            if start > 0 && bytes[start - 1] == b'\r' {
                start -= 1;
            }
        }
    }
    Span::new(start, span.end)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = "package com.acme.billing;

import lombok.RequiredArgsConstructor;
import lombok.extern.slf4j.Slf4j;
import org.springframework.stereotype.Service;

@RequiredArgsConstructor
@Slf4j
@Service
public class InvoiceService extends BaseService implements Auditable {

    private static final int LIMIT = 10;
    private final InvoiceRepository repository;
    private final Map<String,   Long> totals;
    private final static Clock CLOCK;
    private final String region = \"eu\";

    public void run() {
        log.info(\"running\");
    }
}
";

    #[test]
    fn test_find_class_signature() {
        let sig = find_class_signature(SERVICE).unwrap();
        assert_eq!(sig.name, "InvoiceService");
        assert!(sig.span.slice(SERVICE).starts_with("public class InvoiceService"));
        assert!(sig.span.slice(SERVICE).ends_with('{'));
    }

    #[test]
    fn test_class_signature_first_match_wins() {
        let text = "public class First {\n}\npublic class Second {\n}\n";
        assert_eq!(find_class_signature(text).unwrap().name, "First");
    }

    #[test]
    fn test_no_class_signature_for_enums_and_records() {
        assert!(find_class_signature("public enum Status { OK }").is_none());
        assert!(find_class_signature("public record Point(int x, int y) {}").is_none());
    }

    #[test]
    fn test_find_markers_in_order() {
        let names: Vec<&str> = find_markers(SERVICE).iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["RequiredArgsConstructor", "Slf4j", "Service"]);
    }

    #[test]
    fn test_markers_ignore_comments_and_unknown_annotations() {
        let text = "// @Slf4j removed\n/**\n * @Service docs\n */\n@Override\n@ControllerAdvice\n@Component\n";
        let markers = find_markers(text);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].name, "Component");
        assert_eq!(markers[0].kind, MarkerKind::Role);
    }

    #[test]
    fn test_find_field_declarations() {
        let fields = find_field_declarations(SERVICE);
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        // LIMIT and region have initializers
        assert_eq!(names, vec!["repository", "totals", "CLOCK"]);
        assert_eq!(fields[1].ty, "Map<String,   Long>");
        assert!(!fields[0].excluded);
        assert!(fields[2].excluded, "final static must be flagged");
        assert!(fields[0].span.slice(SERVICE).starts_with("private final InvoiceRepository"));
        assert!(fields[0].span.slice(SERVICE).ends_with(';'));
    }

    #[test]
    fn test_fields_reject_multi_declarations() {
        assert!(find_field_declarations("    private final int a, b;\n").is_empty());
        assert!(find_field_declarations("    private String name;\n").is_empty());
    }

    #[test]
    fn test_final_locals_are_not_fields() {
        let text = "public class Router {\n    private final Repo repo;\n\n    public String pick(boolean a) {\n        final String label;\n        final int n;\n        if (a) {\n            label = \"a\";\n        } else {\n            label = \"b\";\n        }\n        return label;\n    }\n}\n";
        let names: Vec<String> = find_field_declarations(text).into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["repo"]);
    }

    #[test]
    fn test_package_private_final_is_not_a_field() {
        assert!(find_field_declarations("    final Repo repo;\n").is_empty());
        assert!(find_field_declarations("    static final Repo REPO;\n").is_empty());
    }

    #[test]
    fn test_generic_type_wrapping_lines() {
        let text = "    private final Map<String,\n            Long> totals;\n    private final Clock clock;\n";
        let fields = find_field_declarations(text);
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["totals", "clock"]);
        assert_eq!(normalize_type(&fields[0].ty), "Map<String, Long>");
    }

    #[test]
    fn test_annotated_field_is_found() {
        let fields = find_field_declarations("    @NonNull private final Clock clock;\n");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "clock");
    }

    #[test]
    fn test_find_logger_field() {
        let text = "    private static final org.slf4j.Logger log = org.slf4j.LoggerFactory.getLogger(Foo.class);";
        let field = find_logger_field(text).unwrap();
        assert_eq!(field.bound_to, "Foo");
        assert!(field.qualified);
        assert!(find_logger_field("private static final Logger log = LoggerFactory.getLogger(@Service.class);").is_none());
    }

    #[test]
    fn test_logger_usage_detection() {
        assert!(uses_logger("log.warn(\"x\");"));
        assert!(!uses_logger("catalog.info(\"x\");"));
        assert!(declares_logger("private static final Logger log = null;"));
    }

    #[test]
    fn test_slf4j_type_references_skip_imports() {
        let text = "import org.slf4j.Logger;\nimport org.slf4j.LoggerFactory;\nclass A {}\n";
        assert!(!references_slf4j_types(text));
        assert!(references_slf4j_types("import org.slf4j.Logger;\nclass A { Logger other; }"));
        assert!(!references_slf4j_types("class A { LoggerConfig c; }"));
    }

    #[test]
    fn test_generated_constructor_sources() {
        assert!(has_generated_constructor("@AllArgsConstructor\npublic class A {}"));
        assert!(has_generated_constructor("import lombok.Value;\n@Value\npublic class A {}"));
        assert!(!has_generated_constructor("@Value(\"${x}\") private String x;"));
    }

    #[test]
    fn test_find_constructors() {
        let text = "public class A {\n    private final B b;\n\n    public A(final B b) {\n        this.b = b;\n    }\n\n    A() {\n        this(null);\n    }\n}\n";
        let ctors = find_constructors(text, "A");
        assert_eq!(ctors.len(), 2);
        assert_eq!(ctors[0].params, vec![EligibleField::new("B", "b")]);
        assert_eq!(ctors[0].body.trim(), "this.b = b;");
        assert!(ctors[0].span.slice(text).trim_start().starts_with("public A("));
        assert!(ctors[1].params.is_empty());
        assert!(!ctors[0].annotated);
    }

    #[test]
    fn test_constructor_generic_params_split_at_top_level() {
        let text = "    public A(Map<String, Long> totals, List<B> items) {\n    }\n";
        let ctors = find_constructors(text, "A");
        assert_eq!(
            ctors[0].params,
            vec![EligibleField::new("Map<String, Long>", "totals"), EligibleField::new("List<B>", "items")]
        );
    }

    #[test]
    fn test_annotated_constructor_is_flagged() {
        let text = "    @Autowired\n    public A(B b) {\n        this.b = b;\n    }\n";
        assert!(find_constructors(text, "A")[0].annotated);
    }

    #[test]
    fn test_find_corruption_signature() {
        let text = "@Service\n\n    private static final org.slf4j.Logger log = org.slf4j.LoggerFactory.getLogger(@Service.class);\npublic class PaymentService implements Gateway {\n    void x() {}\n}\n";
        let sig = find_corruption_signature(text).unwrap();
        assert_eq!(sig.marker, "Service");
        assert_eq!(sig.class_name, "PaymentService");
        assert_eq!(sig.class_decl.slice(text), "public class PaymentService implements Gateway {");
        assert_eq!(sig.span.start, "@Service".len());
    }

    #[test]
    fn test_corruption_absent_in_well_formed_file() {
        assert!(find_corruption_signature(SERVICE).is_none());
    }

    #[test]
    fn test_find_tombstones() {
        let text = "// @Slf4j removed\n// @Service removed\n//   @RequiredArgsConstructor removed\nclass A {}\n";
        let spans = find_tombstones(text);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].slice(text), "// @Slf4j removed\n");
    }

    #[test]
    fn test_find_glued_markers() {
        let text = "@Servicepublic class A {}\n@Slf4j\npublic class B {}\n@Overridepublic void x() {}";
        let spans = find_glued_markers(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].slice(text), "@Service");
    }

    #[test]
    fn test_header_anchors() {
        assert_eq!(find_package_end(SERVICE), Some("package com.acme.billing;".len()));
        assert_eq!(find_first_import(SERVICE), Some("package com.acme.billing;\n\n".len()));
        let span = find_line(SERVICE, "import lombok.extern.slf4j.Slf4j;").unwrap();
        assert_eq!(span.slice(SERVICE), "import lombok.extern.slf4j.Slf4j;\n");
    }

    #[test]
    fn test_detach_span_takes_one_blank_line() {
        let text = "{\n\n    X;\n\n    Y;";
        let start = text.find('X').unwrap();
        let span = detach_span(text, Span::new(start, start + 2));
        let mut out = text.to_string();
        out.replace_range(span.start..span.end, "");
        assert_eq!(out, "{\n\n    Y;");

        let text = "{\n    X;\n    Y;";
        let start = text.find('X').unwrap();
        let span = detach_span(text, Span::new(start, start + 2));
        let mut out = text.to_string();
        out.replace_range(span.start..span.end, "");
        assert_eq!(out, "{\n    Y;");
    }
}
