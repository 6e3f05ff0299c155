use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Extensions walked when `.jfold.toml` does not override them.
pub const DEFAULT_EXTENSIONS: &[&str] = &["java"];

/// Indentation unit used by every synthesized block.
pub const INDENT: &str = "    ";

// ---------------------------------------------------------------------------
// Walk configuration
// ---------------------------------------------------------------------------

/// Runtime configuration for the file walker. Loaded from `.jfold.toml` or defaults.
///
/// Only discovery is configurable; the marker set and the insertion heuristics are
/// fixed constants of the core.
#[derive(Clone, Debug)]
pub struct WalkConfig {
    pub root: PathBuf,
    /// Directories to walk (relative to root). Empty = walk root itself.
    pub scan_dirs: Vec<String>,
    /// Directory names to skip during walk.
    pub skip_dirs: HashSet<String>,
    /// File extensions to transform.
    pub extensions: HashSet<String>,
}

impl WalkConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            scan_dirs: Vec::new(),
            skip_dirs: [".git", "target", "build", "out", ".gradle", ".idea", "node_modules"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("."))
    }
}

// ---------------------------------------------------------------------------
// Spans
// ---------------------------------------------------------------------------

/// Byte range into one text snapshot. Invalid as soon as that text is mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn of(m: &regex::Match<'_>) -> Self {
        Self::new(m.start(), m.end())
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

// ---------------------------------------------------------------------------
// Marker set
// ---------------------------------------------------------------------------

/// The three families of class-level markers the core recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    /// Constructor injection (`@RequiredArgsConstructor`).
    Injection,
    /// Cross-cutting logging (`@Slf4j`).
    Logging,
    /// Structural role (`@Service`, `@Component`, ...). Never expanded, only used as an anchor.
    Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSpec {
    pub name: &'static str,
    pub kind: MarkerKind,
    /// Import line that brings the marker into scope, when it needs one.
    pub import: Option<&'static str>,
}

impl MarkerSpec {
    /// Source token, e.g. `@Slf4j`.
    pub fn token(&self) -> String {
        format!("@{}", self.name)
    }
}

pub const REQUIRED_ARGS_CONSTRUCTOR: MarkerSpec = MarkerSpec {
    name: "RequiredArgsConstructor",
    kind: MarkerKind::Injection,
    import: Some("import lombok.RequiredArgsConstructor;"),
};

pub const SLF4J: MarkerSpec = MarkerSpec {
    name: "Slf4j",
    kind: MarkerKind::Logging,
    import: Some("import lombok.extern.slf4j.Slf4j;"),
};

const fn role(name: &'static str) -> MarkerSpec {
    MarkerSpec { name, kind: MarkerKind::Role, import: None }
}

/// Closed marker set. Anything else starting with `@` is ignored.
pub const MARKERS: &[MarkerSpec] = &[
    REQUIRED_ARGS_CONSTRUCTOR,
    SLF4J,
    role("Service"),
    role("RestController"),
    role("Controller"),
    role("Component"),
    role("Repository"),
    role("Configuration"),
];

pub fn marker_spec(name: &str) -> Option<&'static MarkerSpec> {
    MARKERS.iter().find(|m| m.name == name)
}

// ---------------------------------------------------------------------------
// Scanner results
// ---------------------------------------------------------------------------

/// A recognized marker token and where it sits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationMarker {
    pub name: &'static str,
    pub kind: MarkerKind,
    /// Covers the `@` and the name, nothing else.
    pub span: Span,
}

/// The first public class or interface declaration of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassSignature {
    pub name: String,
    /// From the `public` keyword through the opening brace.
    pub span: Span,
}

impl ClassSignature {
    /// Offset just past the opening brace.
    pub fn body_start(&self) -> usize {
        self.span.end
    }
}

/// A `final` field declared without an initializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDeclaration {
    pub modifiers: String,
    /// Type text exactly as written.
    pub ty: String,
    pub name: String,
    /// `static` appears among the modifiers.
    pub excluded: bool,
    /// From the first modifier through the terminating `;`.
    pub span: Span,
}

/// A field eligible to become a constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibleField {
    /// Whitespace-normalized type.
    pub ty: String,
    pub name: String,
}

impl EligibleField {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self { ty: ty.into(), name: name.into() }
    }
}

/// An explicit `Logger log = LoggerFactory.getLogger(X.class)` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggerField {
    /// Class named in the `getLogger` argument.
    pub bound_to: String,
    /// Written with `org.slf4j.` prefixes instead of imports.
    pub qualified: bool,
    pub span: Span,
}

/// A constructor of the scanned class, as far as a shallow scan can tell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDecl {
    pub params: Vec<EligibleField>,
    /// Text between the braces.
    pub body: String,
    /// The line above starts with an annotation.
    pub annotated: bool,
    /// From the start of the declaration line through the closing brace.
    pub span: Span,
}

/// A logger field whose class argument is an unresolved marker token, sitting in
/// front of the class declaration instead of inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorruptionSignature {
    /// The marker used as the class argument, e.g. `Service` for `@Service.class`.
    pub marker: String,
    /// Real class name recovered from the declaration that follows.
    pub class_name: String,
    /// Class declaration through its opening brace.
    pub class_decl: Span,
    /// Misplaced logger line plus surrounding whitespace, through the class brace.
    pub span: Span,
}

// ---------------------------------------------------------------------------
// Source unit
// ---------------------------------------------------------------------------

/// Line terminator of a file. Drivers edit `\n`-only text and write this back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    Crlf,
}

impl LineEnding {
    /// `Crlf` as soon as one `\r\n` appears.
    pub fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::Crlf
        } else {
            Self::Lf
        }
    }
}

/// One file's text, mutated in place by drivers; `original` is kept to decide
/// whether anything needs to be written back.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub path: PathBuf,
    /// File stem, used as the class name when no declaration is found.
    pub stem: String,
    pub line_ending: LineEnding,
    pub original: String,
    pub text: String,
}

impl SourceUnit {
    pub fn new(path: impl AsRef<Path>, text: String) -> Self {
        let path = path.as_ref().to_path_buf();
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default().to_string();
        let line_ending = LineEnding::detect(&text);
        Self { path, stem, line_ending, original: text.clone(), text }
    }

    pub fn is_changed(&self) -> bool {
        self.text != self.original
    }
}
