//! Insertion planning: where a synthesized block goes.
//!
//! Each [`InsertionKind`] owns an ordered list of [`Anchor`] strategies. The first
//! strategy that can locate itself in the current snapshot wins; the rest are
//! fallbacks. There is no model of nested classes, so an inner class's fields
//! count as the outer class's.

use crate::scanner::{self, SourceScan};
use crate::types::MarkerKind;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionKind {
    Constructor,
    LoggerField,
    ClassMarker,
    Import,
}

impl InsertionKind {
    /// Strategies in priority order.
    pub fn strategies(self) -> &'static [Anchor] {
        match self {
            Self::Constructor => &[Anchor::AfterLastEligibleField, Anchor::AfterClassBrace],
            Self::LoggerField => &[Anchor::AfterClassBrace],
            Self::ClassMarker => &[Anchor::BeforeFirstRoleMarker, Anchor::BeforeClassDeclaration],
            Self::Import => {
                &[Anchor::BeforeFirstImport, Anchor::AfterPackageDeclaration, Anchor::FileStart]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Anchor {
    /// Past the `;` of the textually latest non-static eligible field.
    AfterLastEligibleField,
    /// Past the opening brace of the class declaration.
    AfterClassBrace,
    /// At the first role marker (`@Service`, ...) preceding the class declaration.
    BeforeFirstRoleMarker,
    BeforeClassDeclaration,
    BeforeFirstImport,
    AfterPackageDeclaration,
    FileStart,
}

impl Anchor {
    /// Offset of this anchor in the snapshot `scan` was taken from, or `None` when
    /// the anchor does not exist there.
    pub fn locate(self, text: &str, scan: &SourceScan) -> Option<usize> {
        match self {
            Self::AfterLastEligibleField => {
                scan.fields.iter().filter(|f| !f.excluded).map(|f| f.span.end).max()
            }
            Self::AfterClassBrace => scan.class.as_ref().map(|c| c.body_start()),
            Self::BeforeFirstRoleMarker => {
                let limit = scan.class.as_ref().map_or(usize::MAX, |c| c.span.start);
                scan.markers
                    .iter()
                    .filter(|m| m.kind == MarkerKind::Role && m.span.start < limit)
                    .map(|m| m.span.start)
                    .min()
            }
            Self::BeforeClassDeclaration => scan.class.as_ref().map(|c| c.span.start),
            Self::BeforeFirstImport => scanner::find_first_import(text),
            Self::AfterPackageDeclaration => scanner::find_package_end(text),
            Self::FileStart => Some(0),
        }
    }

    /// After-anchors open a new paragraph; before-anchors push existing text down a line.
    pub fn is_after(self) -> bool {
        matches!(self, Self::AfterLastEligibleField | Self::AfterClassBrace | Self::AfterPackageDeclaration)
    }
}

/// A resolved insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Insertion {
    pub anchor: Anchor,
    pub offset: usize,
}

impl Insertion {
    /// Returns `text` with `block` spliced in at this point.
    pub fn splice(&self, text: &str, block: &str) -> String {
        let (head, tail) = text.split_at(self.offset);
        let mut out = String::with_capacity(text.len() + block.len() + 2);
        out.push_str(head);
        if self.anchor.is_after() {
            out.push_str("\n\n");
            out.push_str(block);
        } else {
            out.push_str(block);
            out.push('\n');
        }
        out.push_str(tail);
        out
    }
}

/// First anchor of `kind` that resolves in `text`.
pub fn plan_insertion(text: &str, kind: InsertionKind, scan: &SourceScan) -> Option<Insertion> {
    kind.strategies()
        .iter()
        .find_map(|&anchor| anchor.locate(text, scan).map(|offset| Insertion { anchor, offset }))
}
