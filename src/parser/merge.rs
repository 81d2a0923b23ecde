//! Partial merge: combine `partial` declarations into logical types.
//!
//! The extractor emits every `partial class Foo` as its own record. This
//! layer groups them by kind and name across all files, so renderers can
//! show one entry per type with all the places it is defined.

use crate::model::*;
use serde::Serialize;
use std::collections::HashMap;

/// Where one part of a type is declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypePart {
    pub file: String,
    pub line: usize,
}

/// A logical type after merging partial declarations.
#[derive(Debug, Clone, Serialize)]
pub struct TypeEntry {
    pub kind: DeclKind,
    pub name: String,
    pub modifiers: Modifiers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<DocBlock>,
    pub parts: Vec<TypePart>,
}

impl TypeEntry {
    pub fn summary_line(&self) -> Option<String> {
        self.documentation.as_ref().and_then(|d| d.summary_line())
    }
}

/// Merge declarations from all files, preserving first-seen order.
///
/// Only declarations marked `partial` are grouped; everything else stays a
/// separate entry even when names collide.
pub fn merge(files: &[SourceFile]) -> Vec<TypeEntry> {
    let mut entries: Vec<TypeEntry> = Vec::new();
    let mut partials: HashMap<(DeclKind, String), usize> = HashMap::new();

    for file in files {
        let file_name = file.display_name();
        for decl in &file.declarations {
            let part = TypePart {
                file: file_name.clone(),
                line: decl.line,
            };

            if decl.modifiers.contains(Modifiers::PARTIAL) {
                let key = (decl.kind, decl.name.clone());
                if let Some(&idx) = partials.get(&key) {
                    let existing = &mut entries[idx];
                    existing.modifiers |= decl.modifiers;
                    existing.parts.push(part);
                    if has_summary(&decl.documentation) && !has_summary(&existing.documentation)
                    {
                        existing.documentation = decl.documentation.clone();
                    } else if existing.documentation.is_none() {
                        existing.documentation = decl.documentation.clone();
                    }
                    continue;
                }
                partials.insert(key, entries.len());
            }

            entries.push(TypeEntry {
                kind: decl.kind,
                name: decl.name.clone(),
                modifiers: decl.modifiers,
                documentation: decl.documentation.clone(),
                parts: vec![part],
            });
        }
    }

    entries
}

fn has_summary(doc: &Option<DocBlock>) -> bool {
    doc.as_ref().is_some_and(|d| d.summary().is_some())
}
