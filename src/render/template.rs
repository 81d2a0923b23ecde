//! Line-oriented template expansion.
//!
//! A template line containing `{{ class }}`, `{{ struct }}`, `{{ interface }}`
//! or `{{ enum }}` is emitted once per type of that kind, with the placeholder
//! replaced by the type name and `[one_sentence_summary]` by its summary.
//! A placeholder line for a kind with no types, and every other line, is
//! copied as-is.

use crate::error::{Error, Result};
use crate::model::*;
use crate::parser::merge::{merge, TypeEntry};
use crate::render::Renderer;
use regex::Regex;
use std::sync::LazyLock;

pub const SUMMARY_PLACEHOLDER: &str = "[one_sentence_summary]";

static RE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*(class|struct|interface|enum)\s*\}\}").unwrap()
});

pub struct TemplateRenderer {
    template: String,
    extension: String,
}

impl TemplateRenderer {
    pub fn new(template: String) -> Self {
        Self {
            template,
            extension: "md".to_string(),
        }
    }

    /// Extension reported for output files, normally taken from the template's own name.
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.to_string();
        self
    }
}

impl Renderer for TemplateRenderer {
    fn render(&self, files: &[SourceFile]) -> Result<String> {
        if !RE_PLACEHOLDER.is_match(&self.template) {
            return Err(Error::Template(
                "template contains no {{ class }}, {{ struct }}, {{ interface }} or {{ enum }} placeholder"
                    .to_string(),
            ));
        }
        let entries = merge(files);
        Ok(expand(&self.template, &entries))
    }

    fn file_extension(&self) -> &str {
        &self.extension
    }
}

fn expand(template: &str, entries: &[TypeEntry]) -> String {
    let mut out = String::new();

    for line in template.lines() {
        let Some(caps) = RE_PLACEHOLDER.captures(line) else {
            out.push_str(line);
            out.push('\n');
            continue;
        };
        let matching: Vec<&TypeEntry> = match DeclKind::from_keyword(&caps[1]) {
            Some(kind) => entries.iter().filter(|e| e.kind == kind).collect(),
            None => Vec::new(),
        };
        // No types of this kind: the line stays as written
        if matching.is_empty() {
            out.push_str(line);
            out.push('\n');
            continue;
        }

        for entry in matching {
            let kind = entry.kind;
            let summary = entry
                .summary_line()
                .unwrap_or_else(|| SUMMARY_PLACEHOLDER.to_string());
            let expanded = RE_PLACEHOLDER.replace_all(line, |c: &regex::Captures| {
                if &c[1] == kind.keyword() {
                    entry.name.clone()
                } else {
                    c[0].to_string()
                }
            });
            out.push_str(&expanded.replace(SUMMARY_PLACEHOLDER, &summary));
            out.push('\n');
        }
    }

    out
}
