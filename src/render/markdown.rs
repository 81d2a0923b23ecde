//! GitHub-flavored markdown renderer.
//!
//! Partial declarations are merged first, so every logical type gets one
//! heading. Types are grouped by kind in a fixed order (classes, structs,
//! interfaces, enums), each group with its own index.

use crate::error::Result;
use crate::model::*;
use crate::parser::merge::{merge, TypeEntry};
use crate::render::Renderer;
use crate::toc::{self, Slugger};
use regex::Regex;
use std::sync::LazyLock;

pub struct MarkdownRenderer;

// Inline XML doc markup -> markdown
static RE_CODE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<code>\n?(.*?)\n?</code>").unwrap());

static RE_INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<c>(.*?)</c>").unwrap());

static RE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(?:see|seealso)\s+(?:cref|href|langword)\s*=\s*"(?:[A-Z]:)?([^"]*)"\s*/>"#)
        .unwrap()
});

static RE_PARAMREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<(?:paramref|typeparamref)\s+name\s*=\s*"([^"]*)"\s*/>"#).unwrap()
});

static RE_PARA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*</?para\s*/?>\s*").unwrap());

impl Renderer for MarkdownRenderer {
    fn render(&self, files: &[SourceFile]) -> Result<String> {
        let entries = merge(files);
        let mut slugger = Slugger::default();
        let mut output = String::new();

        for kind in DeclKind::ALL {
            let group: Vec<&TypeEntry> = entries.iter().filter(|e| e.kind == kind).collect();
            if group.is_empty() {
                continue;
            }

            let title = kind.plural_title();
            slugger.slug(title);
            let slugs: Vec<String> = group.iter().map(|e| slugger.slug(&e.name)).collect();

            output.push_str(&format!("## {}\n\n", title));
            for (entry, slug) in group.iter().zip(&slugs) {
                let mut item = toc::render_toc_item(&entry.name, slug);
                if let Some(summary) = entry.summary_line() {
                    item.push_str(" - ");
                    item.push_str(&inline_markdown(&summary));
                }
                output.push_str(&item);
                output.push('\n');
            }
            output.push('\n');

            for entry in &group {
                output.push_str(&render_entry(entry));
                output.push('\n');
            }
        }

        Ok(output)
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

/// Render a single type's documentation block.
fn render_entry(entry: &TypeEntry) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("### {}\n", entry.name));

    lines.push(render_badges(entry));
    lines.push(String::new());

    if let Some(ref doc) = entry.documentation {
        if let Some(summary) = doc.summary() {
            lines.push(inline_markdown(summary));
            lines.push(String::new());
        }

        if let Some(remarks) = doc.remarks() {
            lines.push("#### Remarks\n".to_string());
            lines.push(inline_markdown(remarks));
            lines.push(String::new());
        }

        push_named(&mut lines, "Type Parameters", doc.type_params());
        // Positional records document their primary constructor with <param>
        push_named(&mut lines, "Parameters", doc.params());

        if let Some(example) = doc.example() {
            lines.push("#### Example\n".to_string());
            lines.push(render_example(example));
            lines.push(String::new());
        }
    }

    lines.push("#### Defined in\n".to_string());
    for part in &entry.parts {
        lines.push(format!("* `{}:{}`", part.file, part.line));
    }
    lines.push(String::new());

    lines.join("\n")
}

fn push_named<'a>(
    lines: &mut Vec<String>,
    title: &str,
    items: impl Iterator<Item = (&'a str, &'a str)>,
) {
    let items: Vec<_> = items.collect();
    if items.is_empty() {
        return;
    }
    lines.push(format!("#### {}\n", title));
    for (name, text) in items {
        if text.is_empty() {
            lines.push(format!("* **{}**", name));
        } else {
            lines.push(format!("* **{}**: {}", name, inline_markdown(text)));
        }
    }
    lines.push(String::new());
}

/// Modifiers as a quoted row of inline-code badges, kind first.
fn render_badges(entry: &TypeEntry) -> String {
    let mut badges = vec![format!("`{}`", entry.kind)];
    badges.extend(entry.modifiers.keywords().map(|kw| format!("`{}`", kw)));
    format!("> {}", badges.join(" "))
}

/// Examples with `<code>` blocks keep their prose; a bare example is all code.
fn render_example(text: &str) -> String {
    if !RE_CODE_BLOCK.is_match(text) {
        return format!("```csharp\n{}\n```", text);
    }
    let fenced = RE_CODE_BLOCK.replace_all(text, "\n```csharp\n$1\n```\n");
    let out = inline_markdown(&fenced);
    out.trim_matches('\n').to_string()
}

fn inline_markdown(text: &str) -> String {
    let text = RE_INLINE_CODE.replace_all(text, "`$1`");
    let text = RE_REF.replace_all(&text, "`$1`");
    let text = RE_PARAMREF.replace_all(&text, "`$1`");
    let text = RE_PARA.replace_all(&text, "\n\n");
    text.trim().to_string()
}
