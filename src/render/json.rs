//! JSON renderer: structured output for tooling integration.
//!
//! Serializes each scanned file with its declarations and warnings.
//! Partial declarations are reported as written, not merged.

use crate::error::Result;
use crate::model::*;
use crate::render::Renderer;
use serde::Serialize;

pub struct JsonRenderer;

#[derive(Serialize)]
struct FileReport<'a> {
    file: String,
    declarations: Vec<DeclReport<'a>>,
    warnings: &'a [ParseWarning],
}

/// A declaration plus its effective accessibility.
#[derive(Serialize)]
struct DeclReport<'a> {
    #[serde(flatten)]
    decl: &'a Declaration,
    #[serde(skip_serializing_if = "Option::is_none")]
    access: Option<&'static str>,
}

impl Renderer for JsonRenderer {
    fn render(&self, files: &[SourceFile]) -> Result<String> {
        let reports: Vec<FileReport> = files
            .iter()
            .map(|f| FileReport {
                file: f.display_name(),
                declarations: f
                    .declarations
                    .iter()
                    .map(|decl| DeclReport {
                        decl,
                        access: decl.modifiers.access(),
                    })
                    .collect(),
                warnings: &f.warnings,
            })
            .collect();
        let mut out = serde_json::to_string_pretty(&reports)?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}
