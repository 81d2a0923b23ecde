//! Renderer module: trait-based format dispatch.

pub mod json;
pub mod markdown;
pub mod table;
pub mod template;

use crate::error::{Error, Result};
use crate::model::SourceFile;

/// Trait for rendering scanned files into a specific output format.
pub trait Renderer {
    fn render(&self, files: &[SourceFile]) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
///
/// `template` holds the template text and is only used by the `template` format.
pub fn create_renderer(format: &str, template: Option<String>) -> Result<Box<dyn Renderer>> {
    match format {
        "table" | "tsv" => Ok(Box::new(table::TableRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownRenderer)),
        "template" => {
            let template = template.ok_or_else(|| {
                Error::Template("the template format requires --template".to_string())
            })?;
            Ok(Box::new(template::TemplateRenderer::new(template)))
        }
        _ => Err(Error::UnknownFormat(format.to_string())),
    }
}
