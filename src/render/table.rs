//! Tab-separated table, one row per declaration.
//!
//! Columns: file, kind, name, modifiers, summary. No header row.

use crate::error::Result;
use crate::model::*;
use crate::render::Renderer;

pub struct TableRenderer;

impl Renderer for TableRenderer {
    fn render(&self, files: &[SourceFile]) -> Result<String> {
        let mut out = String::new();
        for file in files {
            let name = file.display_name();
            for decl in &file.declarations {
                let summary = decl
                    .documentation
                    .as_ref()
                    .and_then(|d| d.summary_line())
                    .unwrap_or_default();
                out.push_str(&format!(
                    "{}\t{}\t{}\t{}\t{}\n",
                    name,
                    decl.kind,
                    decl.name,
                    decl.modifiers,
                    summary
                ));
            }
        }
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "tsv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use std::path::PathBuf;

    #[test]
    fn one_row_per_declaration() {
        let file = parse(
            "/// <summary>\n/// A thing.\n/// </summary>\npublic static class Thing { }\nstruct Point { }\n"
                .to_string(),
            Some(PathBuf::from("src/Thing.cs")),
        );
        let out = TableRenderer.render(&[file]).unwrap();
        assert_eq!(
            out,
            "src/Thing.cs\tclass\tThing\tpublic static\tA thing.\nsrc/Thing.cs\tstruct\tPoint\t\t\n"
        );
    }

    #[test]
    fn stdin_has_placeholder_name() {
        let file = parse("enum Color { Red }".to_string(), None);
        let out = TableRenderer.render(&[file]).unwrap();
        assert_eq!(out, "<stdin>\tenum\tColor\t\t\n");
    }

    #[test]
    fn multi_line_summary_is_collapsed() {
        let file = parse(
            "/// <summary>First\tpart\n///   second part</summary>\nclass A {}\n".to_string(),
            None,
        );
        let out = TableRenderer.render(&[file]).unwrap();
        assert_eq!(out, "<stdin>\tclass\tA\t\tFirst part second part\n");
    }
}
