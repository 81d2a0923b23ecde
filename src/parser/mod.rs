//! Parser module: scan, extract and attach documentation.

pub mod doc;
pub mod extract;
pub mod merge;

use crate::error::{Error, Result};
use crate::model::*;
use crate::scanner::Scanner;
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions recognized as C# sources.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["cs", "csx"];

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

/// Scan source text into a [`SourceFile`]. Never fails; problems become warnings.
pub fn parse(text: String, path: Option<PathBuf>) -> SourceFile {
    let mut scanner = Scanner::new(&text);
    let tokens: Vec<Token> = scanner.by_ref().collect();
    let (lines, mut warnings) = scanner.finish();

    let comments = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Comment(c) => Some(c.clone()),
            Token::Code(_) => None,
        })
        .collect();

    let extraction = extract::extract(&text, &lines, &tokens);
    warnings.extend(extraction.warnings);
    warnings.sort_by_key(|w| w.span.start);

    SourceFile {
        path,
        text,
        declarations: extraction.declarations,
        comments,
        warnings,
    }
}

/// Read and parse a source file based on its extension.
pub fn parse_file(path: &Path) -> Result<SourceFile> {
    if !is_supported(path) {
        return Err(Error::UnsupportedFile {
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path).map_err(|source| Error::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse(text, Some(path.to_path_buf())))
}
