//! Data model for scanned C# sources, independent of output format.

use bitflags::bitflags;
use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Byte range `[start, end)` into a file's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Maps byte offsets to 1-based line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(i) => i + 1,
            Err(i) => i,
        }
    }
}

// -- Tokens -------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/* ... */`, including `/** ... */`
    Block,
    /// `/// ...`
    DocLine,
}

/// A recognized comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentSpan {
    pub kind: CommentKind,
    /// Content after the marker (line forms) or between the delimiters (block).
    pub text: String,
    pub span: Span,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Text,
    /// String or character literal, quotes included.
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeSpan {
    pub kind: CodeKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Comment(CommentSpan),
    Code(CodeSpan),
}

// -- Declarations -------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Class,
    Struct,
    Interface,
    Enum,
}

impl DeclKind {
    pub const ALL: [DeclKind; 4] = [
        DeclKind::Class,
        DeclKind::Struct,
        DeclKind::Interface,
        DeclKind::Enum,
    ];

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "class" => Some(DeclKind::Class),
            "struct" => Some(DeclKind::Struct),
            "interface" => Some(DeclKind::Interface),
            "enum" => Some(DeclKind::Enum),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            DeclKind::Class => "class",
            DeclKind::Struct => "struct",
            DeclKind::Interface => "interface",
            DeclKind::Enum => "enum",
        }
    }

    /// Section heading used by the markdown renderer.
    pub fn plural_title(self) -> &'static str {
        match self {
            DeclKind::Class => "Classes",
            DeclKind::Struct => "Structs",
            DeclKind::Interface => "Interfaces",
            DeclKind::Enum => "Enums",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

bitflags! {
    /// Declaration modifiers in canonical order.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u16 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const INTERNAL = 1 << 3;
        const FILE = 1 << 4;
        const STATIC = 1 << 5;
        const ABSTRACT = 1 << 6;
        const SEALED = 1 << 7;
        const READONLY = 1 << 8;
        const UNSAFE = 1 << 9;
        const NEW = 1 << 10;
        const REF = 1 << 11;
        const PARTIAL = 1 << 12;
        /// Contextual `record`; `record class`, `record struct` or bare `record`.
        const RECORD = 1 << 13;
    }
}

const MODIFIER_KEYWORDS: &[(Modifiers, &str)] = &[
    (Modifiers::PUBLIC, "public"),
    (Modifiers::PRIVATE, "private"),
    (Modifiers::PROTECTED, "protected"),
    (Modifiers::INTERNAL, "internal"),
    (Modifiers::FILE, "file"),
    (Modifiers::STATIC, "static"),
    (Modifiers::ABSTRACT, "abstract"),
    (Modifiers::SEALED, "sealed"),
    (Modifiers::READONLY, "readonly"),
    (Modifiers::UNSAFE, "unsafe"),
    (Modifiers::NEW, "new"),
    (Modifiers::REF, "ref"),
    (Modifiers::PARTIAL, "partial"),
    (Modifiers::RECORD, "record"),
];

impl Modifiers {
    pub fn from_keyword(word: &str) -> Option<Self> {
        MODIFIER_KEYWORDS
            .iter()
            .find(|(_, kw)| *kw == word)
            .map(|(flag, _)| *flag)
    }

    pub fn keywords(self) -> impl Iterator<Item = &'static str> {
        MODIFIER_KEYWORDS
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, kw)| *kw)
    }

    /// Effective accessibility as written, `None` when no access modifier is present.
    pub fn access(self) -> Option<&'static str> {
        if self.contains(Modifiers::PRIVATE | Modifiers::PROTECTED) {
            Some("private protected")
        } else if self.contains(Modifiers::PROTECTED | Modifiers::INTERNAL) {
            Some("protected internal")
        } else if self.contains(Modifiers::PUBLIC) {
            Some("public")
        } else if self.contains(Modifiers::PRIVATE) {
            Some("private")
        } else if self.contains(Modifiers::PROTECTED) {
            Some("protected")
        } else if self.contains(Modifiers::INTERNAL) {
            Some("internal")
        } else if self.contains(Modifiers::FILE) {
            Some("file")
        } else {
            None
        }
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words: Vec<&str> = self.keywords().collect();
        f.write_str(&words.join(" "))
    }
}

impl Serialize for Modifiers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(None)?;
        for kw in self.keywords() {
            seq.serialize_element(kw)?;
        }
        seq.end()
    }
}

/// A recognized type declaration.
#[derive(Debug, Clone, Serialize)]
pub struct Declaration {
    pub kind: DeclKind,
    pub name: String,
    pub modifiers: Modifiers,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<DocBlock>,
    /// From the first modifier (or the type keyword) to the end of the name.
    pub header: Span,
    /// Balanced-brace body, braces included.
    pub body: Option<Span>,
    pub line: usize,
}

// -- Documentation ------------------------------------------------------------

/// Tag of a documentation section. Unrecognized tags stay open-ended.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocTag {
    Summary,
    Remarks,
    Example,
    Param,
    TypeParam,
    Returns,
    Other(String),
}

impl DocTag {
    pub fn from_name(name: &str) -> Self {
        match name {
            "summary" => DocTag::Summary,
            "remarks" => DocTag::Remarks,
            "example" => DocTag::Example,
            "param" => DocTag::Param,
            "typeparam" => DocTag::TypeParam,
            "returns" => DocTag::Returns,
            other => DocTag::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DocTag::Summary => "summary",
            DocTag::Remarks => "remarks",
            DocTag::Example => "example",
            DocTag::Param => "param",
            DocTag::TypeParam => "typeparam",
            DocTag::Returns => "returns",
            DocTag::Other(name) => name,
        }
    }
}

impl Serialize for DocTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocSection {
    pub tag: DocTag,
    /// `name` attribute of `<param>` / `<typeparam>` (and any other tag carrying one).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub text: String,
}

/// Parsed `///` documentation, sections in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DocBlock {
    pub sections: Vec<DocSection>,
}

impl DocBlock {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// All sections with the given tag name, including opaque ones.
    pub fn get<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a DocSection> + 'a {
        self.sections.iter().filter(move |s| s.tag.as_str() == tag)
    }

    fn first(&self, tag: &DocTag) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| &s.tag == tag)
            .map(|s| s.text.as_str())
    }

    pub fn summary(&self) -> Option<&str> {
        self.first(&DocTag::Summary)
    }

    pub fn remarks(&self) -> Option<&str> {
        self.first(&DocTag::Remarks)
    }

    pub fn example(&self) -> Option<&str> {
        self.first(&DocTag::Example)
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.named(DocTag::Param)
    }

    pub fn type_params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.named(DocTag::TypeParam)
    }

    fn named(&self, tag: DocTag) -> impl Iterator<Item = (&str, &str)> {
        self.sections
            .iter()
            .filter(move |s| s.tag == tag)
            .filter_map(|s| s.name.as_deref().map(|n| (n, s.text.as_str())))
    }

    /// Summary collapsed onto a single line.
    pub fn summary_line(&self) -> Option<String> {
        let line = self.summary()?.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            None
        } else {
            Some(line)
        }
    }
}

// -- Diagnostics --------------------------------------------------------------

/// Recoverable problems found while scanning. None of them stop extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WarningKind {
    #[error("unterminated block comment")]
    UnterminatedBlockComment,
    #[error("unterminated string or character literal")]
    UnterminatedLiteral,
    #[error("expected a type name after `{keyword}`")]
    MissingTypeName { keyword: String },
    #[error("`{name}` has no body")]
    MissingBody { name: String },
    #[error("body of `{name}` is not closed before end of input")]
    UnclosedBody { name: String },
    #[error("unmatched closing brace")]
    UnmatchedBrace,
    #[error("documentation tag <{tag}> is not closed")]
    UnclosedDocTag { tag: String },
    #[error("documentation closing tag </{tag}> has no opening tag")]
    UnmatchedDocTag { tag: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub kind: WarningKind,
    pub span: Span,
    pub line: usize,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl Serialize for ParseWarning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("ParseWarning", 3)?;
        st.serialize_field("line", &self.line)?;
        st.serialize_field("span", &self.span)?;
        st.serialize_field("message", &self.kind.to_string())?;
        st.end()
    }
}

// -- Files --------------------------------------------------------------------

/// Everything extracted from one source text.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// `None` for stdin.
    pub path: Option<PathBuf>,
    pub text: String,
    pub declarations: Vec<Declaration>,
    pub comments: Vec<CommentSpan>,
    pub warnings: Vec<ParseWarning>,
}

impl SourceFile {
    pub fn display_name(&self) -> String {
        match self.path {
            Some(ref p) => p.display().to_string(),
            None => "<stdin>".to_string(),
        }
    }

    /// File stem used for per-file output names.
    pub fn stem(&self) -> String {
        self.path
            .as_deref()
            .and_then(|p| p.file_stem())
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "stdin".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_index_maps_offsets() {
        let idx = LineIndex::new("ab\ncd\n\nef");
        assert_eq!(idx.line_of(0), 1);
        assert_eq!(idx.line_of(2), 1);
        assert_eq!(idx.line_of(3), 2);
        assert_eq!(idx.line_of(6), 3);
        assert_eq!(idx.line_of(8), 4);
    }

    #[test]
    fn modifiers_display_in_canonical_order() {
        let m = Modifiers::PARTIAL | Modifiers::STATIC | Modifiers::PUBLIC;
        assert_eq!(m.to_string(), "public static partial");
    }

    #[test]
    fn modifiers_access() {
        assert_eq!(
            (Modifiers::PROTECTED | Modifiers::INTERNAL).access(),
            Some("protected internal")
        );
        assert_eq!(
            (Modifiers::PRIVATE | Modifiers::PROTECTED).access(),
            Some("private protected")
        );
        assert_eq!(Modifiers::STATIC.access(), None);
    }

    #[test]
    fn modifiers_serialize_as_keyword_list() {
        let json = serde_json::to_string(&(Modifiers::PUBLIC | Modifiers::ABSTRACT)).unwrap();
        assert_eq!(json, r#"["public","abstract"]"#);
    }

    #[test]
    fn summary_line_collapses_whitespace() {
        let doc = DocBlock {
            sections: vec![DocSection {
                tag: DocTag::Summary,
                name: None,
                text: "First line\n  second line".to_string(),
            }],
        };
        assert_eq!(doc.summary_line().as_deref(), Some("First line second line"));
    }

    #[test]
    fn open_tags_round_trip_names() {
        assert_eq!(DocTag::from_name("typeparam"), DocTag::TypeParam);
        assert_eq!(DocTag::from_name("seealso").as_str(), "seealso");
    }
}
