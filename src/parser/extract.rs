//! Declaration extractor: header state machine over scanner tokens.
//!
//! Code spans are split into words and punctuation on the fly. A header is
//! `[attributes]* modifiers* (class|struct|interface|enum) Name`; anything
//! else resets it. Braces are tracked on a frame stack so that nested types
//! are found and every body gets its balanced span.

use crate::model::*;
use crate::parser::doc;

struct Header {
    start: Option<usize>,
    modifiers: Modifiers,
    doc: Vec<CommentSpan>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            start: None,
            modifiers: Modifiers::empty(),
            doc: Vec::new(),
        }
    }
}

impl Header {
    fn is_empty(&self) -> bool {
        self.start.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
enum State {
    /// Accumulating modifiers.
    Header,
    /// Saw a type keyword, the name comes next.
    Name { kind: DeclKind, keyword: Span },
    /// Skipping generics, base list and constraints until `{`.
    Body { decl: usize },
    /// Inside `[...]` at statement start.
    Attribute { depth: usize },
}

enum Frame {
    Body { decl: usize, start: usize },
    Block,
}

/// Declarations and warnings produced by one extraction.
#[derive(Debug, Default)]
pub struct Extraction {
    pub declarations: Vec<Declaration>,
    pub warnings: Vec<ParseWarning>,
}

/// Streaming extractor; feed tokens in order, then call [`Extractor::finish`].
pub struct Extractor<'a> {
    text: &'a str,
    lines: &'a LineIndex,
    state: State,
    header: Header,
    pending_doc: Vec<CommentSpan>,
    statement_start: bool,
    at_line_start: bool,
    gap_newlines: usize,
    frames: Vec<Frame>,
    declarations: Vec<Declaration>,
    warnings: Vec<ParseWarning>,
}

/// Run the extractor over a whole token stream.
pub fn extract<'t>(
    text: &str,
    lines: &LineIndex,
    tokens: impl IntoIterator<Item = &'t Token>,
) -> Extraction {
    let mut extractor = Extractor::new(text, lines);
    for token in tokens {
        extractor.feed(token);
    }
    extractor.finish()
}

impl<'a> Extractor<'a> {
    pub fn new(text: &'a str, lines: &'a LineIndex) -> Self {
        Self {
            text,
            lines,
            state: State::Header,
            header: Header::default(),
            pending_doc: Vec::new(),
            statement_start: true,
            at_line_start: true,
            gap_newlines: 0,
            frames: Vec::new(),
            declarations: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn feed(&mut self, token: &Token) {
        match token {
            Token::Comment(comment) => {
                self.flush_gap();
                self.at_line_start = false;
                if comment.kind == CommentKind::DocLine {
                    self.on_doc(comment);
                }
            }
            Token::Code(CodeSpan {
                kind: CodeKind::Literal,
                ..
            }) => {
                self.flush_gap();
                self.at_line_start = false;
                self.on_other();
            }
            Token::Code(CodeSpan {
                kind: CodeKind::Text,
                span,
            }) => self.feed_text(*span),
        }
    }

    pub fn finish(mut self) -> Extraction {
        match self.state {
            State::Name { kind, keyword } => self.warn(
                WarningKind::MissingTypeName {
                    keyword: kind.keyword().to_string(),
                },
                keyword,
            ),
            State::Body { decl } => self.missing_body(decl),
            State::Header | State::Attribute { .. } => {}
        }

        let end = self.text.len();
        while let Some(frame) = self.frames.pop() {
            if let Frame::Body { decl, start } = frame {
                let name = self.declarations[decl].name.clone();
                self.warn(WarningKind::UnclosedBody { name }, Span::new(start, end));
                self.declarations[decl].body = Some(Span::new(start, end));
            }
        }

        Extraction {
            declarations: self.declarations,
            warnings: self.warnings,
        }
    }

    // -- Lexing ---------------------------------------------------------------

    fn feed_text(&mut self, span: Span) {
        let code = span.slice(self.text);
        let mut chars = code.char_indices().peekable();

        while let Some((i, c)) = chars.next() {
            if c == '\n' {
                self.gap_newlines += 1;
                self.at_line_start = true;
                continue;
            }
            if c.is_whitespace() {
                continue;
            }

            self.flush_gap();

            // Preprocessor directive: skipped up to the end of the line.
            if c == '#' && self.at_line_start {
                while chars.next_if(|&(_, d)| d != '\n').is_some() {}
                self.at_line_start = false;
                continue;
            }
            self.at_line_start = false;

            if is_ident_start(c) {
                let mut end = i + c.len_utf8();
                while let Some((j, d)) = chars.next_if(|&(_, d)| is_ident_continue(d)) {
                    end = j + d.len_utf8();
                }
                self.on_word(&code[i..end], Span::new(span.start + i, span.start + end));
            } else if c.is_ascii_digit() {
                while chars
                    .next_if(|&(_, d)| d.is_alphanumeric() || d == '_' || d == '.')
                    .is_some()
                {}
                self.on_other();
            } else {
                self.on_punct(c, span.start + i);
            }
        }
    }

    /// A blank line between two significant items interrupts a doc run.
    fn flush_gap(&mut self) {
        if self.gap_newlines >= 2 && matches!(self.state, State::Header) && self.header.is_empty()
        {
            self.pending_doc.clear();
        }
        self.gap_newlines = 0;
    }

    // -- Events ---------------------------------------------------------------

    /// Doc lines only collect before a header starts.
    fn on_doc(&mut self, comment: &CommentSpan) {
        if matches!(self.state, State::Header) && self.header.is_empty() {
            self.pending_doc.push(comment.clone());
        }
    }

    fn on_word(&mut self, word: &str, span: Span) {
        match self.state {
            State::Attribute { .. } | State::Body { .. } => {}
            State::Name { kind, keyword } => {
                let name = word.trim_start_matches('@');
                if name.is_empty() {
                    self.missing_name(kind, keyword);
                    return;
                }
                self.push_declaration(kind, name, span);
            }
            State::Header => {
                if let Some(modifier) = Modifiers::from_keyword(word) {
                    self.begin_header(span.start);
                    self.header.modifiers |= modifier;
                } else if let Some(kind) = DeclKind::from_keyword(word)
                    .filter(|_| self.statement_start || !self.header.is_empty())
                {
                    self.begin_header(span.start);
                    self.state = State::Name { kind, keyword: span };
                } else if self.statement_start
                    && self.header.modifiers.contains(Modifiers::RECORD)
                    && !word.trim_start_matches('@').is_empty()
                {
                    // Bare `record Name` is a record class.
                    self.push_declaration(DeclKind::Class, word.trim_start_matches('@'), span);
                } else {
                    self.reset_header();
                    self.statement_start = false;
                }
            }
        }
    }

    fn on_punct(&mut self, c: char, offset: usize) {
        match self.state {
            State::Attribute { depth } => {
                let depth = match c {
                    '[' => depth + 1,
                    ']' => depth - 1,
                    _ => depth,
                };
                if depth == 0 {
                    self.state = State::Header;
                    self.statement_start = true;
                } else {
                    self.state = State::Attribute { depth };
                }
            }
            State::Name { kind, keyword } => {
                self.missing_name(kind, keyword);
                self.on_punct(c, offset);
            }
            State::Body { decl } => match c {
                '{' => {
                    self.frames.push(Frame::Body {
                        decl,
                        start: offset,
                    });
                    self.state = State::Header;
                    self.reset_header();
                    self.statement_start = true;
                }
                ';' => {
                    // Positional records may end without a body.
                    if !self.declarations[decl].modifiers.contains(Modifiers::RECORD) {
                        self.missing_body(decl);
                    }
                    self.state = State::Header;
                    self.reset_header();
                    self.statement_start = true;
                }
                '}' => {
                    self.missing_body(decl);
                    self.state = State::Header;
                    self.on_punct(c, offset);
                }
                _ => {}
            },
            State::Header => match c {
                '[' if self.statement_start && self.header.is_empty() => {
                    self.state = State::Attribute { depth: 1 };
                }
                '{' => {
                    self.frames.push(Frame::Block);
                    self.reset_header();
                    self.statement_start = true;
                }
                '}' => {
                    match self.frames.pop() {
                        Some(Frame::Body { decl, start }) => {
                            self.declarations[decl].body = Some(Span::new(start, offset + 1));
                        }
                        Some(Frame::Block) => {}
                        None => self.warn(WarningKind::UnmatchedBrace, Span::new(offset, offset + 1)),
                    }
                    self.reset_header();
                    self.statement_start = true;
                }
                ';' => {
                    self.reset_header();
                    self.statement_start = true;
                }
                _ => {
                    self.reset_header();
                    self.statement_start = false;
                }
            },
        }
    }

    /// Literals, numbers.
    fn on_other(&mut self) {
        match self.state {
            State::Attribute { .. } | State::Body { .. } => {}
            State::Name { kind, keyword } => {
                self.missing_name(kind, keyword);
                self.statement_start = false;
            }
            State::Header => {
                self.reset_header();
                self.statement_start = false;
            }
        }
    }

    // -- Helpers --------------------------------------------------------------

    fn begin_header(&mut self, start: usize) {
        if self.header.is_empty() {
            self.header.start = Some(start);
            self.header.doc = std::mem::take(&mut self.pending_doc);
        }
    }

    fn reset_header(&mut self) {
        self.header = Header::default();
        self.pending_doc.clear();
    }

    fn push_declaration(&mut self, kind: DeclKind, name: &str, name_span: Span) {
        let header = std::mem::take(&mut self.header);
        let documentation = if header.doc.is_empty() {
            None
        } else {
            Some(doc::parse(&header.doc, &mut self.warnings))
        };
        let start = header.start.unwrap_or(name_span.start);
        self.declarations.push(Declaration {
            kind,
            name: name.to_string(),
            modifiers: header.modifiers,
            documentation,
            header: Span::new(start, name_span.end),
            body: None,
            line: self.lines.line_of(start),
        });
        self.state = State::Body {
            decl: self.declarations.len() - 1,
        };
    }

    fn missing_name(&mut self, kind: DeclKind, keyword: Span) {
        self.warn(
            WarningKind::MissingTypeName {
                keyword: kind.keyword().to_string(),
            },
            keyword,
        );
        self.state = State::Header;
        self.reset_header();
    }

    fn missing_body(&mut self, decl: usize) {
        let d = &self.declarations[decl];
        let (name, span) = (d.name.clone(), d.header);
        self.warn(WarningKind::MissingBody { name }, span);
    }

    fn warn(&mut self, kind: WarningKind, span: Span) {
        let line = self.lines.line_of(span.start);
        self.warnings.push(ParseWarning { kind, span, line });
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '@'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
