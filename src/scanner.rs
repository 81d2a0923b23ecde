//! Lexical scanner: splits C# source into comment and code spans.
//!
//! The scanner is a lazy iterator. It only knows enough C# to find comments
//! reliably: literal quoting state is tracked so that `//` or `/*` inside a
//! string never opens a comment.
//!
//! - `//` line comment, `///` doc-line comment (any `///` prefix)
//! - `/* ... */` block comment, never nested, never documentation
//! - `"..."`, `@"..."`, `$"..."`, `$@"..."`, `"""..."""`, `'.'` literals
//! - `#` directive lines are plain text up to the newline

use crate::model::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LiteralKind {
    /// `"..."`, optionally interpolated.
    Regular { interpolated: bool },
    /// `@"..."`, `""` escapes a quote.
    Verbatim,
    /// `"""..."""` with the given quote count.
    Raw(usize),
    Char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Start {
    Code,
    /// `#` as the first non-blank character of a line.
    Directive,
    LineComment,
    BlockComment,
    /// Literal kind and the offset of its content (past prefix and opening quotes).
    Literal(LiteralKind, usize),
}

/// Lazy comment/code tokenizer over an immutable buffer.
pub struct Scanner<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    lines: LineIndex,
    warnings: Vec<ParseWarning>,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            lines: LineIndex::new(text),
            warnings: Vec::new(),
        }
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    /// Consume the scanner, returning its line index and warnings.
    pub fn finish(self) -> (LineIndex, Vec<ParseWarning>) {
        (self.lines, self.warnings)
    }

    fn byte(&self, i: usize) -> Option<u8> {
        self.bytes.get(i).copied()
    }

    fn starts_with_at(&self, i: usize, pat: &[u8]) -> bool {
        self.bytes.get(i..i + pat.len()) == Some(pat)
    }

    fn quote_run(&self, i: usize) -> usize {
        self.bytes[i..].iter().take_while(|&&b| b == b'"').count()
    }

    /// Only spaces and tabs between the previous newline and `i`.
    fn at_line_start(&self, i: usize) -> bool {
        self.bytes[..i]
            .iter()
            .rev()
            .find(|&&b| b != b' ' && b != b'\t')
            .map_or(true, |&b| b == b'\n')
    }

    fn classify(&self, i: usize) -> Start {
        match self.bytes[i] {
            b'#' if self.at_line_start(i) => Start::Directive,
            b'/' => match self.byte(i + 1) {
                Some(b'/') => Start::LineComment,
                Some(b'*') => Start::BlockComment,
                _ => Start::Code,
            },
            b'"' => self.classify_quote(i, false),
            b'\'' => Start::Literal(LiteralKind::Char, i + 1),
            b'@' => match self.byte(i + 1) {
                Some(b'"') => Start::Literal(LiteralKind::Verbatim, i + 2),
                Some(b'$') if self.byte(i + 2) == Some(b'"') => {
                    Start::Literal(LiteralKind::Verbatim, i + 3)
                }
                _ => Start::Code,
            },
            b'$' => {
                // `$$"""` raw interpolation uses several dollars
                let mut j = i;
                while self.byte(j) == Some(b'$') {
                    j += 1;
                }
                match self.byte(j) {
                    Some(b'"') => self.classify_quote(j, true),
                    Some(b'@') if self.byte(j + 1) == Some(b'"') => {
                        Start::Literal(LiteralKind::Verbatim, j + 2)
                    }
                    _ => Start::Code,
                }
            }
            _ => Start::Code,
        }
    }

    fn classify_quote(&self, i: usize, interpolated: bool) -> Start {
        let run = self.quote_run(i);
        if run >= 3 {
            Start::Literal(LiteralKind::Raw(run), i + run)
        } else {
            Start::Literal(LiteralKind::Regular { interpolated }, i + 1)
        }
    }

    fn warn(&mut self, kind: WarningKind, span: Span) {
        let line = self.lines.line_of(span.start);
        self.warnings.push(ParseWarning { kind, span, line });
    }

    fn line_comment(&mut self) -> Token {
        let start = self.pos;
        let doc = self.starts_with_at(start, b"///");
        let marker = if doc { 3 } else { 2 };
        let end = self.text[start..]
            .find('\n')
            .map(|i| start + i)
            .unwrap_or(self.bytes.len());
        self.pos = end;
        Token::Comment(CommentSpan {
            kind: if doc {
                CommentKind::DocLine
            } else {
                CommentKind::Line
            },
            text: self.text[start + marker..end].trim_end_matches('\r').to_string(),
            span: Span::new(start, end),
            line: self.lines.line_of(start),
        })
    }

    /// Quotes and comment markers on a directive line are not tokens.
    fn directive(&mut self) -> Token {
        let start = self.pos;
        let end = self.text[start..]
            .find('\n')
            .map(|i| start + i)
            .unwrap_or(self.bytes.len());
        self.pos = end;
        Token::Code(CodeSpan {
            kind: CodeKind::Text,
            span: Span::new(start, end),
        })
    }

    fn block_comment(&mut self) -> Token {
        let start = self.pos;
        let body_start = start + 2;
        let (text_end, end) = match self.text[body_start..].find("*/") {
            Some(i) => (body_start + i, body_start + i + 2),
            None => {
                let len = self.bytes.len();
                self.warn(WarningKind::UnterminatedBlockComment, Span::new(start, len));
                (len, len)
            }
        };
        self.pos = end;
        Token::Comment(CommentSpan {
            kind: CommentKind::Block,
            text: self.text[body_start..text_end].to_string(),
            span: Span::new(start, end),
            line: self.lines.line_of(start),
        })
    }

    fn literal(&mut self, kind: LiteralKind, content: usize) -> Token {
        let start = self.pos;
        let (end, terminated) = match kind {
            LiteralKind::Regular { interpolated } => self.skip_regular(content, interpolated),
            LiteralKind::Verbatim => self.skip_verbatim(content),
            LiteralKind::Raw(quotes) => self.skip_raw(content, quotes),
            LiteralKind::Char => self.skip_char(content),
        };
        if !terminated {
            self.warn(WarningKind::UnterminatedLiteral, Span::new(start, end));
        }
        self.pos = end;
        Token::Code(CodeSpan {
            kind: CodeKind::Literal,
            span: Span::new(start, end),
        })
    }

    /// Regular strings stop at a newline. Interpolation holes may hold nested literals.
    fn skip_regular(&self, mut i: usize, interpolated: bool) -> (usize, bool) {
        let len = self.bytes.len();
        let mut depth = 0usize;
        while i < len {
            match self.bytes[i] {
                b'\n' => return (i, false),
                b'\\' if depth == 0 => i += 2,
                b'"' if depth == 0 => return (i + 1, true),
                b'{' if interpolated => {
                    if depth == 0 && self.byte(i + 1) == Some(b'{') {
                        i += 2;
                    } else {
                        depth += 1;
                        i += 1;
                    }
                }
                b'}' if depth > 0 => {
                    depth -= 1;
                    i += 1;
                }
                b'"' | b'\'' | b'@' | b'$' if depth > 0 => match self.classify(i) {
                    Start::Literal(kind, content) => {
                        let (end, ok) = match kind {
                            LiteralKind::Regular { interpolated } => {
                                self.skip_regular(content, interpolated)
                            }
                            LiteralKind::Verbatim => self.skip_verbatim(content),
                            LiteralKind::Raw(q) => self.skip_raw(content, q),
                            LiteralKind::Char => self.skip_char(content),
                        };
                        if !ok {
                            return (end, false);
                        }
                        i = end;
                    }
                    _ => i += 1,
                },
                _ => i += 1,
            }
        }
        (len, false)
    }

    fn skip_verbatim(&self, mut i: usize) -> (usize, bool) {
        let len = self.bytes.len();
        while i < len {
            if self.bytes[i] == b'"' {
                if self.byte(i + 1) == Some(b'"') {
                    i += 2;
                    continue;
                }
                return (i + 1, true);
            }
            i += 1;
        }
        (len, false)
    }

    fn skip_raw(&self, mut i: usize, quotes: usize) -> (usize, bool) {
        let len = self.bytes.len();
        while i < len {
            if self.bytes[i] == b'"' {
                let run = self.quote_run(i);
                if run >= quotes {
                    return (i + run, true);
                }
                i += run;
            } else {
                i += 1;
            }
        }
        (len, false)
    }

    fn skip_char(&self, mut i: usize) -> (usize, bool) {
        let len = self.bytes.len();
        while i < len {
            match self.bytes[i] {
                b'\n' => return (i, false),
                b'\\' => i += 2,
                b'\'' => return (i + 1, true),
                _ => i += 1,
            }
        }
        (len, false)
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let len = self.bytes.len();
        if self.pos >= len {
            return None;
        }

        match self.classify(self.pos) {
            Start::Directive => return Some(self.directive()),
            Start::LineComment => return Some(self.line_comment()),
            Start::BlockComment => return Some(self.block_comment()),
            Start::Literal(kind, content) => return Some(self.literal(kind, content)),
            Start::Code => {}
        }

        // Markers are ASCII, so every stop is a char boundary.
        let start = self.pos;
        self.pos += 1;
        while self.pos < len && self.classify(self.pos) == Start::Code {
            self.pos += 1;
        }
        Some(Token::Code(CodeSpan {
            kind: CodeKind::Text,
            span: Span::new(start, self.pos),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comments(input: &str) -> Vec<(CommentKind, String)> {
        Scanner::new(input)
            .filter_map(|t| match t {
                Token::Comment(c) => Some((c.kind, c.text)),
                Token::Code(_) => None,
            })
            .collect()
    }

    fn literals(input: &str) -> Vec<String> {
        Scanner::new(input)
            .filter_map(|t| match t {
                Token::Code(CodeSpan {
                    kind: CodeKind::Literal,
                    span,
                }) => Some(span.slice(input).to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn classifies_line_and_doc_comments() {
        let got = comments("// plain\n/// <summary>\n//// four\nclass A {}\n");
        assert_eq!(
            got,
            vec![
                (CommentKind::Line, " plain".to_string()),
                (CommentKind::DocLine, " <summary>".to_string()),
                (CommentKind::DocLine, "/ four".to_string()),
            ]
        );
    }

    #[test]
    fn block_comments_are_always_plain() {
        let got = comments("/** not docs */\n/* a\n   b */ class X {}");
        assert_eq!(got[0].0, CommentKind::Block);
        assert_eq!(got[0].1, "* not docs ");
        assert_eq!(got[1], (CommentKind::Block, " a\n   b ".to_string()));
    }

    #[test]
    fn block_comment_does_not_close_on_its_own_star() {
        let got = comments("/*/ still open */x");
        assert_eq!(got, vec![(CommentKind::Block, "/ still open ".to_string())]);
    }

    #[test]
    fn comment_markers_inside_strings_are_ignored() {
        let input = r#"var url = "http://example.com"; var c = '/'; var d = "/* no */";"#;
        assert!(comments(input).is_empty());
        assert_eq!(literals(input).len(), 3);
    }

    #[test]
    fn verbatim_string_spans_lines_and_doubles_quotes() {
        let input = "var s = @\"a \"\"//\"\"\nb\"; // real";
        assert_eq!(literals(input), vec!["@\"a \"\"//\"\"\nb\"".to_string()]);
        assert_eq!(comments(input), vec![(CommentKind::Line, " real".to_string())]);
    }

    #[test]
    fn raw_string_literal() {
        let input = "var s = \"\"\"\n  has \"quotes\" and // slashes\n  \"\"\";";
        assert_eq!(literals(input).len(), 1);
        assert!(comments(input).is_empty());
    }

    #[test]
    fn interpolated_string_with_nested_literal() {
        let input = r#"var s = $"{d["k"]} // text"; // after"#;
        assert_eq!(literals(input), vec![r#"$"{d["k"]} // text""#.to_string()]);
        assert_eq!(comments(input), vec![(CommentKind::Line, " after".to_string())]);
    }

    #[test]
    fn escaped_quote_in_regular_string() {
        let input = r#"var s = "a\"//b"; // c"#;
        assert_eq!(comments(input), vec![(CommentKind::Line, " c".to_string())]);
    }

    #[test]
    fn char_literal_with_quote() {
        let input = "var q = '\"'; // c";
        assert_eq!(comments(input), vec![(CommentKind::Line, " c".to_string())]);
    }

    #[test]
    fn unterminated_block_comment_warns() {
        let mut scanner = Scanner::new("class A {}\n/* never closed\nclass B {}");
        let tokens: Vec<Token> = scanner.by_ref().collect();
        assert_eq!(tokens.len(), 2);
        let (_, warnings) = scanner.finish();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::UnterminatedBlockComment);
        assert_eq!(warnings[0].line, 2);
    }

    #[test]
    fn unterminated_string_stops_at_newline() {
        let mut scanner = Scanner::new("var s = \"open\n// comment");
        let tokens: Vec<Token> = scanner.by_ref().collect();
        assert!(matches!(
            tokens.last(),
            Some(Token::Comment(CommentSpan {
                kind: CommentKind::Line,
                ..
            }))
        ));
        assert_eq!(scanner.warnings().len(), 1);
        assert_eq!(scanner.warnings()[0].kind, WarningKind::UnterminatedLiteral);
    }

    #[test]
    fn spans_cover_input() {
        let input = "/// d\npublic class A { string s = \"x\"; } // t\n";
        let mut end = 0;
        for token in Scanner::new(input) {
            let span = match token {
                Token::Comment(c) => c.span,
                Token::Code(c) => c.span,
            };
            assert_eq!(span.start, end);
            end = span.end;
        }
        assert_eq!(end, input.len());
    }

    #[test]
    fn directive_line_is_plain_text() {
        let input = "#region Don't \"touch\" // here\n  #error Can't\nvar x = 1 # 2;\n";
        let mut scanner = Scanner::new(input);
        let tokens: Vec<Token> = scanner.by_ref().collect();
        let (_, warnings) = scanner.finish();
        assert!(warnings.is_empty(), "{:?}", warnings);
        assert!(tokens
            .iter()
            .all(|t| matches!(t, Token::Code(CodeSpan { kind: CodeKind::Text, .. }))));
        match &tokens[0] {
            Token::Code(c) => assert_eq!(c.span.slice(input), "#region Don't \"touch\" // here"),
            Token::Comment(_) => unreachable!(),
        }
    }

    #[test]
    fn hash_inside_literal_is_not_a_directive() {
        let input = "var s = @\"\n#region\";\n";
        assert_eq!(literals(input), vec!["@\"\n#region\"".to_string()]);
    }

    #[test]
    fn comment_line_numbers() {
        let mut lines = Scanner::new("a\n// one\nb /* two */").filter_map(|t| match t {
            Token::Comment(c) => Some(c.line),
            _ => None,
        });
        assert_eq!(lines.next(), Some(2));
        assert_eq!(lines.next(), Some(3));
    }
}
