//! XML documentation parser for runs of `///` comments.
//!
//! Not a full XML parser. Top-level tags become sections, anything nested
//! (`<see cref="..."/>`, `<c>`, `<para>`) is kept verbatim in the section
//! text. A section missing its closing tag runs until the next top-level
//! tag or the end of the run.

use crate::model::*;
use regex::Regex;
use std::sync::LazyLock;

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z_][A-Za-z0-9_.:-]*)((?:\s[^<>]*?)?)\s*(/?)>").unwrap()
});

static RE_NAME_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bname\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

/// Tags that start a new section when an earlier one was left open.
const SECTION_TAGS: &[&str] = &[
    "summary",
    "remarks",
    "example",
    "param",
    "typeparam",
    "returns",
    "value",
    "exception",
    "seealso",
    "permission",
    "inheritdoc",
    "include",
];

struct TagMatch {
    start: usize,
    end: usize,
    closing: bool,
    self_closing: bool,
    name: String,
    attr_name: Option<String>,
}

struct OpenTag {
    name: String,
    attr_name: Option<String>,
    content_start: usize,
    depth: usize,
    /// A matching closing tag exists further on.
    closed_later: bool,
}

/// Parse a contiguous run of doc-line comments into a [`DocBlock`].
///
/// Markup problems are reported against the whole run.
pub fn parse(run: &[CommentSpan], warnings: &mut Vec<ParseWarning>) -> DocBlock {
    let Some(first) = run.first() else {
        return DocBlock::default();
    };
    let run_span = Span::new(first.span.start, run.last().map_or(first.span.end, |c| c.span.end));
    let mut warn = |kind: WarningKind| {
        warnings.push(ParseWarning {
            kind,
            span: run_span,
            line: first.line,
        })
    };

    let joined = run
        .iter()
        .map(|c| c.text.strip_prefix(' ').unwrap_or(&c.text))
        .collect::<Vec<_>>()
        .join("\n");

    let tags: Vec<TagMatch> = RE_TAG
        .captures_iter(&joined)
        .map(|caps| {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            TagMatch {
                start: whole.start,
                end: whole.end,
                closing: !caps[1].is_empty(),
                self_closing: !caps[4].is_empty(),
                name: caps[2].to_string(),
                attr_name: RE_NAME_ATTR.captures(&caps[3]).and_then(|a| {
                    a.get(1).or_else(|| a.get(2)).map(|m| m.as_str().to_string())
                }),
            }
        })
        .collect();

    let mut sections: Vec<DocSection> = Vec::new();
    let mut loose = String::new();
    let mut open: Option<OpenTag> = None;
    let mut cursor = 0;
    let mut i = 0;

    while i < tags.len() {
        let tag = &tags[i];

        if let Some(o) = open.as_mut() {
            if tag.name == o.name {
                if tag.closing {
                    if o.depth == 0 {
                        push_section(&mut sections, o, &joined[o.content_start..tag.start]);
                        open = None;
                        cursor = tag.end;
                    } else {
                        o.depth -= 1;
                    }
                } else if !tag.self_closing {
                    o.depth += 1;
                }
            } else if !o.closed_later
                && !tag.closing
                && !tag.self_closing
                && SECTION_TAGS.contains(&tag.name.as_str())
            {
                warn(WarningKind::UnclosedDocTag { tag: o.name.clone() });
                push_section(&mut sections, o, &joined[o.content_start..tag.start]);
                open = None;
                cursor = tag.start;
                // Reprocess this tag as a top-level one.
                continue;
            }
            i += 1;
            continue;
        }

        loose.push_str(&joined[cursor..tag.start]);
        cursor = tag.end;
        if tag.closing {
            warn(WarningKind::UnmatchedDocTag { tag: tag.name.clone() });
        } else if tag.self_closing {
            sections.push(DocSection {
                tag: DocTag::from_name(&tag.name),
                name: tag.attr_name.clone(),
                text: String::new(),
            });
        } else {
            open = Some(OpenTag {
                name: tag.name.clone(),
                attr_name: tag.attr_name.clone(),
                content_start: tag.end,
                depth: 0,
                closed_later: tags[i + 1..]
                    .iter()
                    .any(|t| t.closing && t.name == tag.name),
            });
        }
        i += 1;
    }

    match open {
        Some(o) => {
            warn(WarningKind::UnclosedDocTag { tag: o.name.clone() });
            push_section(&mut sections, &o, &joined[o.content_start..]);
        }
        None => loose.push_str(&joined[cursor..]),
    }

    // Untagged prose stands in for a missing <summary>.
    let loose = clean_text(&loose);
    if !loose.is_empty() && !sections.iter().any(|s| s.tag == DocTag::Summary) {
        sections.insert(
            0,
            DocSection {
                tag: DocTag::Summary,
                name: None,
                text: loose,
            },
        );
    }

    DocBlock { sections }
}

fn push_section(sections: &mut Vec<DocSection>, open: &OpenTag, content: &str) {
    sections.push(DocSection {
        tag: DocTag::from_name(&open.name),
        name: open.attr_name.clone(),
        text: clean_text(content),
    });
}

/// Drop blank leading/trailing lines, trailing whitespace and common indentation.
fn clean_text(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').map(|l| l.trim_end()).collect();
    let Some(first) = lines.iter().position(|l| !l.is_empty()) else {
        return String::new();
    };
    let last = lines.iter().rposition(|l| !l.is_empty()).unwrap_or(first);
    unindent(&lines[first..=last])
}

/// Remove the smallest leading indentation shared by all non-empty lines.
fn unindent(lines: &[&str]) -> String {
    let min_indent = lines
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|l| if l.len() >= min_indent { &l[min_indent..] } else { *l })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(lines: &[&str]) -> Vec<CommentSpan> {
        let mut offset = 0;
        lines
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let start = offset;
                offset += text.len() + 4;
                CommentSpan {
                    kind: CommentKind::DocLine,
                    text: text.to_string(),
                    span: Span::new(start, start + text.len() + 3),
                    line: i + 1,
                }
            })
            .collect()
    }

    fn parse_ok(lines: &[&str]) -> DocBlock {
        let mut warnings = Vec::new();
        let doc = parse(&run(lines), &mut warnings);
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        doc
    }

    fn returns(doc: &DocBlock) -> Option<&str> {
        doc.get("returns").next().map(|s| s.text.as_str())
    }

    #[test]
    fn summary_over_several_lines() {
        let doc = parse_ok(&[" <summary>", " Adds two numbers.", " </summary>"]);
        assert_eq!(doc.summary(), Some("Adds two numbers."));
        assert_eq!(doc.sections.len(), 1);
    }

    #[test]
    fn single_line_tags() {
        let doc = parse_ok(&[
            " <summary>Sum.</summary>",
            " <param name=\"a\">First</param>",
            " <param name='b'>Second</param>",
            " <typeparam name=\"T\">Element type</typeparam>",
            " <returns>The sum</returns>",
        ]);
        assert_eq!(doc.summary(), Some("Sum."));
        assert_eq!(
            doc.params().collect::<Vec<_>>(),
            vec![("a", "First"), ("b", "Second")]
        );
        assert_eq!(doc.type_params().collect::<Vec<_>>(), vec![("T", "Element type")]);
        assert_eq!(returns(&doc), Some("The sum"));
    }

    #[test]
    fn multi_line_body_keeps_newlines_and_relative_indent() {
        let doc = parse_ok(&[
            " <example>",
            " <code>",
            " var x = new Foo();",
            "     x.Run();",
            " </code>",
            " </example>",
        ]);
        assert_eq!(
            doc.example(),
            Some("<code>\nvar x = new Foo();\n    x.Run();\n</code>")
        );
    }

    #[test]
    fn inline_markup_is_preserved() {
        let doc = parse_ok(&[" <summary>Wraps <see cref=\"List{T}\"/> and <c>null</c>.</summary>"]);
        assert_eq!(
            doc.summary(),
            Some("Wraps <see cref=\"List{T}\"/> and <c>null</c>.")
        );
    }

    #[test]
    fn nested_same_name_tags() {
        let doc = parse_ok(&[" <remarks>outer <remarks>inner</remarks> tail</remarks>"]);
        assert_eq!(doc.remarks(), Some("outer <remarks>inner</remarks> tail"));
    }

    #[test]
    fn self_closing_section_tag_inside_summary() {
        let doc = parse_ok(&[" <summary>See <seealso cref=\"Other\"/> too.</summary>"]);
        assert_eq!(doc.summary(), Some("See <seealso cref=\"Other\"/> too."));
        assert_eq!(doc.sections.len(), 1);
    }

    #[test]
    fn unknown_tags_pass_through() {
        let doc = parse_ok(&[
            " <summary>S</summary>",
            " <exception cref=\"IOException\">On failure</exception>",
            " <inheritdoc/>",
        ]);
        let exc: Vec<_> = doc.get("exception").collect();
        assert_eq!(exc.len(), 1);
        assert_eq!(exc[0].text, "On failure");
        assert_eq!(exc[0].tag, DocTag::Other("exception".to_string()));
        assert_eq!(doc.get("inheritdoc").count(), 1);
    }

    #[test]
    fn untagged_text_becomes_summary() {
        let doc = parse_ok(&[" Just prose,", " over two lines."]);
        assert_eq!(doc.summary(), Some("Just prose,\nover two lines."));
    }

    #[test]
    fn unclosed_tag_runs_until_next_section() {
        let mut warnings = Vec::new();
        let doc = parse(
            &run(&[" <summary>", " Open summary", " <remarks>R</remarks>"]),
            &mut warnings,
        );
        assert_eq!(doc.summary(), Some("Open summary"));
        assert_eq!(doc.remarks(), Some("R"));
        assert_eq!(
            warnings[0].kind,
            WarningKind::UnclosedDocTag {
                tag: "summary".to_string()
            }
        );
    }

    #[test]
    fn unclosed_tag_runs_to_end() {
        let mut warnings = Vec::new();
        let doc = parse(&run(&[" <returns>", " the value"]), &mut warnings);
        assert_eq!(returns(&doc), Some("the value"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn stray_closing_tag_with_prose() {
        let mut warnings = Vec::new();
        let doc = parse(
            &run(&[" XML documentation comment for a class", " </summary>"]),
            &mut warnings,
        );
        assert_eq!(doc.summary(), Some("XML documentation comment for a class"));
        assert_eq!(
            warnings[0].kind,
            WarningKind::UnmatchedDocTag {
                tag: "summary".to_string()
            }
        );
        assert_eq!(warnings[0].line, 1);
    }

    #[test]
    fn empty_run() {
        let mut warnings = Vec::new();
        assert!(parse(&[], &mut warnings).is_empty());
    }
}
