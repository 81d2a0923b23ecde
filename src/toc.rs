//! GitHub-flavored markdown anchor/slug generation.

use std::collections::HashMap;

/// Generate a table-of-contents link for a heading.
pub fn render_toc_link(text: &str, slug: &str) -> String {
    format!("[{}](#{})", escape_link_text(text), slug)
}

/// Generate a TOC list item.
pub fn render_toc_item(text: &str, slug: &str) -> String {
    format!("* {}", render_toc_link(text, slug))
}

/// GitHub heading anchor slug generation.
///
/// - lowercase
/// - remove all chars that aren't alphanumeric, underscore, space, or hyphen
/// - replace spaces with hyphens
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == '_' || c == ' ' || c == '-' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

/// Hands out unique anchors the way GitHub does for repeated headings:
/// the second `Foo` becomes `foo-1`, the third `foo-2`.
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    pub fn slug(&mut self, text: &str) -> String {
        let base = github_slug(text);
        let count = self.seen.entry(base.clone()).or_insert(0);
        let slug = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        slug
    }
}

fn escape_link_text(text: &str) -> String {
    text.replace('[', "\\[").replace(']', "\\]")
}
