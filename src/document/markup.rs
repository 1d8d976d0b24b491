//! Visible text from HTML and XML documents

use scraper::{ElementRef, Html, Node, Selector};

const SKIP_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg", "head"];

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "td", "th", "section",
    "article", "table", "blockquote", "pre",
];

/// Extracts the visible text of a markup document
///
/// Script and style subtrees are dropped, block elements become line breaks,
/// and runs of whitespace are collapsed.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut buf = String::with_capacity(html.len() / 2);
    match Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next())
    {
        Some(body) => collect_text(&body, &mut buf),
        None => collect_text(&document.root_element(), &mut buf),
    }

    collapse_whitespace(&buf)
}

fn collect_text(element: &ElementRef<'_>, buf: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => buf.push_str(text),
            Node::Element(el) => {
                let tag = el.name();
                if SKIP_TAGS.contains(&tag) {
                    continue;
                }
                if BLOCK_TAGS.contains(&tag) {
                    buf.push('\n');
                }
                if let Some(child_ref) = ElementRef::wrap(child) {
                    collect_text(&child_ref, buf);
                }
            }
            _ => {}
        }
    }
}

/// Collapses whitespace runs to one space, or one newline if the run spans lines
fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_space = false;
    let mut newlines = 0u32;

    for ch in text.chars() {
        if ch == '\n' {
            newlines += 1;
            pending_space = false;
        } else if ch.is_whitespace() {
            pending_space = true;
        } else {
            if !result.is_empty() {
                if newlines > 0 {
                    result.push('\n');
                } else if pending_space {
                    result.push(' ');
                }
            }
            newlines = 0;
            pending_space = false;
            result.push(ch);
        }
    }

    result
}
