//! Markup loading and text helpers
//!
//! html5ever recovers from any malformed input, so loading never fails.

use scraper::{ElementRef, Html, Node};
use tracing::debug;

/// A parsed page
pub struct Markup {
    document: Html,
}

impl Markup {
    pub fn parse(raw: &str) -> Self {
        let document = Html::parse_document(raw);
        if !document.errors.is_empty() {
            debug!("Markup recovered from {} parse errors", document.errors.len());
        }
        Self { document }
    }

    pub const fn document(&self) -> &Html {
        &self.document
    }
}

/// Non-empty, trimmed text fragments below an element
pub fn text_fragments<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    element.text().map(str::trim).filter(|s| !s.is_empty())
}

/// Text fragments joined with single spaces
pub fn joined_text(element: ElementRef<'_>) -> String {
    text_fragments(element).collect::<Vec<_>>().join(" ")
}

/// Whole-document text, used for fragment searches
pub fn document_text(html: &Html) -> String {
    html.root_element().text().collect::<String>()
}

/// An element with no attributes at all
pub fn is_bare(element: &ElementRef<'_>) -> bool {
    element.value().attrs().next().is_none()
}

/// Text of a node if it is a text node
pub fn node_text<'a>(node: &'a Node) -> Option<&'a str> {
    match node {
        Node::Text(text) => Some(&**text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn test_malformed_markup_still_loads() {
        let markup = Markup::parse("<div><p>unclosed <b>bold</div></span>");
        let selector = Selector::parse("b").unwrap();
        assert!(markup.document().select(&selector).next().is_some());

        let empty = Markup::parse("");
        assert!(document_text(empty.document()).trim().is_empty());
    }

    #[test]
    fn test_joined_text_skips_blank_fragments() {
        let markup = Markup::parse("<div id=\"x\">\n  <span> Hello </span>\n\n <b>world</b> </div>");
        let selector = Selector::parse("#x").unwrap();
        let element = markup.document().select(&selector).next().unwrap();
        assert_eq!(joined_text(element), "Hello world");
        assert!(!is_bare(&element));
    }
}
