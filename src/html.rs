//! Element lookup over parsed HTML.
//!
//! Attribute filters follow the usual soup semantics: `class` matches either
//! the whole attribute string or a single class token, anything else must be
//! equal. Searching inside an element never matches the element itself.

use scraper::{ElementRef, Html};
use tracing::error;

use crate::error::{ParserError, Result};

pub type Attrs<'f> = &'f [(&'f str, &'f str)];

/// Something that can be searched for elements, in document order.
pub trait Scope<'a> {
    fn elements(self) -> impl Iterator<Item = ElementRef<'a>>;
}

impl<'a> Scope<'a> for &'a Html {
    fn elements(self) -> impl Iterator<Item = ElementRef<'a>> {
        self.tree.root().descendants().filter_map(ElementRef::wrap)
    }
}

impl<'a> Scope<'a> for ElementRef<'a> {
    fn elements(self) -> impl Iterator<Item = ElementRef<'a>> {
        self.descendants().skip(1).filter_map(ElementRef::wrap)
    }
}

/// First element named `tag` matching `attrs`, or `TagNotFound`.
pub fn find_tag<'a>(scope: impl Scope<'a>, tag: &str, attrs: Attrs) -> Result<ElementRef<'a>> {
    scope
        .elements()
        .find(|el| matches(el, tag, attrs))
        .ok_or_else(|| tag_not_found(tag, attrs))
}

pub fn find_all<'a>(scope: impl Scope<'a>, tag: &str, attrs: Attrs) -> Vec<ElementRef<'a>> {
    scope
        .elements()
        .filter(|el| matches(el, tag, attrs))
        .collect()
}

/// All descendant text, concatenated as-is.
pub fn text_of(el: ElementRef) -> String {
    el.text().collect()
}

pub fn attr<'a>(el: ElementRef<'a>, name: &str) -> Result<&'a str> {
    el.value()
        .attr(name)
        .ok_or_else(|| ParserError::MissingAttribute {
            tag: el.value().name().to_string(),
            attr: name.to_string(),
        })
}

/// Next sibling that is an element, skipping text and comments.
pub fn next_element_sibling(el: ElementRef) -> Option<ElementRef> {
    el.next_siblings().find_map(ElementRef::wrap)
}

pub fn tag_not_found(tag: &str, attrs: Attrs) -> ParserError {
    let attrs = describe(attrs);
    error!(tag, attrs = %attrs, "Tag not found");
    ParserError::TagNotFound {
        tag: tag.to_string(),
        attrs,
    }
}

fn matches(el: &ElementRef, tag: &str, attrs: Attrs) -> bool {
    let value = el.value();
    value.name() == tag
        && attrs.iter().all(|(name, expected)| match value.attr(name) {
            Some(actual) if *name == "class" => {
                actual == *expected || actual.split_whitespace().any(|c| c == *expected)
            }
            Some(actual) => actual == *expected,
            None => false,
        })
}

fn describe(attrs: Attrs) -> String {
    let inner = attrs
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, v))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{{{}}}", inner)
}

// ── Tests ──
