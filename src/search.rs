//! Result extraction for the search provider's lite HTML page.
//!
//! The page lists each hit as an `<a class="result-link">` followed, somewhere
//! later in the document, by a `<td class="result-snippet">`. Links are wrapped
//! in a provider redirect (`//duckduckgo.com/l/?uddg=<percent-encoded url>&...`)
//! which is unwrapped here.
//!
//! Extraction only talks to the [`MarkupDocument`] trait; [`HtmlDocument`] is
//! the `scraper`-backed implementation.
use percent_encoding::percent_decode_str;
use scraper::{ElementRef, Html, Selector};

use crate::config::{REDIRECT_WRAPPER, SEARCH_URL};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

/// An element name plus a class it must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub tag: &'static str,
    pub class: &'static str,
}

pub const RESULT_LINK: Marker = Marker {
    tag: "a",
    class: "result-link",
};

pub const RESULT_SNIPPET: Marker = Marker {
    tag: "td",
    class: "result-snippet",
};

/// An element found by marker, detached from the document it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marked {
    /// Index in document order; only meaningful for comparing within one document.
    pub position: usize,
    pub text: String,
    pub attrs: Vec<(String, String)>,
}

impl Marked {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

pub trait MarkupDocument {
    /// All elements matching `marker`, in document order.
    fn select(&self, marker: &Marker) -> Vec<Marked>;

    /// Text of the first element matching `marker` that comes after `position`.
    fn text_after(&self, position: usize, marker: &Marker) -> Option<String> {
        first_after(&self.select(marker), position).map(|m| m.text.clone())
    }
}

/// First of `marked` (in document order) that comes after `position`.
fn first_after(marked: &[Marked], position: usize) -> Option<&Marked> {
    let i = marked.partition_point(|m| m.position <= position);
    marked.get(i)
}

pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(source: &str) -> Self {
        Self {
            html: Html::parse_document(source),
        }
    }
}

impl MarkupDocument for HtmlDocument {
    fn select(&self, marker: &Marker) -> Vec<Marked> {
        let selector = match Selector::parse(&format!("{}.{}", marker.tag, marker.class)) {
            Ok(s) => s,
            Err(e) => {
                log::warn!("bad selector for {:?}: {:?}", marker, e);
                return Vec::new();
            }
        };
        self.html
            .tree
            .root()
            .descendants()
            .enumerate()
            .filter_map(|(position, node)| {
                let el = ElementRef::wrap(node)?;
                selector.matches(&el).then(|| Marked {
                    position,
                    text: element_text(&el),
                    attrs: el
                        .value()
                        .attrs()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                })
            })
            .collect()
    }
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Lite search URL for `phrase`. Only spaces are encoded (as `+`).
pub fn search_url(phrase: &str) -> String {
    format!("{}{}", SEARCH_URL, phrase.replace(' ', "+"))
}

pub fn extract(html: &str, count: usize) -> Vec<SearchResult> {
    extract_from(&HtmlDocument::parse(html), count)
}

pub fn extract_from(doc: &impl MarkupDocument, count: usize) -> Vec<SearchResult> {
    let snippets = doc.select(&RESULT_SNIPPET);
    doc.select(&RESULT_LINK)
        .into_iter()
        .take(count)
        .map(|anchor| SearchResult {
            link: unwrap_link(anchor.attr("href").unwrap_or_default()),
            snippet: first_after(&snippets, anchor.position)
                .map(|m| m.text.clone())
                .unwrap_or_default(),
            title: anchor.text,
        })
        .collect()
}

/// Real destination of a provider redirect link; other links pass through.
pub fn unwrap_link(href: &str) -> String {
    match href.strip_prefix(REDIRECT_WRAPPER) {
        Some(rest) => {
            let encoded = rest.split('&').next().unwrap_or(rest);
            percent_decode_str(encoded).decode_utf8_lossy().into_owned()
        }
        None => href.to_string(),
    }
}
