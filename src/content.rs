use scraper::{Html, Node};
use serde_json::Value;

/// Display-ready form of a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Json(Value),
    Text(String),
}

impl Content {
    pub fn render(&self) -> String {
        match self {
            Content::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            Content::Text(text) => text.clone(),
        }
    }
}

/// Picks JSON or HTML handling from the content type. Bodies that claim JSON
/// but do not parse fall back to text extraction.
pub fn process(body: &str, content_type: &str) -> Content {
    if content_type.contains("application/json") {
        match serde_json::from_str(body) {
            Ok(value) => return Content::Json(value),
            Err(e) => log::warn!("body claims JSON but does not parse ({}); showing as text", e),
        }
    }
    Content::Text(html_to_text(body))
}

// Subtrees whose text never shows on a rendered page.
const HIDDEN: [&str; 4] = ["script", "style", "noscript", "template"];

/// Visible text nodes of an HTML document, each trimmed, joined by single spaces.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts = Vec::new();
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| match a.value() {
            Node::Element(el) => HIDDEN.contains(&el.name()),
            _ => false,
        });
        if hidden {
            continue;
        }
        let text = text.trim();
        if !text.is_empty() {
            parts.push(text);
        }
    }
    parts.join(" ")
}
