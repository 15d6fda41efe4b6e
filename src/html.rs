//! HTML tokenizer collaborator: fetch an article body and reduce it to the
//! lowercase tokens the index stores.

use reqwest::Client;
use scraper::{Html, Node};

use crate::errors::IngestError;

/// Fetch the article at `url` and tokenize its body. The vector may be
/// empty for pages with no readable text.
pub async fn fetch_tokens(client: &Client, url: &str) -> Result<Vec<String>, IngestError> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|e| IngestError::Fetch(url.to_string(), e))?;
    let body = response
        .text()
        .await
        .map_err(|e| IngestError::Fetch(url.to_string(), e))?;
    Ok(tokenize(&body))
}

/// Lowercase words from the document's visible text, split on every
/// non-alphanumeric boundary. Script, style, and noscript subtrees carry no
/// readable prose and are skipped.
pub fn tokenize(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut tokens = Vec::new();
    for node in document.root_element().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(element) => {
                matches!(element.name(), "script" | "style" | "noscript")
            }
            _ => false,
        });
        if hidden {
            continue;
        }
        for word in text.split(|c: char| !c.is_alphanumeric()) {
            if !word.is_empty() {
                tokens.push(word.to_lowercase());
            }
        }
    }
    tokens
}
