//! `web_search` tool: search the web using the DuckDuckGo Instant Answer
//! API.
//!
//! Gives the hypothesis and stewardship panelists a zero-configuration
//! evidence-gathering capability. The Instant Answer API requires no API
//! key and returns abstracts, direct answers, definitions, and related
//! topics rather than full result listings.

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

/// Canonical tool name offered to the model.
pub const WEB_SEARCH: &str = "web_search";

/// DuckDuckGo Instant Answer API endpoint (no API key required).
const DDG_API_URL: &str = "https://api.duckduckgo.com/";

/// Cap on related topics folded into the result list.
const MAX_RELATED_TOPICS: usize = 10;

/// Errors from the search tool
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search request failed: {0}")]
    Request(String),

    #[error("search API returned error status: {0}")]
    Status(reqwest::StatusCode),

    #[error("failed to parse search results: {0}")]
    Parse(String),
}

/// One search result row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

/// JSON Schema for the tool's parameters, declared to the model.
pub fn web_search_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": "The search query"
            }
        },
        "required": ["query"]
    })
}

/// Query DuckDuckGo and return the ordered result rows.
pub async fn search(client: &reqwest::Client, query: &str) -> Result<Vec<SearchHit>, SearchError> {
    let response = client
        .get(DDG_API_URL)
        .query(&[
            ("q", query),
            ("format", "json"),
            ("no_html", "1"),
            ("skip_disambig", "1"),
        ])
        .header("User-Agent", "dx-panel/0.1 (Agent Tool)")
        .send()
        .await
        .map_err(|e| SearchError::Request(e.to_string()))?;

    if !response.status().is_success() {
        return Err(SearchError::Status(response.status()));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| SearchError::Parse(e.to_string()))?;

    Ok(parse_results(&body))
}

/// Extract hits from the Instant Answer payload: abstract, direct answer,
/// definition, then related topics, in that order.
fn parse_results(data: &Value) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    if let Some(abstract_text) = data["AbstractText"].as_str()
        && !abstract_text.is_empty()
    {
        hits.push(SearchHit {
            title: data["AbstractSource"].as_str().unwrap_or("Summary").to_string(),
            snippet: abstract_text.to_string(),
            url: data["AbstractURL"].as_str().unwrap_or("").to_string(),
        });
    }

    if let Some(answer) = data["Answer"].as_str()
        && !answer.is_empty()
    {
        hits.push(SearchHit {
            title: "Instant Answer".to_string(),
            snippet: answer.to_string(),
            url: data["AbstractURL"].as_str().unwrap_or("").to_string(),
        });
    }

    if let Some(definition) = data["Definition"].as_str()
        && !definition.is_empty()
    {
        hits.push(SearchHit {
            title: format!(
                "Definition ({})",
                data["DefinitionSource"].as_str().unwrap_or("Unknown")
            ),
            snippet: definition.to_string(),
            url: data["DefinitionURL"].as_str().unwrap_or("").to_string(),
        });
    }

    if let Some(topics) = data["RelatedTopics"].as_array() {
        for topic in topics.iter().take(MAX_RELATED_TOPICS) {
            let Some(text) = topic["Text"].as_str().filter(|t| !t.is_empty()) else {
                // Nested topic groups carry no direct text
                continue;
            };
            // Topic text reads "Title - description"
            let (title, snippet) = match text.split_once(" - ") {
                Some((title, snippet)) => (title.to_string(), snippet.to_string()),
                None => (text.to_string(), String::new()),
            };
            hits.push(SearchHit {
                title,
                snippet,
                url: topic["FirstURL"].as_str().unwrap_or("").to_string(),
            });
        }
    }

    hits
}

/// Render hits as markdown for a tool-result message.
pub fn render_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No instant answer available for: {}", query);
    }

    let mut lines = vec![format!("Search results for: {}", query)];
    for hit in hits {
        let mut line = format!("- **{}**", hit.title);
        if !hit.snippet.is_empty() {
            line.push_str(&format!(" - {}", hit.snippet));
        }
        if !hit.url.is_empty() {
            line.push_str(&format!(" ({})", hit.url));
        }
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_results_with_abstract() {
        let data = serde_json::json!({
            "AbstractText": "Pneumonia is an inflammatory condition of the lung.",
            "AbstractSource": "Wikipedia",
            "AbstractURL": "https://en.wikipedia.org/wiki/Pneumonia",
            "Answer": "",
            "Definition": "",
            "RelatedTopics": []
        });

        let hits = parse_results(&data);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Wikipedia");
        assert!(hits[0].snippet.contains("inflammatory condition"));
    }

    #[test]
    fn test_parse_results_empty() {
        let data = serde_json::json!({
            "AbstractText": "",
            "Answer": "",
            "Definition": "",
            "RelatedTopics": []
        });

        let hits = parse_results(&data);
        assert!(hits.is_empty());
        assert!(render_hits("obscure query", &hits).contains("No instant answer"));
    }

    #[test]
    fn test_parse_results_splits_related_topics() {
        let data = serde_json::json!({
            "AbstractText": "",
            "Answer": "",
            "Definition": "",
            "RelatedTopics": [
                {
                    "Text": "Procalcitonin - A biomarker for bacterial infection",
                    "FirstURL": "https://example.com/pct"
                },
                {
                    "Text": "Bare topic without separator",
                    "FirstURL": "https://example.com/bare"
                }
            ]
        });

        let hits = parse_results(&data);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Procalcitonin");
        assert_eq!(hits[0].snippet, "A biomarker for bacterial infection");
        assert_eq!(hits[1].title, "Bare topic without separator");
        assert!(hits[1].snippet.is_empty());
    }

    #[test]
    fn test_render_hits_markdown() {
        let hits = vec![SearchHit {
            title: "Wikipedia".to_string(),
            snippet: "Pneumonia is an inflammatory condition.".to_string(),
            url: "https://en.wikipedia.org/wiki/Pneumonia".to_string(),
        }];
        let rendered = render_hits("pneumonia", &hits);
        assert!(rendered.contains("Search results for: pneumonia"));
        assert!(rendered.contains("**Wikipedia**"));
        assert!(rendered.contains("wiki/Pneumonia"));
    }
}
