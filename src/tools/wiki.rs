//! Wikipedia lookup through the MediaWiki action API.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::error::ToolError;
use super::traits::{string_arg, ArgSchema, Tool};
use crate::config::ToolsConfig;

pub const TOOL_NAME: &str = "wikipedia";
pub const NO_RESULT: &str = "No good Wikipedia Search Result was found";
const MAX_QUERY_CHARS: usize = 300;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQuery>,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    query: Option<ExtractQuery>,
}

#[derive(Debug, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    extract: Option<String>,
}

pub struct Wikipedia {
    client: reqwest::Client,
    api_url: String,
    top_k_results: usize,
    doc_content_chars_max: usize,
}

impl Wikipedia {
    pub fn new(client: reqwest::Client, config: &ToolsConfig) -> Self {
        Self {
            client,
            api_url: format!("{}/w/api.php", config.wiki_base_url.trim_end_matches('/')),
            top_k_results: config.wiki_top_k_results,
            doc_content_chars_max: config.wiki_doc_content_chars_max,
        }
    }

    /// Titles of the best `top_k_results` matches for `query`.
    async fn search_titles(&self, query: &str) -> Result<Vec<String>, ToolError> {
        let query: String = query.chars().take(MAX_QUERY_CHARS).collect();
        let limit = self.top_k_results.to_string();
        let response: SearchResponse = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query.as_str()),
                ("srlimit", limit.as_str()),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response
            .query
            .map(|q| q.search.into_iter().map(|hit| hit.title).take(self.top_k_results).collect())
            .unwrap_or_default())
    }

    /// Intro extract of the page titled `title`, if it exists.
    async fn page_summary(&self, title: &str) -> Result<Option<Page>, ToolError> {
        let response: ExtractResponse = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
                ("format", "json"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response
            .query
            .and_then(|q| q.pages.into_values().find(|page| page.extract.is_some())))
    }

    /// `Page: <title>\nSummary: <extract>` for each hit, joined and cut to
    /// `doc_content_chars_max` characters.
    pub async fn lookup(&self, query: &str) -> Result<String, ToolError> {
        debug!(%query, "wikipedia lookup");
        let mut summaries = Vec::new();
        for title in self.search_titles(query).await? {
            if let Some(page) = self.page_summary(&title).await? {
                let extract = page.extract.unwrap_or_default();
                summaries.push(format!("Page: {}\nSummary: {}", page.title, extract));
            }
        }
        if summaries.is_empty() {
            return Ok(NO_RESULT.to_string());
        }
        Ok(summaries.join("\n\n").chars().take(self.doc_content_chars_max).collect())
    }
}

#[async_trait::async_trait]
impl Tool for Wikipedia {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "A wrapper around Wikipedia. Useful for when you need to answer general questions about \
         people, places, companies, facts, historical events, or other subjects. Input should be a search query."
    }

    fn args(&self) -> Vec<ArgSchema> {
        vec![ArgSchema::required("query", "string", "What to look up on Wikipedia")]
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let query = string_arg(TOOL_NAME, &input, "query")?;
        self.lookup(&query).await
    }
}
