//! Web search through DuckDuckGo's HTML endpoint (no API key needed).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::error::ToolError;
use super::traits::{string_arg, ArgSchema, Tool};
use crate::config::ToolsConfig;

pub const TOOL_NAME: &str = "duckduckgo_search";

static TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__a"[^>]*>(.*?)</a>"#).expect("valid title regex")
});
static SNIPPET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__snippet"[^>]*>(.*?)</a>"#).expect("valid snippet regex")
});
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)class="result__url"[^>]*>(.*?)</a>"#).expect("valid url regex")
});
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// A single search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    base_url: String,
    max_results: usize,
}

impl DuckDuckGoSearch {
    pub fn new(client: reqwest::Client, config: &ToolsConfig) -> Self {
        Self {
            client,
            base_url: config.search_base_url.trim_end_matches('/').to_string(),
            max_results: config.search_max_results,
        }
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ToolError> {
        let url = format!("{}/html/", self.base_url);
        debug!(%query, "duckduckgo search");
        let html = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_results(&html, self.max_results))
    }
}

#[async_trait::async_trait]
impl Tool for DuckDuckGoSearch {
    fn name(&self) -> &str {
        TOOL_NAME
    }

    fn description(&self) -> &str {
        "Useful for when you need to look up current information on the web. Input should be a search query string."
    }

    fn args(&self) -> Vec<ArgSchema> {
        vec![ArgSchema::required("query", "string", "The search query")]
    }

    async fn run(&self, input: Value) -> Result<String, ToolError> {
        let query = string_arg(TOOL_NAME, &input, "query")?;
        let hits = self.search(&query).await?;
        if hits.is_empty() {
            return Ok(format!("No results found for: {query}"));
        }
        let rendered: Vec<String> = hits
            .iter()
            .map(|hit| format!("{}\n{}\nURL: {}", hit.title, hit.snippet, hit.url))
            .collect();
        Ok(rendered.join("\n\n"))
    }
}

/// Pull up to `limit` hits out of a DuckDuckGo HTML results page.
pub fn parse_results(html: &str, limit: usize) -> Vec<SearchHit> {
    html.split("result__body")
        .skip(1)
        .filter_map(|chunk| {
            let title = capture_text(&TITLE_RE, chunk)?;
            if title.is_empty() {
                return None;
            }
            Some(SearchHit {
                title,
                snippet: capture_text(&SNIPPET_RE, chunk).unwrap_or_default(),
                url: capture_text(&URL_RE, chunk).unwrap_or_default(),
            })
        })
        .take(limit)
        .collect()
}

fn capture_text(re: &Regex, chunk: &str) -> Option<String> {
    let raw = re.captures(chunk)?.get(1)?.as_str();
    Some(html_decode(TAG_RE.replace_all(raw, "").trim()))
}

fn html_decode(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const PAGE: &str = r#"
        <div class="result results_links">
          <div class="links_main links_deep result__body">
            <h2 class="result__title"><a rel="nofollow" class="result__a" href="https://www.rust-lang.org/">Rust Programming <b>Language</b></a></h2>
            <a class="result__url" href="https://www.rust-lang.org/"> www.rust-lang.org </a>
            <a class="result__snippet" href="https://www.rust-lang.org/">A language empowering everyone to build reliable &amp; efficient software.</a>
          </div>
        </div>
        <div class="links_main links_deep result__body">
            <h2 class="result__title"><a class="result__a" href="https://en.wikipedia.org/wiki/Rust">Rust (programming language) - Wikipedia</a></h2>
            <a class="result__snippet" href="x">Rust is a general-purpose language.</a>
        </div>
    "#;

    fn config(base_url: String) -> ToolsConfig {
        ToolsConfig { search_base_url: base_url, ..ToolsConfig::default() }
    }

    #[test]
    fn parses_titles_snippets_and_urls() {
        let hits = parse_results(PAGE, 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Rust Programming Language");
        assert_eq!(hits[0].url, "www.rust-lang.org");
        assert_eq!(
            hits[0].snippet,
            "A language empowering everyone to build reliable & efficient software."
        );
        assert_eq!(hits[1].url, "");
    }

    #[test]
    fn respects_result_limit() {
        assert_eq!(parse_results(PAGE, 1).len(), 1);
        assert!(parse_results("<html></html>", 5).is_empty());
    }

    #[tokio::test]
    async fn run_queries_the_html_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/html/")
            .match_query(Matcher::UrlEncoded("q".into(), "rust language".into()))
            .with_status(200)
            .with_body(PAGE)
            .create_async()
            .await;

        let tool = DuckDuckGoSearch::new(reqwest::Client::new(), &config(server.url()));
        let out = tool.run(json!({ "query": "rust language" })).await.unwrap();

        mock.assert_async().await;
        assert!(out.starts_with("Rust Programming Language\n"));
        assert!(out.contains("URL: www.rust-lang.org"));
    }

    #[tokio::test]
    async fn run_reports_empty_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/html/")
            .match_query(Matcher::Any)
            .with_body("<html>nothing</html>")
            .create_async()
            .await;

        let tool = DuckDuckGoSearch::new(reqwest::Client::new(), &config(server.url()));
        let out = tool.run(json!({ "query": "zzzz" })).await.unwrap();
        assert_eq!(out, "No results found for: zzzz");
    }

    #[tokio::test]
    async fn run_rejects_missing_query() {
        let tool = DuckDuckGoSearch::new(reqwest::Client::new(), &ToolsConfig::default());
        let err = tool.run(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::ParamsNotMatched(_)));
    }
}
