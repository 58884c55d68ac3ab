pub mod traits;
pub mod schema;
pub mod error;
pub mod search;
pub mod wiki;
pub mod save;
mod macros;

use std::sync::Arc;
use std::time::Duration;

use crate::config::ToolsConfig;
use crate::research::sink::Sink;
use error::ToolError;
use traits::Tool;

const USER_AGENT: &str = concat!("research-agent/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for the network-backed tools.
pub fn http_client(config: &ToolsConfig) -> Result<reqwest::Client, ToolError> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;
    Ok(client)
}

/// The tool set offered to the research agent: web search, Wikipedia and
/// save-to-file (writing into `sink`).
pub fn research_tools(
    config: &ToolsConfig,
    sink: Arc<dyn Sink>,
) -> Result<Vec<Arc<dyn Tool>>, ToolError> {
    let client = http_client(config)?;
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(search::DuckDuckGoSearch::new(client.clone(), config)),
        Arc::new(wiki::Wikipedia::new(client, config)),
        Arc::new(save::SaveToTxt::new(sink)),
    ];
    Ok(tools)
}
