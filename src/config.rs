//! Runtime configuration.
//!
//! Loaded from a TOML file (optional) and then overridden by environment
//! variables:
//! - `RESEARCH_AGENT_PROVIDER` - `openai` or `ollama`.
//! - `RESEARCH_AGENT_MODEL` - model name for the selected provider.
//! - `OPENAI_API_KEY` - API key for the OpenAI provider.
//! - `OPENAI_BASE_URL` - base URL of an OpenAI-compatible server.
//! - `OLLAMA_HOST` - Ollama host, e.g. `http://localhost`.
//! - `RESEARCH_AGENT_OUTPUT` - file research records are appended to.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Serialize, Deserialize};

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "research-agent.toml";
pub const DEFAULT_OUTPUT_FILE: &str = "research_output.txt";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Missing configuration: {0}")]
    MissingConfig(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAI,
    Ollama,
}

impl FromStr for Provider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "ollama" => Ok(Provider::Ollama),
            other => Err(ConfigError::InvalidConfig(format!("unknown provider '{other}'"))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::OpenAI => f.write_str("openai"),
            Provider::Ollama => f.write_str("ollama"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: Provider,
    /// Model name; each provider has its own default when unset.
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub ollama_host: String,
    pub ollama_port: u16,
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            model: None,
            api_key: None,
            base_url: None,
            ollama_host: "http://localhost".to_string(),
            ollama_port: 11434,
            temperature: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub max_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { max_iterations: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub search_base_url: String,
    pub search_max_results: usize,
    pub wiki_base_url: String,
    pub wiki_top_k_results: usize,
    pub wiki_doc_content_chars_max: usize,
    pub http_timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            search_base_url: "https://html.duckduckgo.com".to_string(),
            search_max_results: 5,
            wiki_base_url: "https://en.wikipedia.org".to_string(),
            wiki_top_k_results: 1,
            wiki_doc_content_chars_max: 100,
            http_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub file: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub agent: AgentConfig,
    pub tools: ToolsConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists, then
    /// apply environment overrides and validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Override fields from environment variables looked up through `var`.
    pub fn apply_env<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        if let Some(provider) = var("RESEARCH_AGENT_PROVIDER") {
            self.llm.provider = provider.parse()?;
        }
        if let Some(model) = var("RESEARCH_AGENT_MODEL") {
            self.llm.model = Some(model);
        }
        if let Some(key) = var("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = var("OPENAI_BASE_URL") {
            self.llm.base_url = Some(url);
        }
        if let Some(host) = var("OLLAMA_HOST") {
            self.llm.ollama_host = host;
        }
        if let Some(file) = var("RESEARCH_AGENT_OUTPUT") {
            self.output.file = PathBuf::from(file);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_iterations == 0 {
            return Err(ConfigError::InvalidConfig(
                "agent.max_iterations must be at least 1".into(),
            ));
        }
        if self.tools.wiki_top_k_results == 0 {
            return Err(ConfigError::InvalidConfig(
                "tools.wiki_top_k_results must be at least 1".into(),
            ));
        }
        if self.output.file.as_os_str().is_empty() {
            return Err(ConfigError::InvalidConfig("output.file must not be empty".into()));
        }
        if self.llm.provider == Provider::OpenAI
            && self.llm.api_key.is_none()
            && self.llm.base_url.is_none()
        {
            return Err(ConfigError::MissingConfig(
                "OPENAI_API_KEY (or llm.api_key) for the openai provider".into(),
            ));
        }
        Ok(())
    }
}
