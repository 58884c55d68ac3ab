pub mod llm;
pub mod tools;
pub mod agent;
pub mod message;
pub mod config;
pub mod error;
pub mod prompt;
pub mod research;
pub mod session;

// re-export the proc-macro attribute for convenient use: `use research_agent::tool;`
pub use research_agent_macros::tool;

// paths used by `#[tool]` expansions
pub use async_trait;
pub use serde;
pub use serde_json;

pub use error::{Error, Result};
