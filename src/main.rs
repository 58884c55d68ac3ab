//! research-agent: ask a research question once, or chat with the agent.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use research_agent::config::Config;
use research_agent::research::DisplayMode;
use research_agent::session::Session;

#[derive(Parser, Debug)]
#[command(name = "research-agent", version, about)]
struct Cli {
    /// TOML config file (defaults to ./research-agent.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log agent and tool activity at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Research one query and print the raw and parsed answer
    Ask {
        /// The query; prompted for on stdin when omitted
        query: Option<String>,
    },
    /// Interactive conversation; type `exit` or `quit` to leave
    Chat,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "research_agent=debug" } else { "research_agent=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let mut stdout = tokio::io::stdout();

    match cli.command.unwrap_or(Command::Ask { query: None }) {
        Command::Ask { query } => {
            let query = match query {
                Some(query) => query,
                None => prompt_line("Enter a research Query: ").await?,
            };
            anyhow::ensure!(!query.is_empty(), "no research query given");
            let mut session = Session::from_config(&config, DisplayMode::SingleShot)?;
            session.run_single(&query, &mut stdout).await?;
        }
        Command::Chat => {
            let mut session = Session::from_config(&config, DisplayMode::Conversational)?;
            let stdin = BufReader::new(tokio::io::stdin());
            session.run_repl(stdin, &mut stdout).await?;
        }
    }
    Ok(())
}
