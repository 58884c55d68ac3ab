//! Drivers that connect the agent to the turn handler: one-shot research and
//! an interactive REPL.

use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::agent::traits::AgentRunner;
use crate::agent::types::{Agent, AgentResult};
use crate::config::{Config, LlmConfig, Provider};
use crate::error::Result;
use crate::llm::ollama::{self, ModelOptions, Ollama};
use crate::llm::openai::{self, CompletionOptions, OpenAI};
use crate::llm::traits::LLM;
use crate::message::Message;
use crate::prompt;
use crate::research::{DisplayMode, DisplayResult, Sink, TextFileSink, TurnHandler};
use crate::tools;

/// Result of one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub agent: AgentResult,
    pub display: DisplayResult,
}

pub struct Session {
    agent: Agent,
    handler: TurnHandler,
    history: Vec<Message>,
}

/// Build the chat model selected by `config`.
pub fn build_llm(config: &LlmConfig) -> Arc<dyn LLM> {
    match config.provider {
        Provider::OpenAI => {
            let mut client_config = OpenAIConfig::new();
            if let Some(key) = &config.api_key {
                client_config = client_config.with_api_key(key.clone());
            }
            if let Some(url) = &config.base_url {
                client_config = client_config.with_api_base(url.clone());
            }
            let options = CompletionOptions {
                model: config.model.clone().unwrap_or_else(|| openai::DEFAULT_MODEL.to_string()),
                temperature: config.temperature,
                ..CompletionOptions::default()
            };
            Arc::new(OpenAI::with_config(client_config).with_options(options))
        }
        Provider::Ollama => {
            let mut llm = Ollama::connect(config.ollama_host.clone(), config.ollama_port)
                .with_model(
                    config.model.clone().unwrap_or_else(|| ollama::DEFAULT_MODEL.to_string()),
                );
            if let Some(temperature) = config.temperature {
                llm = llm.with_options(ModelOptions::default().temperature(temperature));
            }
            Arc::new(llm)
        }
    }
}

fn is_exit(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "exit" | "quit")
}

impl Session {
    pub fn new(agent: Agent, handler: TurnHandler) -> Self {
        Self {
            agent,
            handler,
            history: Vec::new(),
        }
    }

    /// Wire the configured model, tools and output file together.
    pub fn from_config(config: &Config, mode: DisplayMode) -> Result<Self> {
        let llm = build_llm(&config.llm);
        let sink: Arc<dyn Sink> = Arc::new(TextFileSink::new(&config.output.file));

        let mut agent = Agent::new(
            format!("research-{}", config.llm.provider),
            llm,
            Some(config.agent.max_iterations),
        );
        agent.set_system_prompt(prompt::system_prompt(mode));
        agent.register_tools(tools::research_tools(&config.tools, sink.clone())?);

        info!(
            provider = %config.llm.provider,
            output = %config.output.file.display(),
            ?mode,
            "session ready"
        );
        Ok(Self::new(agent, TurnHandler::new(sink, mode)))
    }

    pub fn mode(&self) -> DisplayMode {
        self.handler.mode()
    }

    /// Earlier turns replayed to the model (conversational mode only).
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Run the agent on `query` and post-process its reply.
    pub async fn ask(&mut self, query: &str) -> Result<TurnOutcome> {
        let mode = self.mode();
        let prompt = prompt::user_prompt(mode, query);
        let agent = self.agent.call_llm(&self.history, &prompt).await?;
        let display = self.handler.handle_turn(&agent.generation);

        if mode == DisplayMode::Conversational {
            self.history.push(Message::user(prompt));
            self.history.push(Message::assistant(agent.generation.clone()));
        }
        Ok(TurnOutcome { agent, display })
    }

    /// Answer a single query and print the raw output, parsed record and
    /// save status.
    pub async fn run_single<W>(&mut self, query: &str, out: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let outcome = self.ask(query).await?;
        let mut text = format!("\n--- RAW MODEL OUTPUT ---\n{}\n", outcome.display.display);
        for notice in outcome.display.notices(self.mode()) {
            text.push_str(&format!("\n{notice}\n"));
        }
        out.write_all(text.as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }

    /// Read queries line by line until `exit`/`quit` or end of input. A
    /// failing turn is reported and the loop goes on.
    pub async fn run_repl<R, W>(&mut self, input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        out.write_all(b"Research assistant ready. Type 'exit' or 'quit' to leave.\n").await?;
        loop {
            out.write_all(b"\nYou: ").await?;
            out.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if is_exit(line) {
                out.write_all(b"Goodbye!\n").await?;
                break;
            }

            let text = match self.ask(line).await {
                Ok(outcome) => {
                    let mut text = format!("Assistant: {}\n", outcome.display.display);
                    for notice in outcome.display.notices(self.mode()) {
                        text.push_str(&format!("[{notice}]\n"));
                    }
                    text
                }
                Err(err) => {
                    warn!(error = %err, "turn failed");
                    format!("Error: {err}\n")
                }
            };
            out.write_all(text.as_bytes()).await?;
        }
        out.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::scripted::ScriptedLLM;
    use crate::research::MemorySink;

    const SAVED: &str = "Saved it.\n```json\n{\"topic\":\"tides\",\"summary\":\"The moon pulls the sea.\",\"sources\":[\"https://en.wikipedia.org/wiki/Tide\"],\"tools_used\":[\"wikipedia\",\"save_to_txt_file\"]}\n```";

    fn session(
        replies: &[&str],
        mode: DisplayMode,
    ) -> (Arc<ScriptedLLM>, Arc<MemorySink>, Session) {
        let llm = Arc::new(ScriptedLLM::new(replies.iter().copied()));
        let sink = Arc::new(MemorySink::named("research_output.txt"));
        let agent = Agent::new("test", llm.clone(), Some(3));
        (llm, sink.clone(), Session::new(agent, TurnHandler::new(sink, mode)))
    }

    #[test]
    fn exit_words_ignore_case() {
        assert!(is_exit("exit"));
        assert!(is_exit("QUIT"));
        assert!(!is_exit("exit now"));
    }

    #[tokio::test]
    async fn conversational_turns_build_history() {
        let (llm, sink, mut session) = session(&["Hi there!", SAVED], DisplayMode::Conversational);

        let first = session.ask("hello").await.unwrap();
        assert_eq!(first.display.display, "Hi there!");
        let second = session.ask("research tides and save it").await.unwrap();
        assert_eq!(second.display.display, "The moon pulls the sea.");

        assert_eq!(sink.len(), 1);
        assert_eq!(session.history().len(), 4);
        let replayed = &llm.requests()[1];
        assert!(replayed.contains(&Message::assistant("Hi there!")));
    }

    #[tokio::test]
    async fn single_shot_prints_raw_output_and_save_status() {
        let (_llm, sink, mut session) = session(&[SAVED], DisplayMode::SingleShot);
        let mut out = Vec::new();
        session.run_single("tides", &mut out).await.unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("\n--- RAW MODEL OUTPUT ---\nSaved it.\n"));
        assert!(printed.contains("Parsed JSON:\n{\n  \"topic\": \"tides\""));
        assert!(printed.ends_with("\nData saved to research_output.txt\n"));
        assert_eq!(sink.len(), 1);
        assert!(session.history().is_empty());
    }

    #[tokio::test]
    async fn repl_survives_failed_turns_and_stops_on_quit() {
        // The second query exhausts the script, which makes the agent fail.
        let (_llm, sink, mut session) = session(&[SAVED], DisplayMode::Conversational);
        let input: &[u8] = b"research tides\n\nanother one\n  Quit  \nnever read\n";
        let mut out = Vec::new();
        session.run_repl(input, &mut out).await.unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed
            .contains("Assistant: The moon pulls the sea.\n[Data saved to research_output.txt]\n"));
        assert!(printed.contains("Error: "));
        assert!(printed.ends_with("Goodbye!\n"));
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn repl_ends_at_end_of_input() {
        let (_llm, _sink, mut session) = session(&["plain"], DisplayMode::Conversational);
        let input: &[u8] = b"hi\n";
        let mut out = Vec::new();
        session.run_repl(input, &mut out).await.unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Assistant: plain\n"));
        assert!(!printed.contains("Goodbye!"));
    }
}
