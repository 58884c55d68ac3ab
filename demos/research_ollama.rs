use std::sync::Arc;

use research_agent::{
    agent::{traits::AgentRunner, types::Agent},
    config::ToolsConfig,
    llm::ollama::Ollama,
    prompt,
    research::{DisplayMode, Sink, TextFileSink, TurnHandler},
    tools,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    // Adjust model name to one available in your Ollama server.
    let ollama = Ollama::default().with_model("qwen3:8b");
    let sink: Arc<dyn Sink> = Arc::new(TextFileSink::new("research_output.txt"));

    let mut agent = Agent::new("ollama-researcher", Arc::new(ollama), Some(5));
    agent.set_system_prompt(prompt::system_prompt(DisplayMode::SingleShot));
    agent.register_tools(tools::research_tools(&ToolsConfig::default(), sink.clone())?);

    let query = prompt::user_prompt(
        DisplayMode::SingleShot,
        "Who invented the printing press? Save the result to a file.",
    );
    let res = agent.call_llm(&[], &query).await?;
    println!("tokens: {:?}, tools called: {:?}", res.tokens, res.tools_called);

    let turn = TurnHandler::new(sink, DisplayMode::SingleShot).handle_turn(&res.generation);
    println!("{}", turn.display);
    for notice in turn.notices(DisplayMode::SingleShot) {
        println!("{notice}");
    }
    Ok(())
}
