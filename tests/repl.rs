use std::sync::Arc;

use research_agent::agent::types::Agent;
use research_agent::llm::scripted::ScriptedLLM;
use research_agent::research::{DisplayMode, Sink, TextFileSink, TurnHandler};
use research_agent::session::Session;
use research_agent::tools::save::SaveToTxt;

const RECORD: &str = "```json\n{\"topic\":\"x\",\"summary\":\"y\",\"sources\":[],\"tools_used\":[\"save_to_txt_file\"]}\n```";

#[tokio::test]
async fn chat_persists_only_records_with_save_intent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("research_output.txt");
    let sink: Arc<dyn Sink> = Arc::new(TextFileSink::new(&path));

    let replies = [
        "Sure, what topic?".to_string(),
        format!("here you go {RECORD}"),
        "```json\n{\"topic\":\"z\",\"summary\":\"not saved\",\"sources\":[],\"tools_used\":[]}\n```".to_string(),
        "```json\n{\"topic\": \"broken\",}\n```".to_string(),
    ];
    let llm = Arc::new(ScriptedLLM::new(replies));
    let agent = Agent::new("integration", llm, Some(2));
    let mut session = Session::new(agent, TurnHandler::new(sink, DisplayMode::Conversational));

    let input: &[u8] = b"hi\nresearch x and save\nresearch z\nbroken please\nexit\n";
    let mut out = Vec::new();
    session.run_repl(input, &mut out).await.unwrap();

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Assistant: Sure, what topic?\n"));
    assert!(printed.contains("Assistant: y\n[Data saved to "));
    assert!(printed.contains("Assistant: not saved\n"));
    assert!(printed.contains("Assistant: ```json\n{\"topic\": \"broken\",}\n```\n"));
    assert!(printed.ends_with("Goodbye!\n"));

    let saved = std::fs::read_to_string(&path).unwrap();
    assert_eq!(saved.matches("----------Research Output----------").count(), 1);
    assert!(saved.contains("\"topic\": \"x\""));
    assert!(!saved.contains("\"topic\": \"z\""));
}

#[tokio::test]
async fn model_save_calls_and_record_saves_share_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");
    let sink: Arc<dyn Sink> = Arc::new(TextFileSink::new(&path));

    let llm = Arc::new(ScriptedLLM::new([
        r#"{"tool_calls":[{"name":"save_to_txt_file","args":{"data":"raw notes"}}]}"#.to_string(),
        RECORD.to_string(),
    ]));
    let mut agent = Agent::new("integration", llm, Some(3));
    agent.register_tool(None, Arc::new(SaveToTxt::new(sink.clone())));
    let mut session = Session::new(agent, TurnHandler::new(sink, DisplayMode::SingleShot));

    let outcome = session.ask("x").await.unwrap();
    assert_eq!(outcome.agent.tools_called, ["save_to_txt_file"]);

    let saved = std::fs::read_to_string(&path).unwrap();
    let entries: Vec<&str> = saved.split_inclusive("-------------------------------\n").collect();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].contains("\nraw notes\n"));
    assert!(entries[1].contains("\"summary\": \"y\""));
}
