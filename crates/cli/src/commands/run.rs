//! `switchyard run` — Route a single message, or chat interactively.

use std::io::Write;
use std::path::{Path, PathBuf};

use switchyard_core::ConversationState;
use switchyard_core::message::Message;
use switchyard_router::{DispatchGraph, GraphRun};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{build_graph, load_config};

pub async fn run(
    message: Option<String>,
    state_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let registry = switchyard_providers::build_from_config(&config);
    let graph = build_graph(&config, &registry)?;

    let mut state = match &state_path {
        Some(path) => load_state(path)?,
        None => ConversationState::new(),
    };

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Routing...");
        let result = turn(&graph, &state, &msg).await;
        eprint!("\r             \r");
        let run = result?;
        for line in reply_lines(&run, false) {
            println!("{line}");
        }
        state = run.state;
        if let Some(path) = &state_path {
            save_state(path, &state)?;
        }
        return Ok(());
    }

    // Interactive mode
    let classifier = config.classifier_target();
    println!();
    println!("  Switchyard — Interactive Mode");
    println!();
    println!("  Graph:       {}", graph.name());
    println!("  Classifier:  {}/{}", classifier.provider, classifier.model);
    if let Some(path) = &state_path {
        println!(
            "  State:       {} ({} messages)",
            path.display(),
            state.messages().len()
        );
    }
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("  You > ");
    std::io::stdout().flush()?;

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }
        if input.is_empty() {
            print!("  You > ");
            std::io::stdout().flush()?;
            continue;
        }

        eprint!("  ...");
        match turn(&graph, &state, input).await {
            Ok(run) => {
                eprint!("\r     \r");
                println!();
                for line in reply_lines(&run, true) {
                    println!("{line}");
                }
                println!();
                state = run.state;
                if let Some(path) = &state_path {
                    save_state(path, &state)?;
                }
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}

/// One graph run over a copy of the state; the caller's state is untouched
/// on failure.
async fn turn(
    graph: &DispatchGraph,
    state: &ConversationState,
    input: &str,
) -> Result<GraphRun, Box<dyn std::error::Error>> {
    let mut next = state.clone();
    next.push(Message::user(input));
    Ok(graph.invoke(next).await?)
}

/// Output lines for the replies of one run, labelled with the route that
/// actually handled it.
fn reply_lines(run: &GraphRun, interactive: bool) -> Vec<String> {
    let route = run.route.as_str();
    let mut lines = Vec::new();
    for reply in run.replies() {
        if interactive {
            lines.extend(reply.content.lines().map(|l| format!("  [{route}] > {l}")));
        } else {
            lines.push(reply.content.clone());
        }
    }
    lines
}

fn load_state(path: &Path) -> Result<ConversationState, Box<dyn std::error::Error>> {
    if !path.exists() {
        tracing::info!("No state file at {}, starting fresh", path.display());
        return Ok(ConversationState::new());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read state file {}: {e}", path.display()))?;
    let state = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse state file {}: {e}", path.display()))?;
    Ok(state)
}

fn save_state(path: &Path, state: &ConversationState) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(state)?)?;
    Ok(())
}
