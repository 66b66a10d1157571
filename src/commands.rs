//! Implementations of the `rh` subcommands.
//!
//! Answers and listings go to stdout; progress and diagnostics go through
//! `tracing` to stderr.

use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use research_harness_core::graph::planned_path;
use research_harness_core::router::select_tool;
use research_harness_core::text::ellipsize;
use research_harness_core::{MemoryEntry, RunState};

use crate::config::Config;
use crate::memory_store::MemoryStore;
use crate::pipeline::Pipeline;
use crate::runtime::build_pipeline;
use crate::{db, migrate};

/// Words that end an interactive session.
pub const EXIT_WORDS: &[&str] = &["quit", "exit", "q"];

/// `rh init`: create the similarity-store schema.
pub async fn run_init(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    migrate::run_migrations(&pool).await?;
    pool.close().await;
    println!("Database initialized at {}", config.db.path.display());
    Ok(())
}

/// `rh ask`: one run, answer and citations on stdout.
pub async fn run_ask(config: &Config, question: &str) -> Result<()> {
    let pipeline = build_pipeline(config).await?;
    let state = pipeline.run(question).await;
    let mut out = std::io::stdout().lock();
    write_state(&mut out, &state)
}

/// `rh chat`: read questions from stdin until an exit word or EOF.
pub async fn run_chat(config: &Config) -> Result<()> {
    let pipeline = build_pipeline(config).await?;
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    chat_loop(&pipeline, stdin, std::io::stdout()).await
}

/// Drive an interactive session over arbitrary input and output.
///
/// Blank lines are skipped. Run errors are printed and the session goes on.
pub async fn chat_loop<R, W>(pipeline: &Pipeline, input: R, mut out: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "Research assistant ready. Type 'quit' to exit.")?;
    let mut lines = input.lines();

    loop {
        write!(out, "\n> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&question.to_lowercase().as_str()) {
            break;
        }

        let state = pipeline.run(question).await;
        write_state(&mut out, &state)?;
    }

    writeln!(out, "Goodbye!")?;
    Ok(())
}

/// Print the answer, citations, and any error of a finished run.
pub fn write_state<W: Write>(out: &mut W, state: &RunState) -> Result<()> {
    if let Some(answer) = &state.answer {
        writeln!(out, "{}", answer)?;
    }
    if !state.citations.is_empty() {
        writeln!(out, "\nSources:")?;
        for (i, url) in state.citations.iter().enumerate() {
            writeln!(out, "  [{}] {}", i + 1, url)?;
        }
    }
    if let Some(error) = &state.error {
        writeln!(out, "\nError: {}", error)?;
    }
    Ok(())
}

/// `rh memory list`
pub async fn run_memory_list(config: &Config) -> Result<()> {
    let store = MemoryStore::load(&config.memory.path).await;
    let entries = store.entries().await;
    if entries.is_empty() {
        println!("No conversations stored in {}", store.path().display());
        return Ok(());
    }
    let mut out = std::io::stdout().lock();
    for (i, entry) in entries.iter().enumerate() {
        write_entry(&mut out, i + 1, entry)?;
    }
    Ok(())
}

/// `rh memory search`
pub async fn run_memory_search(config: &Config, query: &str, limit: Option<usize>) -> Result<()> {
    let store = MemoryStore::load(&config.memory.path).await;
    let limit = limit.unwrap_or(config.retrieval.max_memory_results);
    let hits = store.search(query, limit).await;
    if hits.is_empty() {
        println!("No matching conversations.");
        return Ok(());
    }
    let mut out = std::io::stdout().lock();
    for (i, entry) in hits.iter().enumerate() {
        write_entry(&mut out, i + 1, entry)?;
    }
    Ok(())
}

fn write_entry<W: Write>(out: &mut W, n: usize, entry: &MemoryEntry) -> Result<()> {
    writeln!(out, "{}. [{}] {}", n, entry.timestamp.to_rfc3339(), entry.question)?;
    writeln!(out, "   {}", ellipsize(&entry.answer, 120))?;
    Ok(())
}

/// `rh route`: tool choice and planned stages, nothing executed.
pub fn run_route(question: &str) -> Result<()> {
    let tool = select_tool(question.trim());
    let path: Vec<&str> = planned_path(tool).iter().map(|s| s.as_str()).collect();
    println!("tool: {}", tool);
    println!("path: {}", path.join(" -> "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_harness_core::ToolChoice;

    #[test]
    fn test_write_state_lists_sources() {
        let state = RunState {
            answer: Some("Rust 1.80 shipped [Source: blog]".to_string()),
            citations: vec!["https://blog.rust-lang.org".to_string()],
            tool_choice: Some(ToolChoice::WebSearch),
            ..Default::default()
        };
        let mut buf = Vec::new();
        write_state(&mut buf, &state).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Rust 1.80 shipped"));
        assert!(text.contains("[1] https://blog.rust-lang.org"));
        assert!(!text.contains("Error:"));
    }

    #[test]
    fn test_write_state_shows_error() {
        let mut state = RunState::new("summarize this pdf");
        state.fail("No PDF URL found in question");
        let mut buf = Vec::new();
        write_state(&mut buf, &state).unwrap();
        assert!(String::from_utf8(buf)
            .unwrap()
            .contains("Error: No PDF URL found in question"));
    }
}
