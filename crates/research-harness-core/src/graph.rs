//! Pipeline stages and the transition table that connects them.
//!
//! ```text
//! ReceiveQuestion ─▶ SelectTool ─┬─▶ WebSearch ────┐
//!                                ├─▶ PdfSummarize ─┤─▶ RagContext ─┐
//!                                └─▶ MemoryLookup ─┘               │
//!                                        │                         ▼
//!                                        └──────────────▶ GenerateAnswer ─▶ UpdateMemory ─▶ End
//! ```
//!
//! Each stage has exactly one outgoing [`Edge`]. Branching edges are
//! resolved against the current [`RunState`]; the interpreter that
//! executes stages lives in the application crate.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{RunState, ToolChoice};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ReceiveQuestion,
    SelectTool,
    WebSearch,
    PdfSummarize,
    MemoryLookup,
    RagContext,
    GenerateAnswer,
    UpdateMemory,
    End,
}

impl Stage {
    pub const ENTRY: Stage = Stage::ReceiveQuestion;

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ReceiveQuestion => "receive_question",
            Stage::SelectTool => "select_tool",
            Stage::WebSearch => "web_search",
            Stage::PdfSummarize => "pdf_summarize",
            Stage::MemoryLookup => "memory_lookup",
            Stage::RagContext => "rag_context",
            Stage::GenerateAnswer => "generate_answer",
            Stage::UpdateMemory => "update_memory",
            Stage::End => "end",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outgoing edge of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Unconditional transition.
    Direct(Stage),
    /// Branch on `tool_choice` to the matching strategy stage.
    ByTool,
    /// `RagContext` unless the strategy was memory lookup, else `GenerateAnswer`.
    ByAugmentation,
    /// No outgoing edge.
    Terminal,
}

/// How the interpreter reacts once `RunState::error` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Keep executing the remaining stages with whatever context exists.
    #[default]
    Continue,
    /// Jump straight to `End`; nothing is generated or persisted.
    Halt,
}

/// The transition table.
pub fn edge(stage: Stage) -> Edge {
    match stage {
        Stage::ReceiveQuestion => Edge::Direct(Stage::SelectTool),
        Stage::SelectTool => Edge::ByTool,
        Stage::WebSearch | Stage::PdfSummarize | Stage::MemoryLookup => Edge::ByAugmentation,
        Stage::RagContext => Edge::Direct(Stage::GenerateAnswer),
        Stage::GenerateAnswer => Edge::Direct(Stage::UpdateMemory),
        Stage::UpdateMemory => Edge::Direct(Stage::End),
        Stage::End => Edge::Terminal,
    }
}

/// Strategy stage for a tool choice.
pub fn strategy_stage(tool: ToolChoice) -> Stage {
    match tool {
        ToolChoice::WebSearch => Stage::WebSearch,
        ToolChoice::PdfSummarize => Stage::PdfSummarize,
        ToolChoice::MemoryLookup => Stage::MemoryLookup,
    }
}

/// Whether the similarity-search pass runs for this tool choice.
pub fn needs_augmentation(tool: ToolChoice) -> bool {
    tool != ToolChoice::MemoryLookup
}

/// Resolve the stage that follows `stage` given the current state.
///
/// A rejected question ends the run under either policy. A `ByTool` edge
/// reached without a tool choice (only possible if the selector stage was
/// bypassed) falls back to memory lookup.
pub fn next_stage(stage: Stage, state: &RunState, policy: ErrorPolicy) -> Stage {
    if state.is_failed() && (policy == ErrorPolicy::Halt || stage == Stage::ReceiveQuestion) {
        return Stage::End;
    }

    let tool = state.tool_choice.unwrap_or(ToolChoice::MemoryLookup);
    match edge(stage) {
        Edge::Direct(next) => next,
        Edge::ByTool => strategy_stage(tool),
        Edge::ByAugmentation if needs_augmentation(tool) => Stage::RagContext,
        Edge::ByAugmentation => Stage::GenerateAnswer,
        Edge::Terminal => Stage::End,
    }
}

/// Walk the table for a fixed tool choice without executing anything.
///
/// Used by `rh route` to print the planned path.
pub fn planned_path(tool: ToolChoice) -> Vec<Stage> {
    let state = RunState {
        tool_choice: Some(tool),
        ..Default::default()
    };
    let mut path = vec![Stage::ENTRY];
    let mut stage = Stage::ENTRY;
    while stage != Stage::End {
        stage = next_stage(stage, &state, ErrorPolicy::Continue);
        path.push(stage);
    }
    path
}
