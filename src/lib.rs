//! # Research Harness
//!
//! A research assistant that routes each question to one of three
//! retrieval strategies (web search, PDF summarization, conversation
//! memory), augments the result with a similarity search over previously
//! ingested documents, and synthesizes a cited answer with an LLM.
//!
//! ## Architecture
//!
//! ```text
//!              ┌────────────┐
//! question ───▶│ SelectTool │
//!              └─────┬──────┘
//!        ┌───────────┼────────────┐
//!        ▼           ▼            ▼
//!  ┌──────────┐ ┌──────────┐ ┌──────────┐
//!  │WebSearch │ │   PDF    │ │  Memory  │
//!  │ (Brave)  │ │Summarize │ │  Lookup  │
//!  └────┬─────┘ └────┬─────┘ └────┬─────┘
//!       └─────┬──────┘            │
//!             ▼                   │
//!       ┌───────────┐             │
//!       │RagContext │ SQLite+vec  │
//!       └─────┬─────┘             │
//!             ▼                   ▼
//!       ┌──────────────────────────────┐
//!       │ GenerateAnswer ─▶ UpdateMemory│
//!       └──────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`pipeline`] | Stage functions and the interpreter loop |
//! | [`traits`] | Collaborator traits (search, generation, PDF) |
//! | [`brave`] | Brave Search client |
//! | [`llm`] | OpenAI-compatible chat client |
//! | [`pdf`] | PDF download and text extraction |
//! | [`embedding`] | Embedding backends |
//! | [`vector_store`] | Similarity store over a vector index |
//! | [`sqlite_index`] | SQLite vector index |
//! | [`memory_store`] | JSON conversation log |
//! | [`server`] | HTTP API |
//! | [`commands`] | CLI subcommands |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod brave;
pub mod commands;
pub mod config;
pub mod db;
pub mod embedding;
pub mod http;
pub mod llm;
pub mod memory_store;
pub mod migrate;
pub mod pdf;
pub mod pipeline;
pub mod runtime;
pub mod server;
pub mod sqlite_index;
pub mod traits;
pub mod vector_store;
