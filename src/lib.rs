//! # tabrag
//!
//! **Row-level retrieval-augmented question answering over tabular files.**
//!
//! Each row of an ingested CSV or JSON file is rendered to text, normalized,
//! embedded by an external model, and stored in a per-file collection. A
//! question is embedded the same way, ranked against every stored row by
//! cosine similarity, and the best rows are handed to a generation model as
//! grounding context.
//!
//! ## Architecture
//!
//! ```text
//!  CSV / JSON ──▶ reader ──▶ normalize ──▶ Embedder ──▶ FileStore
//!                                                     (*_embeddings.json)
//!                                                          │
//!  question ──▶ normalize ──▶ Embedder ──▶ top_k ◀─────────┘
//!                                           │
//!                                      assemble ──▶ AnswerGenerator ──▶ answer
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! tabrag ingest data/cities.csv
//! tabrag search "largest city in Japan"
//! tabrag ask "Which city has the largest population?"
//! tabrag serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`reader`] | CSV/JSON loading into ordered rows |
//! | [`embedding`] | Ollama and disabled embedding clients |
//! | [`generation`] | Ollama and disabled answer clients |
//! | [`store`] | File-per-collection embedding store |
//! | [`ingest`] | Ingestion pipeline |
//! | [`chat`] | Retrieval and question answering |
//! | [`collections`] | Collection listing command |
//! | [`server`] | HTTP API (Axum) with CORS |
//! | [`logging`] | Tracing subscriber setup |
//!
//! Pure logic (normalization, ranking, context assembly, data model) lives
//! in the `tabrag-core` crate.

pub mod chat;
pub mod collections;
pub mod config;
pub mod embedding;
pub mod generation;
pub mod ingest;
pub mod logging;
pub mod reader;
pub mod server;
pub mod store;
