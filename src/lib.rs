//! Semantic memory daemon — persistent, embedding-indexed memory for agents.
//!
//! mnemo stores short textual "learnings" alongside the semantic-embedding
//! vector of their content, and answers similarity queries over them. Facts
//! evolve: a learning can be superseded by a newer one, after which recall
//! only surfaces the current version while the full history stays readable.
//! A parallel store of session transcript chunks powers fork detection —
//! ranking prior sessions by how relevant they are to a new query.
//!
//! # Architecture
//!
//! - **Storage**: SQLite; embeddings as raw f32 blobs, exact linear-scan
//!   similarity search by contract (no approximate index)
//! - **Embeddings**: external Ollama service over HTTP with bounded timeouts
//! - **Transport**: plain HTTP/JSON (axum)
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite initialization, schema, and additive migrations
//! - [`embedding`] — Text-to-vector boundary (Ollama client)
//! - [`error`] — Error taxonomy and HTTP status mapping
//! - [`memory`] — Core engine: store, recall, supersession, chunks, stats
//! - [`server`] — HTTP router and request handlers

pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod memory;
pub mod server;
