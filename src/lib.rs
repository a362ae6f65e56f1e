//! Consulta - Transcript Question Answering
//!
//! A local-first CLI tool for asking questions over an archive of subtitle
//! (`.srt`) transcripts.
//!
//! # Overview
//!
//! Consulta allows you to:
//! - Ingest a directory of .srt transcripts into a local vector store
//! - Ask questions and get AI-powered answers with file + timestamp citations
//! - Search the archive with hybrid retrieval (dense vectors plus a keyword
//!   fallback that rescues rare literal terms the embedding space misses)
//! - Scan the raw files for exact terms without touching the index
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration and prompt management
//! - `subtitle` - .srt corpus loading and literal scanning
//! - `chunking` - Overlapping character-window chunking
//! - `embedding` - Embedding generation (OpenAI or deterministic fallback)
//! - `vector_store` - Vector database abstraction
//! - `retrieval` - Hybrid vector + keyword retrieval
//! - `rag` - Context formatting and cited answer generation
//! - `session` - Component ownership and the ingestion pipeline
//!
//! # Example
//!
//! ```rust,no_run
//! use consulta::config::Settings;
//! use consulta::session::Session;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let session = Session::new(settings)?;
//!
//!     let report = session
//!         .ingest_corpus(std::path::Path::new("./transcripts"), false)
//!         .await?;
//!     println!("Indexed {} chunks", report.chunks_indexed);
//!
//!     let docs = session.retriever().retrieve("el linaje ra").await?;
//!     println!("Retrieved {} chunks", docs.len());
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod openai;
pub mod rag;
pub mod retrieval;
pub mod session;
pub mod subtitle;
pub mod vector_store;

pub use error::{ConsultaError, Result};
