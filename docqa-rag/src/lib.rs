//! Retrieval-Augmented Generation core for grounded document question
//! answering.
//!
//! This crate provides:
//! - Plain-text loading and overlapping chunking of source documents
//! - A persistable vector index with nearest-neighbor retrieval
//! - A query engine that grounds a generation model in retrieved context
//! - `Embedder`/`Generator` capability traits with OpenAI-backed
//!   implementations behind the `openai` feature
//!
//! The pipeline is request-scoped and stateless between questions: an index
//! is built or loaded once, then any number of [`QueryEngine::answer`]
//! calls may run concurrently against it.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod generation;
pub mod index;
pub mod loader;
#[cfg(feature = "openai")]
pub mod openai;

pub use chunking::{CharacterChunker, Chunker, SeparatorChunker};
pub use config::{QaConfig, QaConfigBuilder};
pub use document::{Answer, Chunk, Document, SearchResult};
pub use embedding::Embedder;
pub use engine::{QueryEngine, QueryEngineBuilder};
pub use error::{QaError, Result};
pub use generation::Generator;
pub use index::{SimilarityMetric, VectorIndex};
pub use loader::load_text;
