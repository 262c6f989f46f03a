//! Retrieval-augmented query engine.
//!
//! The [`QueryEngine`] coordinates the two entry points the core exposes:
//! building an index from a document path (offline, one-shot) and answering
//! a question against a loaded index (online, repeatable). It composes an
//! [`Embedder`], a [`Generator`], a [`Chunker`], and an attachable
//! [`VectorIndex`].
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa_rag::{CharacterChunker, QaConfig, QueryEngine};
//!
//! let engine = QueryEngine::builder()
//!     .config(QaConfig::default())
//!     .embedder(Arc::new(embedder))
//!     .generator(Arc::new(generator))
//!     .chunker(Arc::new(CharacterChunker::new(1000, 100)?))
//!     .build()?;
//!
//! engine.build_index("data/handbook.txt", "rag_index").await?;
//! let answer = engine.answer("What does the handbook say about leave?").await?;
//! println!("{}", answer.text);
//! ```

use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};

use crate::chunking::Chunker;
use crate::config::QaConfig;
use crate::document::Answer;
use crate::embedding::Embedder;
use crate::error::{QaError, Result};
use crate::generation::Generator;
use crate::index::VectorIndex;
use crate::loader::load_text;

/// Fixed instruction prepended to every generation request. The model is
/// told to answer only from the supplied context and to decline rather
/// than fabricate.
const ANSWER_INSTRUCTION: &str = "You are a document question-answering assistant. \
Use the following pieces of context to answer the question at the end. \
If the context does not contain the answer, just say that you don't know; \
do not try to make up an answer.";

/// Compose the single-shot generation prompt from retrieved context and the
/// literal question.
fn compose_prompt(context: &str, question: &str) -> String {
    format!("{ANSWER_INSTRUCTION}\n\nContext:\n{context}\n\nQuestion: {question}\n\nHelpful answer:")
}

/// The retrieval-augmented query engine.
///
/// Each [`answer`](QueryEngine::answer) call is independent: no session or
/// history is retained, and concurrent calls against the same attached index
/// are safe because the index is never mutated after build or load. The
/// index lives in a swappable slot so glue code can rebuild or reload it
/// without recreating the engine.
pub struct QueryEngine {
    config: QaConfig,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    chunker: Arc<dyn Chunker>,
    index: RwLock<Option<Arc<VectorIndex>>>,
}

impl QueryEngine {
    /// Create a new [`QueryEngineBuilder`].
    pub fn builder() -> QueryEngineBuilder {
        QueryEngineBuilder::default()
    }

    /// Return a reference to the engine configuration.
    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// Return a reference to the embedder.
    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// The currently attached index, if any.
    pub async fn index(&self) -> Option<Arc<VectorIndex>> {
        self.index.read().await.clone()
    }

    /// Attach an index, replacing any previously attached one.
    ///
    /// In-flight [`answer`](QueryEngine::answer) calls that already cloned
    /// the previous index finish against it; subsequent calls see the new
    /// one.
    pub async fn attach_index(&self, index: Arc<VectorIndex>) {
        let mut slot = self.index.write().await;
        *slot = Some(index);
    }

    /// Build an index from a plain-text document and persist it.
    ///
    /// The offline entry point: load the document, split it with the
    /// engine's chunker, embed every chunk, save the index under
    /// `index_path`, and attach it. Returns the built index handle.
    ///
    /// # Errors
    ///
    /// Propagates [`QaError::SourceNotFound`] / [`QaError::DecodeError`]
    /// from loading, [`QaError::EmbeddingError`] from embedding, and
    /// [`QaError::Io`] from persistence.
    pub async fn build_index(
        &self,
        document_path: impl AsRef<Path>,
        index_path: impl AsRef<Path>,
    ) -> Result<Arc<VectorIndex>> {
        let document = load_text(document_path).await?;
        let chunks = self.chunker.chunk(&document);
        info!(document.id = %document.id, chunk_count = chunks.len(), "split document");

        let index =
            Arc::new(VectorIndex::build(chunks, self.embedder.as_ref(), self.config.metric).await?);
        index.save(index_path).await?;

        self.attach_index(Arc::clone(&index)).await;
        Ok(index)
    }

    /// Load a previously persisted index and attach it.
    ///
    /// The engine's embedder must match the one the index was built with;
    /// its dimensionality is checked against the persisted fingerprint.
    ///
    /// # Errors
    ///
    /// Propagates [`QaError::IndexNotFound`], [`QaError::CorruptIndex`],
    /// and [`QaError::DimensionMismatch`] from [`VectorIndex::load`].
    pub async fn load_index(&self, index_path: impl AsRef<Path>) -> Result<Arc<VectorIndex>> {
        let index = Arc::new(VectorIndex::load(index_path, self.embedder.as_ref()).await?);
        self.attach_index(Arc::clone(&index)).await;
        Ok(index)
    }

    /// Answer a question grounded in the attached index.
    ///
    /// Embeds the question, retrieves the configured top-k most similar
    /// chunks, composes a single generation request from the instruction
    /// template plus the retrieved context, and invokes the generator once.
    /// Returns the model's text together with the retrieval results that
    /// grounded it.
    ///
    /// # Errors
    ///
    /// - [`QaError::IndexNotReady`] if no index is attached.
    /// - [`QaError::EmbeddingError`] if embedding the question fails.
    /// - [`QaError::EmptyIndex`] if the attached index holds no chunks.
    /// - [`QaError::GenerationError`] if the model call fails or times out;
    ///   the call is not retried.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let index = self.index().await.ok_or(QaError::IndexNotReady)?;

        let query_embedding = self.embedder.embed(question).await.inspect_err(|e| {
            error!(error = %e, "failed to embed question");
        })?;

        let sources = index.retrieve(&query_embedding, self.config.top_k)?;

        let context: Vec<&str> = sources.iter().map(|r| r.chunk.text.as_str()).collect();
        let prompt = compose_prompt(&context.join("\n\n"), question);

        let text = self.generator.generate(&prompt).await.inspect_err(|e| {
            error!(error = %e, "generation failed");
        })?;

        info!(source_count = sources.len(), answer_len = text.len(), "answered question");

        Ok(Answer { text, sources })
    }
}

/// Builder for constructing a [`QueryEngine`].
///
/// `config`, `embedder`, `generator`, and `chunker` are required; an
/// initial `index` is optional and can also be attached later via
/// [`QueryEngine::attach_index`], [`QueryEngine::build_index`], or
/// [`QueryEngine::load_index`].
#[derive(Default)]
pub struct QueryEngineBuilder {
    config: Option<QaConfig>,
    embedder: Option<Arc<dyn Embedder>>,
    generator: Option<Arc<dyn Generator>>,
    chunker: Option<Arc<dyn Chunker>>,
    index: Option<Arc<VectorIndex>>,
}

impl QueryEngineBuilder {
    /// Set the engine configuration.
    pub fn config(mut self, config: QaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the generation model.
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Set the document chunker used by [`QueryEngine::build_index`].
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Attach an already-built index at construction time.
    pub fn index(mut self, index: Arc<VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Build the [`QueryEngine`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::ConfigError`] if any required field is missing.
    pub fn build(self) -> Result<QueryEngine> {
        let config =
            self.config.ok_or_else(|| QaError::ConfigError("config is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| QaError::ConfigError("embedder is required".to_string()))?;
        let generator = self
            .generator
            .ok_or_else(|| QaError::ConfigError("generator is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| QaError::ConfigError("chunker is required".to_string()))?;

        Ok(QueryEngine {
            config,
            embedder,
            generator,
            chunker,
            index: RwLock::new(self.index),
        })
    }
}
