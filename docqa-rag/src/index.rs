//! Similarity-searchable index over chunk embeddings, with persistence.
//!
//! A [`VectorIndex`] is built once from a full chunk set, optionally saved
//! to a directory, and loaded back by re-supplying the same embedding
//! function. It is never mutated after build or load, so retrieval is a
//! pure read that is safe under concurrent callers.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::document::{Chunk, SearchResult};
use crate::embedding::Embedder;
use crate::error::{QaError, Result};

/// On-disk format version for the persisted index layout.
const FORMAT_VERSION: u32 = 1;

/// File holding the index fingerprint. Written last during [`VectorIndex::save`],
/// so a directory without it is never treated as a valid index.
const META_FILE: &str = "meta.json";

/// File holding the chunk payloads and their embedding vectors.
const CHUNKS_FILE: &str = "chunks.json";

/// The similarity metric of an index, chosen at build time and fixed for
/// the index's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Cosine similarity in `[-1, 1]`.
    #[default]
    Cosine,
    /// Euclidean distance, mapped through `1 / (1 + d)` so that higher
    /// scores remain more similar.
    L2,
}

impl SimilarityMetric {
    /// Score two vectors of equal length; higher is more similar.
    fn score(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            SimilarityMetric::Cosine => cosine_similarity(a, b),
            SimilarityMetric::L2 => {
                let distance =
                    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum::<f32>().sqrt();
                1.0 / (1.0 + distance)
            }
        }
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Fingerprint persisted alongside the chunk payloads.
///
/// `dimensions` guards against loading an index with a different embedding
/// function than the one it was built with; `chunk_count` guards against a
/// chunk file that does not belong to this metadata.
#[derive(Debug, Serialize, Deserialize)]
struct IndexMeta {
    version: u32,
    metric: SimilarityMetric,
    dimensions: usize,
    chunk_count: usize,
}

/// An immutable mapping from embedding vectors to their originating chunks,
/// supporting nearest-neighbor retrieval by vector similarity.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::{SimilarityMetric, VectorIndex};
///
/// let index = VectorIndex::build(chunks, &embedder, SimilarityMetric::Cosine).await?;
/// index.save("rag_index").await?;
/// let restored = VectorIndex::load("rag_index", &embedder).await?;
/// let results = restored.retrieve(&query_embedding, 4)?;
/// ```
#[derive(Debug)]
pub struct VectorIndex {
    chunks: Vec<Chunk>,
    dimensions: usize,
    metric: SimilarityMetric,
}

impl VectorIndex {
    /// Build an index by embedding every chunk with the supplied embedder.
    ///
    /// Building from zero chunks succeeds and yields an index on which
    /// [`retrieve`](VectorIndex::retrieve) fails with [`QaError::EmptyIndex`].
    ///
    /// # Errors
    ///
    /// Returns [`QaError::EmbeddingError`] if the embedding call fails or
    /// returns a vector of unexpected dimensionality for any chunk.
    pub async fn build(
        mut chunks: Vec<Chunk>,
        embedder: &dyn Embedder,
        metric: SimilarityMetric,
    ) -> Result<Self> {
        let dimensions = embedder.dimensions();

        if chunks.is_empty() {
            return Ok(Self { chunks, dimensions, metric });
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(QaError::EmbeddingError {
                provider: embedder.name().to_string(),
                message: format!(
                    "expected {} embeddings, got {}",
                    chunks.len(),
                    embeddings.len()
                ),
            });
        }

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            if embedding.len() != dimensions {
                return Err(QaError::EmbeddingError {
                    provider: embedder.name().to_string(),
                    message: format!(
                        "chunk '{}': expected a {dimensions}-dimensional vector, got {}",
                        chunk.id,
                        embedding.len()
                    ),
                });
            }
            chunk.embedding = embedding;
        }

        info!(chunk_count = chunks.len(), dimensions, ?metric, "built vector index");

        Ok(Self { chunks, dimensions, metric })
    }

    /// Number of chunks held by the index.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index holds zero chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Dimensionality of the embedding vectors in this index.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The similarity metric fixed at build time.
    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    /// Retrieve the `k` chunks most similar to the query vector, ordered by
    /// descending similarity. `k` larger than the index size is clamped.
    ///
    /// # Errors
    ///
    /// - [`QaError::EmptyIndex`] if the index holds zero vectors.
    /// - [`QaError::DimensionMismatch`] if the query vector's length differs
    ///   from the index's dimensionality.
    pub fn retrieve(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if self.chunks.is_empty() {
            return Err(QaError::EmptyIndex);
        }
        if query.len() != self.dimensions {
            return Err(QaError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }

        let mut scored: Vec<SearchResult> = self
            .chunks
            .iter()
            .map(|chunk| SearchResult {
                chunk: chunk.clone(),
                score: self.metric.score(&chunk.embedding, query),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    /// Serialize the index to files under `dir`, creating it if absent.
    ///
    /// Each file is written to a temporary sibling and renamed into place,
    /// and the metadata fingerprint is written last, so a partially written
    /// directory is never treated as a valid index on load.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Io`] on any write failure.
    pub async fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        let chunks = serde_json::to_vec(&self.chunks).map_err(io::Error::from)?;
        write_atomic(dir, CHUNKS_FILE, &chunks).await?;

        let meta = IndexMeta {
            version: FORMAT_VERSION,
            metric: self.metric,
            dimensions: self.dimensions,
            chunk_count: self.chunks.len(),
        };
        let meta = serde_json::to_vec_pretty(&meta).map_err(io::Error::from)?;
        write_atomic(dir, META_FILE, &meta).await?;

        info!(path = %dir.display(), chunk_count = self.chunks.len(), "saved vector index");

        Ok(())
    }

    /// Restore an index from files previously written by
    /// [`save`](VectorIndex::save).
    ///
    /// The supplied embedder must match the one used at build time; its
    /// dimensionality is checked against the persisted fingerprint as a
    /// cheap guard, but identical vector output remains a caller obligation.
    ///
    /// # Errors
    ///
    /// - [`QaError::IndexNotFound`] if `dir` does not exist or lacks the
    ///   expected file set.
    /// - [`QaError::CorruptIndex`] if the persisted structure cannot be
    ///   parsed or contradicts its fingerprint.
    /// - [`QaError::DimensionMismatch`] if the embedder's dimensionality
    ///   differs from the fingerprint.
    pub async fn load(dir: impl AsRef<Path>, embedder: &dyn Embedder) -> Result<Self> {
        let dir = dir.as_ref();

        let meta_path = dir.join(META_FILE);
        let chunks_path = dir.join(CHUNKS_FILE);
        if !file_exists(&meta_path).await || !file_exists(&chunks_path).await {
            error!(path = %dir.display(), "index files missing");
            return Err(QaError::IndexNotFound { path: dir.to_path_buf() });
        }

        let meta_bytes = tokio::fs::read(&meta_path).await?;
        let meta: IndexMeta =
            serde_json::from_slice(&meta_bytes).map_err(|e| QaError::CorruptIndex {
                path: dir.to_path_buf(),
                message: format!("unreadable metadata: {e}"),
            })?;
        if meta.version != FORMAT_VERSION {
            return Err(QaError::CorruptIndex {
                path: dir.to_path_buf(),
                message: format!("unsupported format version {}", meta.version),
            });
        }

        let chunk_bytes = tokio::fs::read(&chunks_path).await?;
        let chunks: Vec<Chunk> =
            serde_json::from_slice(&chunk_bytes).map_err(|e| QaError::CorruptIndex {
                path: dir.to_path_buf(),
                message: format!("unreadable chunk payloads: {e}"),
            })?;

        if chunks.len() != meta.chunk_count {
            return Err(QaError::CorruptIndex {
                path: dir.to_path_buf(),
                message: format!(
                    "metadata records {} chunks, payload holds {}",
                    meta.chunk_count,
                    chunks.len()
                ),
            });
        }
        if let Some(chunk) = chunks.iter().find(|c| c.embedding.len() != meta.dimensions) {
            return Err(QaError::CorruptIndex {
                path: dir.to_path_buf(),
                message: format!(
                    "chunk '{}' holds a {}-dimensional vector, metadata records {}",
                    chunk.id,
                    chunk.embedding.len(),
                    meta.dimensions
                ),
            });
        }

        if embedder.dimensions() != meta.dimensions {
            return Err(QaError::DimensionMismatch {
                expected: meta.dimensions,
                actual: embedder.dimensions(),
            });
        }

        info!(path = %dir.display(), chunk_count = chunks.len(), "loaded vector index");

        Ok(Self { chunks, dimensions: meta.dimensions, metric: meta.metric })
    }
}

/// Whether `path` exists and is a regular file.
async fn file_exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

/// Write `bytes` to `dir/name` via a temporary sibling and an atomic rename.
async fn write_atomic(dir: &Path, name: &str, bytes: &[u8]) -> Result<()> {
    let tmp = dir.join(format!("{name}.tmp"));
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, dir.join(name)).await?;
    Ok(())
}
