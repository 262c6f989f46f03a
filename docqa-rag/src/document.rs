//! Data types for documents, chunks, and retrieval results.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document containing text content and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// Key-value metadata associated with the document.
    pub metadata: HashMap<String, String>,
    /// Optional URI pointing to the original source, used for citation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

/// A contiguous span of a [`Document`] with its vector embedding.
///
/// Chunks are produced in source order. Consecutive chunks from the same
/// document share a configurable number of overlapping characters so that
/// no span of text is cut at a boundary without surrounding context
/// appearing in a neighbor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk, `{document_id}_{chunk_index}`.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text. Empty until an index
    /// attaches one at build time.
    pub embedding: Vec<f32>,
    /// Key-value metadata inherited from the parent document plus
    /// chunk-specific fields such as `chunk_index`.
    pub metadata: HashMap<String, String>,
    /// The ID of the parent [`Document`].
    pub document_id: String,
}

/// A retrieved [`Chunk`] paired with a relevance score.
///
/// Scores are comparable only within one index: higher is more relevant
/// under the index's similarity metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The similarity score (higher is more relevant).
    pub score: f32,
}

/// A generated answer together with the retrieval results that grounded it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The generation model's text output.
    pub text: String,
    /// The chunks the answer was grounded in, ordered by descending
    /// similarity to the question.
    pub sources: Vec<SearchResult>,
}
