//! Configuration for the query engine.

use serde::{Deserialize, Serialize};

use crate::error::{QaError, Result};
use crate::index::SimilarityMetric;

/// Configuration parameters for indexing and answering.
///
/// Defaults match the reference deployment: 1000-character chunks with a
/// 100-character overlap, and the four most similar chunks fed to the
/// generation model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of top results retrieved to ground an answer.
    pub top_k: usize,
    /// Similarity metric used when building an index.
    pub metric: SimilarityMetric,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 100, top_k: 4, metric: SimilarityMetric::Cosine }
    }
}

impl QaConfig {
    /// Create a new builder for constructing a [`QaConfig`].
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`QaConfig`].
#[derive(Debug, Clone, Default)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl QaConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of top results retrieved to ground an answer.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the similarity metric used when building an index.
    pub fn metric(mut self, metric: SimilarityMetric) -> Self {
        self.config.metric = metric;
        self
    }

    /// Build the [`QaConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::InvalidChunkParams`] if `chunk_overlap >= chunk_size`
    /// or either is zero, and [`QaError::ConfigError`] if `top_k == 0`.
    pub fn build(self) -> Result<QaConfig> {
        if self.config.chunk_size == 0
            || self.config.chunk_overlap == 0
            || self.config.chunk_overlap >= self.config.chunk_size
        {
            return Err(QaError::InvalidChunkParams {
                chunk_size: self.config.chunk_size,
                chunk_overlap: self.config.chunk_overlap,
            });
        }
        if self.config.top_k == 0 {
            return Err(QaError::ConfigError("top_k must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
