//! Deterministic stand-ins for the embedding and generation capabilities.

#![allow(dead_code)]

use async_trait::async_trait;

use docqa_rag::{Embedder, Generator, QaError, Result};

/// Hashes bytes into a fixed number of buckets. Deterministic and cheap;
/// distinct texts almost always get distinct vectors.
pub struct HashEmbedder {
    pub dimensions: usize,
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        "hash-stub"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimensions];
        for (i, byte) in text.bytes().enumerate() {
            vector[(byte as usize + i) % self.dimensions] += 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Embeds text as occurrence counts over a fixed vocabulary, so relevance
/// is controlled entirely by which terms a text mentions.
pub struct VocabEmbedder {
    vocabulary: Vec<&'static str>,
}

impl VocabEmbedder {
    pub fn new(vocabulary: Vec<&'static str>) -> Self {
        Self { vocabulary }
    }
}

#[async_trait]
impl Embedder for VocabEmbedder {
    fn name(&self) -> &str {
        "vocab-stub"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        Ok(self.vocabulary.iter().map(|term| lower.matches(term).count() as f32).collect())
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Follows the grounding instruction faithfully: answers from the context
/// when a question keyword appears in it, otherwise declines.
pub struct KeywordGenerator;

#[async_trait]
impl Generator for KeywordGenerator {
    fn name(&self) -> &str {
        "keyword-stub"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let (head, tail) =
            prompt.split_once("\n\nQuestion:").ok_or_else(|| QaError::GenerationError {
                provider: "keyword-stub".into(),
                message: "prompt missing question section".into(),
            })?;
        let context = head.split_once("Context:\n").map(|(_, c)| c).unwrap_or("").to_lowercase();
        let question =
            tail.split_once("\n\nHelpful answer:").map(|(q, _)| q).unwrap_or(tail).to_lowercase();

        let grounded = question
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|word| word.len() >= 5)
            .any(|word| context.contains(word));

        if grounded {
            let cited = context.lines().next().unwrap_or("").trim().to_string();
            Ok(format!("Based on the provided context: {cited}"))
        } else {
            Ok("I don't know.".to_string())
        }
    }
}

/// Always fails, for exercising error propagation.
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    fn name(&self) -> &str {
        "failing-stub"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(QaError::GenerationError {
            provider: "failing-stub".into(),
            message: "model is down".into(),
        })
    }
}
