//! End-to-end tests for the query engine with deterministic stand-ins.

mod common;

use std::sync::Arc;

use common::{FailingGenerator, KeywordGenerator, VocabEmbedder};
use docqa_rag::chunking::CharacterChunker;
use docqa_rag::config::QaConfig;
use docqa_rag::engine::QueryEngine;
use docqa_rag::error::QaError;
use docqa_rag::index::{SimilarityMetric, VectorIndex};

const SATURN_TEXT: &str = "Saturn is a gas giant ringed by bands of ice and dust.\n\
Its largest moon Titan hides lakes of liquid methane beneath an orange haze.\n\
A hexagonal storm wider than Earth spins endlessly above the north pole.";

fn vocab_embedder() -> Arc<VocabEmbedder> {
    Arc::new(VocabEmbedder::new(vec!["ring", "titan", "storm", "methane"]))
}

fn engine_with(generator: Arc<dyn docqa_rag::Generator>) -> QueryEngine {
    QueryEngine::builder()
        .config(
            QaConfig::builder()
                .chunk_size(140)
                .chunk_overlap(60)
                .top_k(4)
                .build()
                .unwrap(),
        )
        .embedder(vocab_embedder())
        .generator(generator)
        .chunker(Arc::new(CharacterChunker::new(140, 60).unwrap()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn answering_before_an_index_is_attached_fails() {
    let engine = engine_with(Arc::new(KeywordGenerator));
    let result = engine.answer("anything at all?").await;
    assert!(matches!(result, Err(QaError::IndexNotReady)));
}

#[tokio::test]
async fn builder_rejects_missing_components() {
    let result = QueryEngine::builder().config(QaConfig::default()).build();
    assert!(matches!(result, Err(QaError::ConfigError(_))));
}

#[tokio::test]
async fn question_covered_by_one_chunk_is_answered_from_it() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = dir.path().join("saturn.txt");
    tokio::fs::write(&doc_path, SATURN_TEXT).await.unwrap();
    let index_path = dir.path().join("rag_index");

    let engine = engine_with(Arc::new(KeywordGenerator));
    let index = engine.build_index(&doc_path, &index_path).await.unwrap();

    // Three sentences split into two overlapping chunks; the storm appears
    // only in the second.
    assert_eq!(index.len(), 2);
    assert!(index_path.join("meta.json").is_file());
    assert!(index_path.join("chunks.json").is_file());

    let answer = engine.answer("What storm spins above the north pole?").await.unwrap();

    assert_eq!(answer.sources.len(), 2);
    assert_eq!(answer.sources[0].chunk.id, "saturn_1");
    assert!(answer.sources[0].chunk.text.contains("storm"));
    assert!(!answer.text.is_empty());
    assert!(!answer.text.to_lowercase().contains("don't know"));
}

#[tokio::test]
async fn uncovered_question_yields_an_explicit_dont_know() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = dir.path().join("saturn.txt");
    tokio::fs::write(&doc_path, SATURN_TEXT).await.unwrap();

    let engine = engine_with(Arc::new(KeywordGenerator));
    engine.build_index(&doc_path, dir.path().join("rag_index")).await.unwrap();

    let answer = engine.answer("Who composed the moonlight sonata?").await.unwrap();
    assert!(answer.text.to_lowercase().contains("don't know"));
}

#[tokio::test]
async fn a_persisted_index_answers_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = dir.path().join("saturn.txt");
    tokio::fs::write(&doc_path, SATURN_TEXT).await.unwrap();
    let index_path = dir.path().join("rag_index");

    let builder_engine = engine_with(Arc::new(KeywordGenerator));
    builder_engine.build_index(&doc_path, &index_path).await.unwrap();

    // A fresh engine, as a restarted process would construct, loading the
    // persisted index with the same embedding function.
    let reader_engine = engine_with(Arc::new(KeywordGenerator));
    reader_engine.load_index(&index_path).await.unwrap();

    let answer = reader_engine.answer("What storm spins above the north pole?").await.unwrap();
    assert_eq!(answer.sources[0].chunk.id, "saturn_1");
    assert!(!answer.text.to_lowercase().contains("don't know"));
}

#[tokio::test]
async fn generation_failures_surface_as_generation_error() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = dir.path().join("saturn.txt");
    tokio::fs::write(&doc_path, SATURN_TEXT).await.unwrap();

    let engine = engine_with(Arc::new(FailingGenerator));
    engine.build_index(&doc_path, dir.path().join("rag_index")).await.unwrap();

    let result = engine.answer("What storm spins above the north pole?").await;
    assert!(matches!(result, Err(QaError::GenerationError { .. })));
}

#[tokio::test]
async fn an_attached_empty_index_propagates_empty_index() {
    let engine = engine_with(Arc::new(KeywordGenerator));
    let empty = VectorIndex::build(Vec::new(), &*vocab_embedder(), SimilarityMetric::Cosine)
        .await
        .unwrap();
    engine.attach_index(Arc::new(empty)).await;

    let result = engine.answer("anything?").await;
    assert!(matches!(result, Err(QaError::EmptyIndex)));
}

#[tokio::test]
async fn attaching_a_new_index_swaps_what_answers_see() {
    let dir = tempfile::tempdir().unwrap();
    let doc_path = dir.path().join("saturn.txt");
    tokio::fs::write(&doc_path, SATURN_TEXT).await.unwrap();

    let engine = engine_with(Arc::new(KeywordGenerator));
    assert!(engine.index().await.is_none());

    engine.build_index(&doc_path, dir.path().join("rag_index")).await.unwrap();
    let first = engine.index().await.unwrap();

    engine.build_index(&doc_path, dir.path().join("rag_index_2")).await.unwrap();
    let second = engine.index().await.unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
}
