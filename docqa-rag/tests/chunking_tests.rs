//! Coverage and parameter-validation tests for the chunkers.

use std::collections::HashMap;

use docqa_rag::chunking::{CharacterChunker, Chunker, SeparatorChunker};
use docqa_rag::document::{Chunk, Document};
use docqa_rag::error::QaError;
use proptest::prelude::*;

fn doc(text: &str) -> Document {
    Document {
        id: "doc".to_string(),
        text: text.to_string(),
        metadata: HashMap::new(),
        source_uri: None,
    }
}

/// Rebuild the source text from overlapping chunks: the first chunk, then
/// each subsequent chunk minus its leading `overlap` characters. Asserts
/// along the way that every full chunk overlaps its successor by exactly
/// `overlap` characters.
fn reassemble(chunks: &[Chunk], chunk_size: usize, overlap: usize) -> String {
    let mut rebuilt = chunks[0].text.clone();
    for pair in chunks.windows(2) {
        let prev: Vec<char> = pair[0].text.chars().collect();
        let cur: Vec<char> = pair[1].text.chars().collect();
        assert_eq!(prev.len(), chunk_size, "only the final chunk may be short");
        assert_eq!(
            &prev[prev.len() - overlap..],
            &cur[..overlap],
            "consecutive chunks must share exactly the overlap region"
        );
        rebuilt.extend(&cur[overlap..]);
    }
    rebuilt
}

fn arb_chunk_params() -> impl Strategy<Value = (usize, usize)> {
    (2usize..60).prop_flat_map(|size| (Just(size), 1usize..size))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn character_chunks_cover_the_document_with_exact_overlap(
        text in "[a-z \n]{1,200}",
        (chunk_size, overlap) in arb_chunk_params(),
    ) {
        let chunker = CharacterChunker::new(chunk_size, overlap).unwrap();
        let chunks = chunker.chunk(&doc(&text));

        prop_assert!(!chunks.is_empty());
        for chunk in &chunks {
            prop_assert!(chunk.text.chars().count() <= chunk_size);
        }
        prop_assert_eq!(reassemble(&chunks, chunk_size, overlap), text);
    }

    #[test]
    fn overlap_not_smaller_than_size_is_rejected(size in 1usize..50, extra in 0usize..50) {
        let overlap = size + extra;
        prop_assert!(
            matches!(
                CharacterChunker::new(size, overlap),
                Err(QaError::InvalidChunkParams { .. })
            ),
            "expected InvalidChunkParams from CharacterChunker::new"
        );
        prop_assert!(
            matches!(
                SeparatorChunker::new(size, overlap),
                Err(QaError::InvalidChunkParams { .. })
            ),
            "expected InvalidChunkParams from SeparatorChunker::new"
        );
    }
}

#[test]
fn zero_parameters_are_rejected() {
    for (size, overlap) in [(0, 0), (5, 0), (0, 3), (1, 1), (5, 5), (5, 7)] {
        match CharacterChunker::new(size, overlap) {
            Err(QaError::InvalidChunkParams { chunk_size, chunk_overlap }) => {
                assert_eq!((chunk_size, chunk_overlap), (size, overlap));
            }
            _ => panic!("expected InvalidChunkParams for ({size}, {overlap})"),
        }
        assert!(SeparatorChunker::new(size, overlap).is_err());
    }
}

#[test]
fn chunks_carry_ids_and_indices_in_source_order() {
    let chunker = CharacterChunker::new(10, 3).unwrap();
    let chunks = chunker.chunk(&doc("abcdefghijklmnopqrstuvwxyz"));

    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.id, format!("doc_{i}"));
        assert_eq!(chunk.document_id, "doc");
        assert_eq!(chunk.metadata.get("chunk_index"), Some(&i.to_string()));
        assert!(chunk.embedding.is_empty());
    }
}

#[test]
fn empty_document_yields_no_chunks() {
    let chunker = CharacterChunker::new(10, 3).unwrap();
    assert!(chunker.chunk(&doc("")).is_empty());

    let chunker = SeparatorChunker::new(10, 3).unwrap();
    assert!(chunker.chunk(&doc("")).is_empty());
}

#[test]
fn multibyte_text_splits_on_character_boundaries() {
    let text = "αβγδεζηθικλμνξοπρστυ";
    let chunker = CharacterChunker::new(8, 3).unwrap();
    let chunks = chunker.chunk(&doc(text));

    for chunk in &chunks {
        assert!(chunk.text.chars().count() <= 8);
    }
    assert_eq!(reassemble(&chunks, 8, 3), text);
}

#[test]
fn separator_chunker_prefers_paragraph_boundaries() {
    let text = "First paragraph here.\n\nSecond paragraph follows.\n\nThird one closes.";
    let chunker = SeparatorChunker::new(50, 10).unwrap();
    let chunks = chunker.chunk(&doc(text));

    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].text.ends_with("follows.\n\n"));
    assert_eq!(chunks[1].text, "Third one closes.");
}

#[test]
fn separator_chunker_falls_back_to_hard_cuts() {
    let text = "x".repeat(95);
    let chunker = SeparatorChunker::new(30, 10).unwrap();
    let chunks = chunker.chunk(&doc(&text));

    assert_eq!(chunks.len(), 5);
    for chunk in &chunks[..4] {
        assert_eq!(chunk.text.chars().count(), 30);
    }
    assert_eq!(chunks[4].text.chars().count(), 15);
}
