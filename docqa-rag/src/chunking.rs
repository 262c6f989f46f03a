//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`CharacterChunker`] — fixed-size character windows with overlap
//! - [`SeparatorChunker`] — prefers natural separators (paragraphs, lines,
//!   sentences), falling back to hard character cuts
//!
//! All sizes are counted in characters, not bytes, so multi-byte text never
//! splits inside a UTF-8 sequence.

use crate::document::{Chunk, Document};
use crate::error::{QaError, Result};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no
/// embeddings. Embeddings are attached later when an index is built.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks, in source order.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    /// Each returned chunk has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Check chunk parameters: overlap must be smaller than the chunk size and
/// both must be positive.
fn validate_params(chunk_size: usize, chunk_overlap: usize) -> Result<()> {
    if chunk_size == 0 || chunk_overlap == 0 || chunk_overlap >= chunk_size {
        return Err(QaError::InvalidChunkParams { chunk_size, chunk_overlap });
    }
    Ok(())
}

/// Byte offsets of every character boundary in `text`, including the end.
fn char_boundaries(text: &str) -> Vec<usize> {
    let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    offsets.push(text.len());
    offsets
}

/// Split text into fixed-size character windows with overlap.
///
/// Every window except the last spans exactly `chunk_size` characters;
/// consecutive windows share exactly `chunk_overlap` characters.
fn window_split(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let boundaries = char_boundaries(text);
    let char_count = boundaries.len() - 1;
    let step = chunk_size - chunk_overlap;

    let mut windows = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + chunk_size).min(char_count);
        windows.push(text[boundaries[start]..boundaries[end]].to_string());
        if end == char_count {
            break;
        }
        start += step;
    }

    windows
}

/// Wrap raw chunk texts into [`Chunk`] records for a document.
///
/// Chunk IDs are generated as `{document_id}_{chunk_index}`. Each chunk
/// inherits the parent document's metadata plus a `chunk_index` field.
fn into_chunks(document: &Document, texts: Vec<String>) -> Vec<Chunk> {
    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let mut metadata = document.metadata.clone();
            metadata.insert("chunk_index".to_string(), i.to_string());
            Chunk {
                id: format!("{}_{i}", document.id),
                text,
                embedding: Vec::new(),
                metadata,
                document_id: document.id.clone(),
            }
        })
        .collect()
}

/// Splits text into fixed-size chunks by character count with overlap.
///
/// The next chunk starts `chunk_size - chunk_overlap` characters after the
/// previous chunk's start, so the whole document is covered with no gap and
/// consecutive chunks overlap by exactly `chunk_overlap` characters (the
/// final chunk may be shorter).
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::CharacterChunker;
///
/// let chunker = CharacterChunker::new(1000, 100)?;
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct CharacterChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl CharacterChunker {
    /// Create a new `CharacterChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::InvalidChunkParams`] if `chunk_overlap >= chunk_size`
    /// or either parameter is zero.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_params(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }
}

impl Chunker for CharacterChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }
        into_chunks(document, window_split(&document.text, self.chunk_size, self.chunk_overlap))
    }
}

/// Splits text greedily at natural separators, falling back to hard cuts.
///
/// Segments are accumulated up to `chunk_size` characters, splitting first
/// at paragraph breaks, then line breaks, then sentence ends, then spaces.
/// A segment that exceeds `chunk_size` even at the finest separator level
/// is cut into fixed-size character windows with overlap.
#[derive(Debug, Clone)]
pub struct SeparatorChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

/// Separator ladder, coarsest first.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

impl SeparatorChunker {
    /// Create a new `SeparatorChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::InvalidChunkParams`] if `chunk_overlap >= chunk_size`
    /// or either parameter is zero.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        validate_params(chunk_size, chunk_overlap)?;
        Ok(Self { chunk_size, chunk_overlap })
    }
}

/// Split text by a separator, then merge segments into chunks that respect
/// `chunk_size`. A segment that exceeds `chunk_size` is split further using
/// the next-level separator; past the last level it is hard-cut into
/// character windows.
fn split_and_merge(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if text.chars().count() <= chunk_size || separators.is_empty() {
        return window_split(text, chunk_size, chunk_overlap);
    }

    let separator = separators[0];
    let remaining_separators = &separators[1..];
    let segments = split_keeping_separator(text, separator);

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for segment in segments {
        let segment_len = segment.chars().count();
        if !current.is_empty() && current_len + segment_len > chunk_size {
            let full = std::mem::take(&mut current);
            flush_segment(&mut chunks, full, chunk_size, chunk_overlap, remaining_separators);
            current_len = 0;
        }
        current.push_str(segment);
        current_len += segment_len;
    }

    if !current.is_empty() {
        flush_segment(&mut chunks, current, chunk_size, chunk_overlap, remaining_separators);
    }

    chunks
}

/// Emit an accumulated segment, recursing to finer separators if it still
/// exceeds the chunk size.
fn flush_segment(
    chunks: &mut Vec<String>,
    segment: String,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) {
    if segment.chars().count() > chunk_size {
        chunks.extend(split_and_merge(&segment, chunk_size, chunk_overlap, separators));
    } else {
        chunks.push(segment);
    }
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

impl Chunker for SeparatorChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }
        let texts =
            split_and_merge(&document.text, self.chunk_size, self.chunk_overlap, &SEPARATORS);
        into_chunks(document, texts)
    }
}
