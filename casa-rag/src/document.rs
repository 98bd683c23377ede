//! Data types for uploaded documents and their chunks.

use serde::{Deserialize, Serialize};

/// An uploaded document awaiting ingestion.
///
/// Documents are ephemeral: they exist for the duration of one ingestion
/// call and are never persisted themselves. Only the derived chunks reach
/// the vector index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// File name, used as the source identifier for derived chunks.
    pub name: String,
    /// Declared media type, validated against the ingestion allow-list.
    pub mime_type: String,
    /// Raw text content. PDF uploads arrive here already extracted to text.
    pub text: String,
}

impl Document {
    /// Create a document from its name, declared media type, and text.
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), mime_type: mime_type.into(), text: text.into() }
    }
}

/// A contiguous segment of a [`Document`], sized for independent embedding.
///
/// Chunk IDs are deterministic (`{source}-{index}`), so re-ingesting the
/// same document overwrites the same records rather than accumulating
/// duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Stable identifier: `{source}-{index}`.
    pub id: String,
    /// Name of the source document.
    pub source: String,
    /// Position of this chunk within the document, starting at 0.
    pub index: usize,
    /// The chunk text, an exact substring of the trimmed document text.
    pub text: String,
    /// Byte offset of this chunk within the trimmed document text.
    pub offset: usize,
}

impl Chunk {
    /// Build the stable chunk identifier for a source document and position.
    pub fn record_id(source: &str, index: usize) -> String {
        format!("{source}-{index}")
    }
}
