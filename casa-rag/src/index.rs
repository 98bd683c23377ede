//! Vector index trait and record types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Distance metric used by a vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Cosine similarity (the reference deployment's metric).
    Cosine,
    /// Euclidean distance.
    Euclidean,
    /// Dot product.
    Dotproduct,
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Metric::Cosine => "cosine",
            Metric::Euclidean => "euclidean",
            Metric::Dotproduct => "dotproduct",
        };
        f.write_str(name)
    }
}

/// Provenance stored alongside each vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordMetadata {
    /// Name of the source document.
    pub source: String,
    /// The raw chunk text.
    pub text: String,
}

/// The persisted unit in a vector index: an identifier, an embedding, and
/// provenance metadata. Immutable once written; writing the same ID again
/// replaces the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexRecord {
    /// Stable record identifier (`{source}-{chunk index}`).
    pub id: String,
    /// The embedding vector; length must match the index dimension.
    pub values: Vec<f32>,
    /// Provenance metadata.
    pub metadata: RecordMetadata,
}

/// A single nearest-neighbour match returned by [`VectorIndex::query`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    /// The matched record's identifier.
    pub id: String,
    /// Similarity score; higher is more similar for every metric exposed
    /// here (Euclidean backends report a negated distance).
    pub score: f32,
    /// Metadata, present when the query asked for it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RecordMetadata>,
}

/// A namespaced similarity index.
///
/// The index itself is identified by a name configured on the client;
/// namespaces partition one logical corpus from another within it. Upserts
/// overwrite by ID, and queries are read-only snapshots, so concurrent
/// ingestion and querying interleave freely.
///
/// # Example
///
/// ```rust,ignore
/// use casa_rag::{Metric, MemoryIndex, VectorIndex};
///
/// let index = MemoryIndex::new();
/// index.ensure_index(1536, Metric::Cosine).await?;
/// index.upsert("default", &records).await?;
/// let matches = index.query("default", &query_vector, 5, true).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Ensure the index exists with the given dimension and metric.
    ///
    /// Idempotent: an existing index with a matching configuration is
    /// success. May block while the backend provisions; callers should
    /// treat this as a one-time startup cost, not a per-request one.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexConflict`](crate::RagError::IndexConflict)
    /// if an index of the same name already exists with a different
    /// configuration.
    async fn ensure_index(&self, dimension: usize, metric: Metric) -> Result<()>;

    /// Write records into a namespace, overwriting by ID.
    ///
    /// Safe to call repeatedly with the same IDs.
    async fn upsert(&self, namespace: &str, records: &[IndexRecord]) -> Result<()>;

    /// Return the `top_k` records most similar to `vector`, descending by
    /// similarity score.
    ///
    /// When `include_metadata` is false, matches carry `metadata: None`.
    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<ScoredRecord>>;
}
