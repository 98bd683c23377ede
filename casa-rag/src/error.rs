//! Error types for the `casa-rag` crate.

/// Errors that can occur during ingestion and retrieval.
#[derive(Debug)]
pub enum RagError {
    /// The document's declared media type is not in the ingestion allow-list.
    ///
    /// Raised before any chunking or embedding work; the caller can recover
    /// by re-uploading a supported type.
    UnsupportedContentType(String),

    /// The embedding service call failed or timed out.
    ///
    /// A batch either fully succeeds or fully fails; no partial recovery is
    /// attempted.
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// Index creation raced an existing index with a different configuration.
    IndexConflict {
        /// The index name in conflict.
        index: String,
        /// A description of the mismatch.
        message: String,
    },

    /// The vector index backend failed or could not be reached.
    IndexUnavailable {
        /// The index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// Ingestion stopped partway through a document.
    ///
    /// Batches committed before the failure remain durably indexed; the
    /// deterministic chunk-ID scheme makes a later re-ingest overwrite them
    /// in place.
    Ingestion {
        /// The source document name.
        source: String,
        /// Number of batches durably upserted before the failure.
        committed_batches: usize,
        /// Number of chunks durably upserted before the failure.
        committed_chunks: usize,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    Config(String),
}

impl std::fmt::Display for RagError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RagError::UnsupportedContentType(ty) => {
                write!(f, "unsupported content type: {ty}")
            }
            RagError::Embedding { provider, message } => {
                write!(f, "embedding service error ({provider}): {message}")
            }
            RagError::IndexConflict { index, message } => {
                write!(f, "index conflict for '{index}': {message}")
            }
            RagError::IndexUnavailable { backend, message } => {
                write!(f, "vector index unavailable ({backend}): {message}")
            }
            RagError::Ingestion { source, committed_batches, committed_chunks, message } => write!(
                f,
                "ingestion of '{source}' failed after {committed_batches} committed batch(es) \
                 ({committed_chunks} chunks): {message}"
            ),
            RagError::Config(message) => write!(f, "configuration error: {message}"),
        }
    }
}

impl std::error::Error for RagError {}

/// A convenience result type for ingestion and retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
