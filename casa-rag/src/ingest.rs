//! Document ingestion pipeline.
//!
//! The [`Ingestor`] orchestrates the validate → chunk → embed → upsert
//! workflow for one uploaded document, in size-bounded sequential batches.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use casa_rag::{Ingestor, IngestConfig, OverlapChunker, MemoryIndex};
//!
//! let ingestor = Ingestor::builder()
//!     .config(IngestConfig::default())
//!     .chunker(Arc::new(OverlapChunker::new(1000, 200)))
//!     .embedder(Arc::new(embedder))
//!     .index(Arc::new(MemoryIndex::new()))
//!     .build()?;
//!
//! let report = ingestor.ingest(&document).await?;
//! println!("indexed {} chunks from {}", report.chunk_count, report.source);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::chunking::Chunker;
use crate::config::IngestConfig;
use crate::document::{Chunk, Document};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::{IndexRecord, RecordMetadata, VectorIndex};

/// Summary of one completed ingestion call.
///
/// Serializes as `{"chunks": …, "file": …, "batches": …}` for the upload
/// route's response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestionReport {
    /// Name of the ingested document.
    #[serde(rename = "file")]
    pub source: String,
    /// Total number of chunks written to the index.
    #[serde(rename = "chunks")]
    pub chunk_count: usize,
    /// Number of embed-and-upsert batches performed.
    pub batches: usize,
}

/// The document ingestion orchestrator.
///
/// Batches are processed strictly sequentially: one embedding call and one
/// upsert per batch, in document order. This bounds peak memory and keeps
/// the embedding service's rate limits honest, at the cost of ingestion
/// latency proportional to document size. There is no rollback: a failure
/// at batch *k* leaves batches 1..k-1 durably indexed, and the error
/// reports the committed progress so a re-ingest can overwrite in place.
pub struct Ingestor {
    config: IngestConfig,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl Ingestor {
    /// Create a new [`IngestorBuilder`].
    pub fn builder() -> IngestorBuilder {
        IngestorBuilder::default()
    }

    /// Return a reference to the ingestion configuration.
    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Ingest a single document: validate → chunk → embed → upsert.
    ///
    /// # Errors
    ///
    /// - [`RagError::UnsupportedContentType`] if the declared media type is
    ///   not in the allow-list; rejected before any other work.
    /// - [`RagError::Ingestion`] if embedding or upserting fails partway,
    ///   carrying the number of batches already committed.
    pub async fn ingest(&self, document: &Document) -> Result<IngestionReport> {
        if !self.config.accepts(&document.mime_type) {
            return Err(RagError::UnsupportedContentType(document.mime_type.clone()));
        }

        let chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            info!(source = %document.name, chunk_count = 0, "ingested document (empty)");
            return Ok(IngestionReport { source: document.name.clone(), chunk_count: 0, batches: 0 });
        }

        let mut committed_batches = 0;
        let mut committed_chunks = 0;
        for batch in chunks.chunks(self.config.batch_size) {
            self.ingest_batch(batch).await.map_err(|e| {
                error!(
                    source = %document.name,
                    committed_batches,
                    error = %e,
                    "ingestion stopped partway"
                );
                RagError::Ingestion {
                    source: document.name.clone(),
                    committed_batches,
                    committed_chunks,
                    message: e.to_string(),
                }
            })?;
            committed_batches += 1;
            committed_chunks += batch.len();
        }

        info!(
            source = %document.name,
            chunk_count = chunks.len(),
            batches = committed_batches,
            "ingested document"
        );

        Ok(IngestionReport {
            source: document.name.clone(),
            chunk_count: chunks.len(),
            batches: committed_batches,
        })
    }

    /// Embed one batch of chunks and upsert the resulting records.
    async fn ingest_batch(&self, batch: &[Chunk]) -> Result<()> {
        let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let records: Vec<IndexRecord> = batch
            .iter()
            .zip(embeddings)
            .map(|(chunk, values)| IndexRecord {
                id: chunk.id.clone(),
                values,
                metadata: RecordMetadata { source: chunk.source.clone(), text: chunk.text.clone() },
            })
            .collect();

        self.index.upsert(&self.config.namespace, &records).await
    }
}

/// Builder for constructing an [`Ingestor`].
///
/// All fields are required except `config`, which falls back to
/// [`IngestConfig::default`].
#[derive(Default)]
pub struct IngestorBuilder {
    config: Option<IngestConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
}

impl IngestorBuilder {
    /// Set the ingestion configuration.
    pub fn config(mut self, config: IngestConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Build the [`Ingestor`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a required field is missing.
    pub fn build(self) -> Result<Ingestor> {
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let index = self.index.ok_or_else(|| RagError::Config("index is required".to_string()))?;

        Ok(Ingestor { config: self.config.unwrap_or_default(), chunker, embedder, index })
    }
}
