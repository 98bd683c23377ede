//! # casa-rag
//!
//! Document ingestion and vector retrieval for the Casa resident assistant.
//!
//! This crate owns the knowledge-base half of the assistant: it takes an
//! uploaded document, splits it into overlapping chunks, embeds each batch
//! of chunks through an [`EmbeddingProvider`], and upserts the resulting
//! records into a namespaced [`VectorIndex`]. The query side of the
//! assistant (history, prompting, completion) lives in `casa-assist` and
//! consumes the same two traits.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use casa_rag::{
//!     Document, IngestConfig, Ingestor, MemoryIndex, Metric, OpenAIEmbedder, OverlapChunker,
//!     VectorIndex,
//! };
//!
//! let embedder = Arc::new(OpenAIEmbedder::from_env()?);
//! let index = Arc::new(MemoryIndex::new());
//! index.ensure_index(embedder.dimensions(), Metric::Cosine).await?;
//!
//! let ingestor = Ingestor::builder()
//!     .config(IngestConfig::default())
//!     .chunker(Arc::new(OverlapChunker::new(1000, 200)))
//!     .embedder(embedder)
//!     .index(index)
//!     .build()?;
//!
//! let report = ingestor.ingest(&Document::new("faq.md", "text/markdown", text)).await?;
//! ```
//!
//! ## Backends
//!
//! | Backend | Feature | Notes |
//! |---------|---------|-------|
//! | [`MemoryIndex`] | always | cosine over `RwLock<HashMap>`, for tests and development |
//! | [`PineconeIndex`] | `pinecone` | serverless REST API, control + data plane |
//! | [`OpenAIEmbedder`] | `openai` | `text-embedding-3-small`, 1536 dimensions |
//!
//! Ingestion is deliberately not transactional: batches commit in document
//! order and a mid-document failure leaves earlier batches durably indexed.
//! Chunk IDs are deterministic (`{source}-{index}`), so re-ingesting the
//! same document overwrites rather than duplicates.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod ingest;
pub mod memory;

#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "pinecone")]
pub mod pinecone;

pub use chunking::{Chunker, OverlapChunker};
pub use config::{DEFAULT_ALLOWED_TYPES, IngestConfig, IngestConfigBuilder};
pub use document::{Chunk, Document};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use index::{IndexRecord, Metric, RecordMetadata, ScoredRecord, VectorIndex};
pub use ingest::{IngestionReport, Ingestor, IngestorBuilder};
pub use memory::MemoryIndex;

#[cfg(feature = "openai")]
pub use openai::OpenAIEmbedder;
#[cfg(feature = "pinecone")]
pub use pinecone::PineconeIndex;
