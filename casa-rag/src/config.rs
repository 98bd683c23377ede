//! Configuration for the ingestion pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Media types accepted by ingestion when no explicit allow-list is set.
///
/// PDF appears here because uploads arrive with their text already
/// extracted; the pipeline never parses PDF bytes itself.
pub const DEFAULT_ALLOWED_TYPES: &[&str] = &["text/plain", "text/markdown", "application/pdf"];

/// Configuration parameters for document ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestConfig {
    /// Maximum chunk size in bytes (equal to characters for ASCII text).
    pub max_chars: usize,
    /// Number of trailing bytes repeated at the start of the next chunk.
    pub overlap: usize,
    /// Maximum number of chunks embedded per upstream call.
    pub batch_size: usize,
    /// Namespace that ingested records are written into.
    pub namespace: String,
    /// Media types accepted for ingestion.
    pub allowed_types: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_chars: 1000,
            overlap: 200,
            batch_size: 50,
            namespace: "default".to_string(),
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl IngestConfig {
    /// Create a new builder for constructing an [`IngestConfig`].
    pub fn builder() -> IngestConfigBuilder {
        IngestConfigBuilder::default()
    }

    /// Whether the given media type is accepted for ingestion.
    ///
    /// Parameters after a `;` (for example `charset=utf-8`) are ignored.
    pub fn accepts(&self, mime_type: &str) -> bool {
        let essence = mime_type.split(';').next().unwrap_or_default().trim();
        self.allowed_types.iter().any(|t| t.eq_ignore_ascii_case(essence))
    }
}

/// Builder for constructing a validated [`IngestConfig`].
#[derive(Debug, Clone, Default)]
pub struct IngestConfigBuilder {
    config: IngestConfig,
}

impl IngestConfigBuilder {
    /// Set the maximum chunk size.
    pub fn max_chars(mut self, max_chars: usize) -> Self {
        self.config.max_chars = max_chars;
        self
    }

    /// Set the overlap between consecutive chunks.
    pub fn overlap(mut self, overlap: usize) -> Self {
        self.config.overlap = overlap;
        self
    }

    /// Set the number of chunks embedded per upstream call.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Set the namespace that ingested records are written into.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Replace the media-type allow-list.
    pub fn allowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.allowed_types = types.into_iter().map(Into::into).collect();
        self
    }

    /// Build the [`IngestConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `overlap >= max_chars`
    /// - `max_chars == 0`
    /// - `batch_size == 0`
    pub fn build(self) -> Result<IngestConfig> {
        if self.config.max_chars == 0 {
            return Err(RagError::Config("max_chars must be greater than zero".to_string()));
        }
        if self.config.overlap >= self.config.max_chars {
            return Err(RagError::Config(format!(
                "overlap ({}) must be less than max_chars ({})",
                self.config.overlap, self.config.max_chars
            )));
        }
        if self.config.batch_size == 0 {
            return Err(RagError::Config("batch_size must be greater than zero".to_string()));
        }
        Ok(self.config)
    }
}
