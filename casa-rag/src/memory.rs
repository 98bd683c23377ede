//! In-memory vector index.
//!
//! This module provides [`MemoryIndex`], a zero-dependency index backed by a
//! `HashMap` behind a `tokio::sync::RwLock`. It is suitable for development,
//! tests, and small deployments, and it enforces the same configuration and
//! dimension rules a remote backend would.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{RagError, Result};
use crate::index::{IndexRecord, Metric, ScoredRecord, VectorIndex};

/// The configuration recorded by a successful `ensure_index` call.
#[derive(Debug, Clone, Copy, PartialEq)]
struct IndexSpec {
    dimension: usize,
    metric: Metric,
}

/// An in-memory [`VectorIndex`].
///
/// Records live in nested maps: namespace → record ID → record. The index
/// must be provisioned with [`ensure_index`](VectorIndex::ensure_index)
/// before records are written or queried.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    spec: RwLock<Option<IndexSpec>>,
    namespaces: RwLock<HashMap<String, HashMap<String, IndexRecord>>>,
}

impl MemoryIndex {
    /// Create a new empty in-memory index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records stored in a namespace.
    pub async fn record_count(&self, namespace: &str) -> usize {
        let namespaces = self.namespaces.read().await;
        namespaces.get(namespace).map_or(0, HashMap::len)
    }

    async fn spec(&self) -> Result<IndexSpec> {
        let spec = self.spec.read().await;
        spec.ok_or_else(|| RagError::IndexUnavailable {
            backend: "memory".to_string(),
            message: "index has not been provisioned; call ensure_index first".to_string(),
        })
    }
}

/// Cosine similarity of two vectors; 0.0 if either has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Score under the configured metric, arranged so that higher is always
/// more similar (Euclidean distance is negated).
fn score(metric: Metric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        Metric::Cosine => cosine_similarity(a, b),
        Metric::Dotproduct => a.iter().zip(b.iter()).map(|(x, y)| x * y).sum(),
        Metric::Euclidean => {
            let dist: f32 = a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum();
            -dist.sqrt()
        }
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn ensure_index(&self, dimension: usize, metric: Metric) -> Result<()> {
        let mut spec = self.spec.write().await;
        match *spec {
            None => {
                *spec = Some(IndexSpec { dimension, metric });
                Ok(())
            }
            Some(existing) if existing == (IndexSpec { dimension, metric }) => Ok(()),
            Some(existing) => Err(RagError::IndexConflict {
                index: "memory".to_string(),
                message: format!(
                    "existing index is {}d/{}, requested {dimension}d/{metric}",
                    existing.dimension, existing.metric
                ),
            }),
        }
    }

    async fn upsert(&self, namespace: &str, records: &[IndexRecord]) -> Result<()> {
        let spec = self.spec().await?;
        for record in records {
            if record.values.len() != spec.dimension {
                return Err(RagError::IndexUnavailable {
                    backend: "memory".to_string(),
                    message: format!(
                        "record '{}' has dimension {}, index expects {}",
                        record.id,
                        record.values.len(),
                        spec.dimension
                    ),
                });
            }
        }

        let mut namespaces = self.namespaces.write().await;
        let records_by_id = namespaces.entry(namespace.to_string()).or_default();
        for record in records {
            records_by_id.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<ScoredRecord>> {
        let spec = self.spec().await?;
        let namespaces = self.namespaces.read().await;
        let records_by_id = match namespaces.get(namespace) {
            Some(records) => records,
            None => return Ok(Vec::new()),
        };

        let mut scored: Vec<ScoredRecord> = records_by_id
            .values()
            .map(|record| ScoredRecord {
                id: record.id.clone(),
                score: score(spec.metric, &record.values, vector),
                metadata: include_metadata.then(|| record.metadata.clone()),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}
