//! Pinecone vector index backend.
//!
//! Speaks the Pinecone REST API directly over `reqwest`: the control plane
//! for index provisioning and the per-index data-plane host for upserts and
//! queries. Only available when the `pinecone` feature is enabled.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

use crate::error::{RagError, Result};
use crate::index::{IndexRecord, Metric, RecordMetadata, ScoredRecord, VectorIndex};

/// The Pinecone control-plane endpoint.
const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";

/// Per-request timeout for control- and data-plane calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Delay between readiness polls while an index is provisioning.
const PROVISION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Upper bound on readiness polls (~5 minutes of provisioning).
const PROVISION_MAX_POLLS: usize = 150;

/// A [`VectorIndex`] backed by a Pinecone serverless index.
///
/// The index name is fixed at construction; `ensure_index` provisions it on
/// first use and may block while the service brings it up, which callers
/// should treat as a one-time startup cost. Records are upserted and
/// queried against the index's data-plane host, resolved once and cached.
///
/// # Example
///
/// ```rust,ignore
/// use casa_rag::{Metric, PineconeIndex, VectorIndex};
///
/// let index = PineconeIndex::from_env("casa-docs")?;
/// index.ensure_index(1536, Metric::Cosine).await?;
/// index.upsert("default", &records).await?;
/// ```
pub struct PineconeIndex {
    client: reqwest::Client,
    api_key: String,
    control_url: String,
    name: String,
    cloud: String,
    region: String,
    host: OnceCell<String>,
}

impl PineconeIndex {
    /// Create a client for the named index with the given API key.
    ///
    /// Serverless indexes are provisioned on `aws`/`us-east-1` unless
    /// [`with_placement`](Self::with_placement) overrides it.
    pub fn new(api_key: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::IndexUnavailable {
                backend: "pinecone".into(),
                message: "API key must not be empty".into(),
            });
        }

        let client = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build().map_err(|e| {
            RagError::IndexUnavailable {
                backend: "pinecone".into(),
                message: format!("failed to build HTTP client: {e}"),
            }
        })?;

        Ok(Self {
            client,
            api_key,
            control_url: CONTROL_PLANE_URL.into(),
            name: name.into(),
            cloud: "aws".into(),
            region: "us-east-1".into(),
            host: OnceCell::new(),
        })
    }

    /// Create a client from the `PINECONE_API_KEY` environment variable.
    pub fn from_env(name: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("PINECONE_API_KEY").map_err(|_| RagError::IndexUnavailable {
            backend: "pinecone".into(),
            message: "PINECONE_API_KEY environment variable not set".into(),
        })?;
        Self::new(api_key, name)
    }

    /// Override the serverless cloud/region placement.
    pub fn with_placement(mut self, cloud: impl Into<String>, region: impl Into<String>) -> Self {
        self.cloud = cloud.into();
        self.region = region.into();
        self
    }

    /// Override the control-plane URL (self-hosted gateways, tests).
    pub fn with_control_url(mut self, url: impl Into<String>) -> Self {
        self.control_url = url.into();
        self
    }

    fn unavailable(&self, message: String) -> RagError {
        RagError::IndexUnavailable { backend: "pinecone".into(), message }
    }

    async fn describe(&self) -> Result<Option<DescribeIndexResponse>> {
        let url = format!("{}/indexes/{}", self.control_url, self.name);
        let response = self
            .client
            .get(&url)
            .header("Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| self.unavailable(format!("describe request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(self.unavailable(format!("describe returned {status}: {body}")));
        }

        let described: DescribeIndexResponse = response
            .json()
            .await
            .map_err(|e| self.unavailable(format!("failed to parse describe response: {e}")))?;
        Ok(Some(described))
    }

    /// Resolve the index's data-plane host, describing the index on first use.
    async fn host(&self) -> Result<String> {
        let host = self
            .host
            .get_or_try_init(|| async {
                let described = self.describe().await?.ok_or_else(|| {
                    self.unavailable(format!(
                        "index '{}' does not exist; call ensure_index first",
                        self.name
                    ))
                })?;
                Ok::<_, RagError>(described.host)
            })
            .await?;
        Ok(format!("https://{host}"))
    }

    async fn data_plane_call<B: Serialize>(&self, path: &str, body: &B) -> Result<reqwest::Response> {
        let url = format!("{}{path}", self.host().await?);
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(index = %self.name, path, error = %e, "pinecone request failed");
                self.unavailable(format!("{path} request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(index = %self.name, path, %status, "pinecone API error");
            return Err(self.unavailable(format!("{path} returned {status}: {body}")));
        }
        Ok(response)
    }
}

// ── API request/response types ─────────────────────────────────────

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: Metric,
    spec: IndexSpec<'a>,
}

#[derive(Serialize)]
struct IndexSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Serialize)]
struct ServerlessSpec<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Deserialize)]
struct DescribeIndexResponse {
    dimension: usize,
    metric: Metric,
    host: String,
    status: IndexStatus,
}

#[derive(Deserialize)]
struct IndexStatus {
    ready: bool,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [IndexRecord],
    namespace: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    score: f32,
    metadata: Option<RecordMetadata>,
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn ensure_index(&self, dimension: usize, metric: Metric) -> Result<()> {
        if let Some(described) = self.describe().await? {
            if described.dimension != dimension || described.metric != metric {
                return Err(RagError::IndexConflict {
                    index: self.name.clone(),
                    message: format!(
                        "existing index is {}d/{}, requested {dimension}d/{metric}",
                        described.dimension, described.metric
                    ),
                });
            }
            debug!(index = %self.name, "pinecone index already exists");
            return Ok(());
        }

        let url = format!("{}/indexes", self.control_url);
        let request = CreateIndexRequest {
            name: &self.name,
            dimension,
            metric,
            spec: IndexSpec {
                serverless: ServerlessSpec { cloud: &self.cloud, region: &self.region },
            },
        };
        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.unavailable(format!("create request failed: {e}")))?;

        // A concurrent creator may have won the race; fall through to the
        // readiness poll, which re-checks the configuration.
        if !response.status().is_success() && response.status() != reqwest::StatusCode::CONFLICT {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(self.unavailable(format!("create returned {status}: {body}")));
        }

        info!(index = %self.name, dimension, %metric, "provisioning pinecone index");
        for _ in 0..PROVISION_MAX_POLLS {
            if let Some(described) = self.describe().await? {
                if described.dimension != dimension || described.metric != metric {
                    return Err(RagError::IndexConflict {
                        index: self.name.clone(),
                        message: format!(
                            "concurrently created index is {}d/{}, requested {dimension}d/{metric}",
                            described.dimension, described.metric
                        ),
                    });
                }
                if described.status.ready {
                    info!(index = %self.name, host = %described.host, "pinecone index ready");
                    return Ok(());
                }
            }
            tokio::time::sleep(PROVISION_POLL_INTERVAL).await;
        }

        Err(self.unavailable(format!("index '{}' did not become ready in time", self.name)))
    }

    async fn upsert(&self, namespace: &str, records: &[IndexRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }
        debug!(index = %self.name, namespace, count = records.len(), "upserting records");
        self.data_plane_call("/vectors/upsert", &UpsertRequest { vectors: records, namespace })
            .await?;
        Ok(())
    }

    async fn query(
        &self,
        namespace: &str,
        vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<ScoredRecord>> {
        let response = self
            .data_plane_call(
                "/query",
                &QueryRequest { namespace, vector, top_k, include_metadata },
            )
            .await?;

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| self.unavailable(format!("failed to parse query response: {e}")))?;

        Ok(parsed
            .matches
            .into_iter()
            .map(|m| ScoredRecord { id: m.id, score: m.score, metadata: m.metadata })
            .collect())
    }
}
