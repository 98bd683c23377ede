//! Retrieval-augmented answer pipeline.
//!
//! The [`Assistant`] coordinates one resident question end to end:
//! history load → question embedding → vector search → prompt assembly →
//! completion. Steps run strictly sequentially, and any failure surfaces
//! as a single [`AssistError::QueryFailed`]: no partial answer, no
//! automatic retry.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use casa_assist::{Assistant, AssistConfig};
//!
//! let assistant = Assistant::builder()
//!     .config(AssistConfig::default())
//!     .embedder(embedder)
//!     .index(index)
//!     .model(model)
//!     .threads(threads)
//!     .build()?;
//!
//! let answer = assistant.answer("What is the Wi-Fi password?", Some("thread-7")).await?;
//! println!("{} (sources: {:?})", answer.answer, answer.sources);
//! ```

use std::sync::Arc;

use casa_rag::{EmbeddingProvider, VectorIndex};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::AssistConfig;
use crate::error::{AssistError, Result};
use crate::model::CompletionModel;
use crate::prompt;
use crate::threads::{ThreadStore, Turn};

/// A grounded reply to one resident question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    /// The trimmed completion text.
    pub answer: String,
    /// Distinct source-document names behind the retrieved context, in
    /// ranking order.
    pub sources: Vec<String>,
}

/// The retrieval-augmented answer orchestrator.
///
/// Stateless across calls: conversation state lives entirely in the
/// externally owned thread store, and the vector index is read-only here.
pub struct Assistant {
    config: AssistConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    model: Arc<dyn CompletionModel>,
    threads: Arc<dyn ThreadStore>,
}

impl Assistant {
    /// Create a new [`AssistantBuilder`].
    pub fn builder() -> AssistantBuilder {
        AssistantBuilder::default()
    }

    /// Return a reference to the assistant configuration.
    pub fn config(&self) -> &AssistConfig {
        &self.config
    }

    /// Answer a resident's question, optionally grounded in a persisted
    /// conversation thread.
    ///
    /// A `thread_id` that does not resolve to a thread is treated as an
    /// empty history, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`AssistError::QueryFailed`] if the thread store, the
    /// embedding call, the index query, or the completion call fails.
    pub async fn answer(&self, question: &str, thread_id: Option<&str>) -> Result<Answer> {
        let history = self.load_history(thread_id).await?;

        let query_vector = self.embedder.embed(question).await.map_err(|e| {
            error!(error = %e, "question embedding failed");
            AssistError::QueryFailed(format!("question embedding failed: {e}"))
        })?;

        let matches = self
            .index
            .query(&self.config.namespace, &query_vector, self.config.top_k, true)
            .await
            .map_err(|e| {
                error!(namespace = %self.config.namespace, error = %e, "context search failed");
                AssistError::QueryFailed(format!("context search failed: {e}"))
            })?;

        debug!(match_count = matches.len(), "retrieved context");

        let context = prompt::context_block(&matches, self.config.snippet_chars);
        let sources = prompt::distinct_sources(&matches);
        let messages =
            prompt::conversation(&self.config.instruction, &history, &context, question);

        let completion =
            self.model.complete(&messages, self.config.temperature).await.map_err(|e| {
                error!(model = %self.model.name(), error = %e, "completion failed");
                AssistError::QueryFailed(format!("completion failed: {e}"))
            })?;

        info!(
            model = %self.model.name(),
            source_count = sources.len(),
            history_turns = history.len(),
            "answered question"
        );

        Ok(Answer { answer: completion.trim().to_string(), sources })
    }

    /// Load the turns of the given thread; absent ID or thread means an
    /// empty history. Store failures are real errors.
    async fn load_history(&self, thread_id: Option<&str>) -> Result<Vec<Turn>> {
        let Some(id) = thread_id else {
            return Ok(Vec::new());
        };
        let thread = self.threads.thread(id).await.map_err(|e| {
            error!(thread_id = id, error = %e, "thread load failed");
            AssistError::QueryFailed(format!("thread load failed: {e}"))
        })?;
        Ok(thread.map(|t| t.turns).unwrap_or_default())
    }
}

/// Builder for constructing an [`Assistant`].
///
/// All collaborators are required; `config` falls back to
/// [`AssistConfig::default`].
#[derive(Default)]
pub struct AssistantBuilder {
    config: Option<AssistConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    model: Option<Arc<dyn CompletionModel>>,
    threads: Option<Arc<dyn ThreadStore>>,
}

impl AssistantBuilder {
    /// Set the assistant configuration.
    pub fn config(mut self, config: AssistConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider used for questions.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index queried for context.
    pub fn index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the completion model.
    pub fn model(mut self, model: Arc<dyn CompletionModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the thread store.
    pub fn threads(mut self, threads: Arc<dyn ThreadStore>) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Build the [`Assistant`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`AssistError::Config`] if a required field is missing.
    pub fn build(self) -> Result<Assistant> {
        let embedder =
            self.embedder.ok_or_else(|| AssistError::Config("embedder is required".to_string()))?;
        let index =
            self.index.ok_or_else(|| AssistError::Config("index is required".to_string()))?;
        let model =
            self.model.ok_or_else(|| AssistError::Config("model is required".to_string()))?;
        let threads =
            self.threads.ok_or_else(|| AssistError::Config("threads is required".to_string()))?;

        Ok(Assistant {
            config: self.config.unwrap_or_default(),
            embedder,
            index,
            model,
            threads,
        })
    }
}
