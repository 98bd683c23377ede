//! # casa-assist
//!
//! Retrieval-augmented chat answering for the Casa resident assistant.
//!
//! Given a resident's free-text question and an optional persisted
//! conversation thread, the [`Assistant`] embeds the question, retrieves
//! the most similar document chunks from the `casa-rag` vector index,
//! assembles a grounded prompt, and returns the completion model's reply
//! together with the distinct source documents behind it.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use casa_assist::{Assistant, AssistConfig, MemoryThreadStore, OpenAIChatModel};
//! use casa_rag::{MemoryIndex, OpenAIEmbedder};
//!
//! let assistant = Assistant::builder()
//!     .config(AssistConfig::default())
//!     .embedder(Arc::new(OpenAIEmbedder::from_env()?))
//!     .index(Arc::new(MemoryIndex::new()))
//!     .model(Arc::new(OpenAIChatModel::from_env()?))
//!     .threads(Arc::new(MemoryThreadStore::new()))
//!     .build()?;
//!
//! let answer = assistant.answer("What is the Wi-Fi password?", None).await?;
//! ```
//!
//! The pipeline holds no session state of its own: history lives in the
//! externally owned thread store, and one call makes exactly one
//! completion request.

pub mod assistant;
pub mod config;
pub mod error;
pub mod message;
pub mod mock;
pub mod model;
pub mod prompt;
pub mod threads;

#[cfg(feature = "openai")]
pub mod openai;

pub use assistant::{Answer, Assistant, AssistantBuilder};
pub use config::{AssistConfig, AssistConfigBuilder, DEFAULT_INSTRUCTION};
pub use error::{AssistError, Result};
pub use message::{ChatMessage, Role};
pub use mock::MockCompletionModel;
pub use model::CompletionModel;
pub use threads::{MemoryThreadStore, Sender, Thread, ThreadStore, Turn};

#[cfg(feature = "openai")]
pub use openai::OpenAIChatModel;
