//! Configuration for the answer pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{AssistError, Result};

/// The fixed system instruction for the resident assistant.
pub const DEFAULT_INSTRUCTION: &str = "You are a helpful community assistant for residents of a \
shared-housing provider. Use the conversation history and the provided document excerpts to \
answer accurately. When the excerpts do not cover the question, say so rather than guessing.";

/// Configuration parameters for answering a resident's question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistConfig {
    /// Number of nearest records retrieved per question.
    pub top_k: usize,
    /// Maximum number of characters of each chunk rendered into the context
    /// block.
    pub snippet_chars: usize,
    /// Sampling temperature for the completion call.
    pub temperature: f32,
    /// Namespace queried for context.
    pub namespace: String,
    /// System instruction placed first in every prompt.
    pub instruction: String,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            snippet_chars: 200,
            temperature: 0.0,
            namespace: "default".to_string(),
            instruction: DEFAULT_INSTRUCTION.to_string(),
        }
    }
}

impl AssistConfig {
    /// Create a new builder for constructing an [`AssistConfig`].
    pub fn builder() -> AssistConfigBuilder {
        AssistConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`AssistConfig`].
#[derive(Debug, Clone, Default)]
pub struct AssistConfigBuilder {
    config: AssistConfig,
}

impl AssistConfigBuilder {
    /// Set the number of records retrieved per question.
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    /// Set the per-chunk snippet length in characters.
    pub fn snippet_chars(mut self, snippet_chars: usize) -> Self {
        self.config.snippet_chars = snippet_chars;
        self
    }

    /// Set the completion sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the namespace queried for context.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.namespace = namespace.into();
        self
    }

    /// Replace the system instruction.
    pub fn instruction(mut self, instruction: impl Into<String>) -> Self {
        self.config.instruction = instruction.into();
        self
    }

    /// Build the [`AssistConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`AssistError::Config`] if:
    /// - `top_k == 0`
    /// - `snippet_chars == 0`
    /// - `temperature` is outside `0.0..=2.0`
    pub fn build(self) -> Result<AssistConfig> {
        if self.config.top_k == 0 {
            return Err(AssistError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.snippet_chars == 0 {
            return Err(AssistError::Config("snippet_chars must be greater than zero".to_string()));
        }
        if !(0.0..=2.0).contains(&self.config.temperature) {
            return Err(AssistError::Config(format!(
                "temperature ({}) must be within 0.0..=2.0",
                self.config.temperature
            )));
        }
        Ok(self.config)
    }
}
