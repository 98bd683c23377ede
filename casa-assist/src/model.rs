//! Completion model trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::ChatMessage;

/// A chat-completion backend.
///
/// Implementations wrap a specific completion service behind a unified
/// async interface; the answer pipeline sends at most one completion call
/// per resident question.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// The model or deployment name, for logging.
    fn name(&self) -> &str;

    /// Generate a completion for the given message sequence.
    ///
    /// `temperature` controls sampling creativity; the answer pipeline
    /// passes 0.0 to favour faithful grounding over creative phrasing.
    async fn complete(&self, messages: &[ChatMessage], temperature: f32) -> Result<String>;
}
