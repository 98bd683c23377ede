//! Canned completion model for tests and development.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::message::ChatMessage;
use crate::model::CompletionModel;

/// A [`CompletionModel`] that returns a fixed reply and records every
/// request it receives.
///
/// # Example
///
/// ```rust,ignore
/// use casa_assist::mock::MockCompletionModel;
///
/// let model = MockCompletionModel::replying("The Wi-Fi password is on the fridge.");
/// let reply = model.complete(&messages, 0.0).await?;
/// let (messages, temperature) = model.last_request().await.unwrap();
/// ```
#[derive(Default)]
pub struct MockCompletionModel {
    reply: String,
    requests: Mutex<Vec<(Vec<ChatMessage>, f32)>>,
}

impl MockCompletionModel {
    /// A mock that always replies with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self { reply: reply.into(), requests: Mutex::new(Vec::new()) }
    }

    /// The most recent `(messages, temperature)` request, if any.
    pub async fn last_request(&self) -> Option<(Vec<ChatMessage>, f32)> {
        self.requests.lock().await.last().cloned()
    }

    /// Number of completion calls made so far.
    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl CompletionModel for MockCompletionModel {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, messages: &[ChatMessage], temperature: f32) -> Result<String> {
        self.requests.lock().await.push((messages.to_vec(), temperature));
        Ok(self.reply.clone())
    }
}
