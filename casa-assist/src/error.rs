//! Error types for the `casa-assist` crate.

use thiserror::Error;

/// Errors that can occur while answering a resident's question.
#[derive(Debug, Error)]
pub enum AssistError {
    /// The completion service call failed or timed out.
    #[error("completion service error ({provider}): {message}")]
    Completion {
        /// The completion provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The conversation thread store failed.
    ///
    /// A thread that simply does not exist is not an error; the pipeline
    /// proceeds with an empty history instead.
    #[error("thread store error: {0}")]
    ThreadStore(String),

    /// Umbrella for any failure during the retrieval-augmented answer flow.
    ///
    /// No partial answer is returned and the pipeline does not retry.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// A configuration validation error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A convenience result type for assistant operations.
pub type Result<T> = std::result::Result<T, AssistError>;
