//! Grounded-prompt assembly.
//!
//! Turns retrieved records and persisted history into the message sequence
//! sent to the completion model: system instruction first, the mapped
//! history, a system message carrying the context block, and the resident's
//! question last.

use casa_rag::ScoredRecord;

use crate::message::ChatMessage;
use crate::threads::{Sender, Turn};

/// Context message used when retrieval returned nothing usable. Keeping a
/// context message in place holds the prompt shape stable either way.
const EMPTY_CONTEXT: &str = "No relevant excerpts were found in the knowledge base.";

/// Render retrieved records into a ranked context block.
///
/// Records appear in the given (descending-similarity) order as
/// `({rank}) {source}: {snippet}` entries joined by blank lines. Snippets
/// are truncated to `snippet_chars` characters with a trailing ellipsis.
/// Records without metadata cannot be rendered and are skipped.
pub fn context_block(records: &[ScoredRecord], snippet_chars: usize) -> String {
    let entries: Vec<String> = records
        .iter()
        .filter_map(|record| record.metadata.as_ref())
        .enumerate()
        .map(|(i, metadata)| {
            format!("({}) {}: {}", i + 1, metadata.source, snippet(&metadata.text, snippet_chars))
        })
        .collect();
    entries.join("\n\n")
}

/// The source names referenced by the records, deduplicated, in first
/// occurrence (ranking) order.
pub fn distinct_sources(records: &[ScoredRecord]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for record in records {
        if let Some(metadata) = &record.metadata {
            if !sources.iter().any(|s| s == &metadata.source) {
                sources.push(metadata.source.clone());
            }
        }
    }
    sources
}

/// Build the full message sequence for one question.
pub fn conversation(
    instruction: &str,
    history: &[Turn],
    context: &str,
    question: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 3);
    messages.push(ChatMessage::system(instruction));
    for turn in history {
        messages.push(match turn.sender {
            Sender::Resident => ChatMessage::user(&turn.text),
            Sender::Assistant => ChatMessage::assistant(&turn.text),
        });
    }
    let context = if context.is_empty() { EMPTY_CONTEXT } else { context };
    messages.push(ChatMessage::system(format!(
        "Relevant excerpts from the community knowledge base:\n\n{context}"
    )));
    messages.push(ChatMessage::user(question));
    messages
}

/// First `limit` characters of `text`, with an ellipsis when truncated.
fn snippet(text: &str, limit: usize) -> String {
    let mut chars = text.char_indices();
    match chars.nth(limit) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}
