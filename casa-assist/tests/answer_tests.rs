//! Answer pipeline tests against stub collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use casa_assist::assistant::Assistant;
use casa_assist::config::AssistConfig;
use casa_assist::error::AssistError;
use casa_assist::message::{ChatMessage, Role};
use casa_assist::mock::MockCompletionModel;
use casa_assist::model::CompletionModel;
use casa_assist::threads::{MemoryThreadStore, Thread, ThreadStore, Turn};
use casa_rag::chunking::OverlapChunker;
use casa_rag::document::Document;
use casa_rag::embedding::EmbeddingProvider;
use casa_rag::error::{RagError, Result as RagResult};
use casa_rag::index::{IndexRecord, Metric, RecordMetadata, ScoredRecord, VectorIndex};
use casa_rag::ingest::Ingestor;
use casa_rag::memory::MemoryIndex;
use tokio::sync::Mutex;

const DIM: usize = 4;

/// Deterministic per-input fingerprint embedder.
struct StubEmbedder;

fn fingerprint(text: &str) -> Vec<f32> {
    let sum: u32 = text.bytes().map(u32::from).sum();
    vec![
        text.len() as f32,
        text.bytes().next().unwrap_or_default() as f32,
        (sum % 997) as f32,
        1.0,
    ]
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> RagResult<Vec<f32>> {
        Ok(fingerprint(text))
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Embedder that always fails, for error-path tests.
struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    async fn embed(&self, _text: &str) -> RagResult<Vec<f32>> {
        Err(RagError::Embedding {
            provider: "stub".to_string(),
            message: "simulated outage".to_string(),
        })
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Index stub that returns a fixed ranked result set for every query.
struct CannedIndex {
    matches: Vec<ScoredRecord>,
}

fn canned(source: &str, text: &str, score: f32) -> ScoredRecord {
    ScoredRecord {
        id: format!("{source}-0"),
        score,
        metadata: Some(RecordMetadata { source: source.to_string(), text: text.to_string() }),
    }
}

#[async_trait]
impl VectorIndex for CannedIndex {
    async fn ensure_index(&self, _dimension: usize, _metric: Metric) -> RagResult<()> {
        Ok(())
    }

    async fn upsert(&self, _namespace: &str, _records: &[IndexRecord]) -> RagResult<()> {
        Ok(())
    }

    async fn query(
        &self,
        _namespace: &str,
        _vector: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> RagResult<Vec<ScoredRecord>> {
        let mut matches = self.matches.clone();
        matches.truncate(top_k);
        if !include_metadata {
            for m in &mut matches {
                m.metadata = None;
            }
        }
        Ok(matches)
    }
}

/// Completion stub that echoes the content of its final user-role message
/// and records every request.
#[derive(Default)]
struct EchoModel {
    requests: Mutex<Vec<(Vec<ChatMessage>, f32)>>,
}

impl EchoModel {
    async fn last_request(&self) -> (Vec<ChatMessage>, f32) {
        self.requests.lock().await.last().cloned().expect("no completion call recorded")
    }
}

#[async_trait]
impl CompletionModel for EchoModel {
    fn name(&self) -> &str {
        "echo"
    }

    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> casa_assist::error::Result<String> {
        self.requests.lock().await.push((messages.to_vec(), temperature));
        let echoed = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(format!("  {echoed}  "))
    }
}

/// Thread store whose reads always fail.
struct FailingThreadStore;

#[async_trait]
impl ThreadStore for FailingThreadStore {
    async fn thread(&self, _id: &str) -> casa_assist::error::Result<Option<Thread>> {
        Err(AssistError::ThreadStore("simulated outage".to_string()))
    }
}

fn assistant(
    index: Arc<dyn VectorIndex>,
    model: Arc<EchoModel>,
    threads: Arc<dyn ThreadStore>,
) -> Assistant {
    Assistant::builder()
        .config(AssistConfig::default())
        .embedder(Arc::new(StubEmbedder))
        .index(index)
        .model(model)
        .threads(threads)
        .build()
        .unwrap()
}

#[tokio::test]
async fn context_block_lists_matches_in_ranking_order() {
    let index = Arc::new(CannedIndex {
        matches: vec![
            canned("s1", "first excerpt", 0.9),
            canned("s2", "second excerpt", 0.7),
            canned("s3", "third excerpt", 0.5),
        ],
    });
    let model = Arc::new(EchoModel::default());
    let assistant = assistant(index, model.clone(), Arc::new(MemoryThreadStore::new()));

    assistant.answer("what do the documents say?", None).await.unwrap();

    let (messages, _) = model.last_request().await;
    let context = &messages[messages.len() - 2];
    assert_eq!(context.role, Role::System);

    let p1 = context.content.find("(1) s1: first excerpt").expect("rank 1 missing");
    let p2 = context.content.find("(2) s2: second excerpt").expect("rank 2 missing");
    let p3 = context.content.find("(3) s3: third excerpt").expect("rank 3 missing");
    assert!(p1 < p2 && p2 < p3);
}

#[tokio::test]
async fn missing_thread_id_and_unknown_thread_both_mean_empty_history() {
    let index = Arc::new(CannedIndex { matches: Vec::new() });
    let model = Arc::new(EchoModel::default());
    let assistant = assistant(index, model.clone(), Arc::new(MemoryThreadStore::new()));

    assistant.answer("hello?", None).await.unwrap();
    let (messages, _) = model.last_request().await;
    // Instruction, context, question — no history turns.
    assert_eq!(messages.len(), 3);

    assistant.answer("hello?", Some("nonexistent")).await.unwrap();
    let (messages, _) = model.last_request().await;
    assert_eq!(messages.len(), 3);
}

#[tokio::test]
async fn history_turns_are_mapped_in_order() {
    let threads = Arc::new(MemoryThreadStore::new());
    threads
        .put(Thread {
            id: "t1".to_string(),
            turns: vec![
                Turn::resident("is the gym open?"),
                Turn::assistant("Yes, until 22:00."),
                Turn::resident("and the sauna?"),
            ],
        })
        .await;

    let index = Arc::new(CannedIndex { matches: Vec::new() });
    let model = Arc::new(EchoModel::default());
    let assistant = assistant(index, model.clone(), threads);

    assistant.answer("thanks!", Some("t1")).await.unwrap();

    let (messages, _) = model.last_request().await;
    assert_eq!(messages.len(), 6);
    assert_eq!(messages[0].role, Role::System);
    assert_eq!((messages[1].role, messages[1].content.as_str()), (Role::User, "is the gym open?"));
    assert_eq!(
        (messages[2].role, messages[2].content.as_str()),
        (Role::Assistant, "Yes, until 22:00.")
    );
    assert_eq!((messages[3].role, messages[3].content.as_str()), (Role::User, "and the sauna?"));
    assert_eq!(messages[4].role, Role::System);
    assert_eq!((messages[5].role, messages[5].content.as_str()), (Role::User, "thanks!"));
}

#[tokio::test]
async fn wifi_question_is_grounded_in_the_faq() {
    let index = Arc::new(CannedIndex {
        matches: vec![canned("faq.md", "The Wi-Fi password is posted on the fridge.", 0.93)],
    });
    let model = Arc::new(EchoModel::default());
    let assistant = assistant(index, model.clone(), Arc::new(MemoryThreadStore::new()));

    let question = "What is the Wi-Fi password?";
    let answer = assistant.answer(question, None).await.unwrap();

    assert_eq!(answer.sources, ["faq.md"]);
    // The echo model repeats the final user message, which must be the
    // question itself; the pipeline trims the reply.
    assert_eq!(answer.answer, question);

    let (messages, temperature) = model.last_request().await;
    assert_eq!(temperature, 0.0);
    assert_eq!(messages.last().unwrap().content, question);
    let context = &messages[messages.len() - 2];
    assert!(context.content.contains("faq.md"));
    assert!(context.content.contains("The Wi-Fi password is"));
}

#[tokio::test]
async fn replies_are_trimmed_and_cost_one_completion_call() {
    let index = Arc::new(CannedIndex { matches: vec![canned("faq.md", "gym hours", 0.9)] });
    let model = Arc::new(MockCompletionModel::replying("  The gym closes at 22:00.  "));
    let assistant = Assistant::builder()
        .config(AssistConfig::default())
        .embedder(Arc::new(StubEmbedder))
        .index(index)
        .model(model.clone())
        .threads(Arc::new(MemoryThreadStore::new()))
        .build()
        .unwrap();

    let answer = assistant.answer("When does the gym close?", None).await.unwrap();
    assert_eq!(answer.answer, "The gym closes at 22:00.");
    assert_eq!(model.request_count().await, 1);

    let (_, temperature) = model.last_request().await.unwrap();
    assert_eq!(temperature, 0.0);
}

#[tokio::test]
async fn sources_are_deduplicated_in_ranking_order() {
    let index = Arc::new(CannedIndex {
        matches: vec![
            canned("faq.md", "wifi", 0.9),
            canned("rules.md", "quiet hours", 0.8),
            canned("faq.md", "laundry", 0.7),
        ],
    });
    let model = Arc::new(EchoModel::default());
    let assistant = assistant(index, model.clone(), Arc::new(MemoryThreadStore::new()));

    let answer = assistant.answer("anything", None).await.unwrap();
    assert_eq!(answer.sources, ["faq.md", "rules.md"]);
}

#[tokio::test]
async fn embedding_failure_surfaces_as_query_failed() {
    let assistant = Assistant::builder()
        .embedder(Arc::new(FailingEmbedder))
        .index(Arc::new(CannedIndex { matches: Vec::new() }))
        .model(Arc::new(EchoModel::default()))
        .threads(Arc::new(MemoryThreadStore::new()))
        .build()
        .unwrap();

    let err = assistant.answer("hello?", None).await.unwrap_err();
    assert!(matches!(err, AssistError::QueryFailed(_)));
}

#[tokio::test]
async fn thread_store_failure_surfaces_as_query_failed() {
    let index = Arc::new(CannedIndex { matches: Vec::new() });
    let model = Arc::new(EchoModel::default());
    let assistant = assistant(index, model.clone(), Arc::new(FailingThreadStore));

    let err = assistant.answer("hello?", Some("t1")).await.unwrap_err();
    assert!(matches!(err, AssistError::QueryFailed(_)));
    // No partial work: the completion model was never called.
    assert!(model.requests.lock().await.is_empty());
}

#[tokio::test]
async fn ingested_documents_are_retrievable_through_the_assistant() {
    // Full round trip across both crates: ingest a document, then answer a
    // question against the same index with the same embedder.
    let index = Arc::new(MemoryIndex::new());
    index.ensure_index(DIM, Metric::Cosine).await.unwrap();

    let ingestor = Ingestor::builder()
        .chunker(Arc::new(OverlapChunker::new(1000, 200)))
        .embedder(Arc::new(StubEmbedder))
        .index(index.clone())
        .build()
        .unwrap();
    ingestor
        .ingest(&Document::new(
            "faq.md",
            "text/markdown",
            "The Wi-Fi password is posted on the fridge in every house.",
        ))
        .await
        .unwrap();

    let model = Arc::new(EchoModel::default());
    let assistant = assistant(index, model.clone(), Arc::new(MemoryThreadStore::new()));

    let answer = assistant.answer("What is the Wi-Fi password?", None).await.unwrap();
    assert_eq!(answer.sources, ["faq.md"]);

    let (messages, _) = model.last_request().await;
    let context = &messages[messages.len() - 2];
    assert!(context.content.contains("(1) faq.md: The Wi-Fi password"));
}
