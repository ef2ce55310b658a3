//! Integration tests for the screener.
//!
//! These drive the CLI router end to end over a DuckDB collection with mock
//! embeddings and scripted network services.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shariah_screener::{
    ChatClient, Commands, Container, ContainerConfig, Document, DomainError,
    DuckdbVectorRepository, FinancialSnapshot, MetricSource, MockEmbedding, Router, TextExtractor,
};

const FIQH_TEXT: &str = "Riba is any excess charged on a loan. It is prohibited. \
Companies whose interest income exceeds five percent of revenue are excluded. \
Interest-bearing debt should not exceed thirty-three percent of market capitalization. \
Purification requires donating the impermissible share of dividends.";

struct StaticExtractor;

#[async_trait]
impl TextExtractor for StaticExtractor {
    async fn extract(&self, path: &Path) -> Result<Document, DomainError> {
        Ok(Document::new(path.display().to_string(), FIQH_TEXT))
    }
}

struct StubMetrics {
    result: Result<FinancialSnapshot, String>,
}

#[async_trait]
impl MetricSource for StubMetrics {
    async fn fetch(&self, ticker: &str, _api_key: &str) -> Result<FinancialSnapshot, DomainError> {
        match &self.result {
            Ok(snapshot) => Ok(snapshot.clone().with_ticker(ticker)),
            Err(message) => Err(DomainError::data_fetch(message.clone())),
        }
    }
}

/// Records every user prompt and answers with the stage number.
#[derive(Default)]
struct RecordingChat {
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl ChatClient for RecordingChat {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, DomainError> {
        let mut prompts = self.prompts.lock().unwrap();
        prompts.push(user.to_string());
        Ok(format!("stage {} answer", prompts.len()))
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

struct TestEnv {
    container: Container,
    chat: Arc<RecordingChat>,
}

fn setup_test_env(metrics: Result<FinancialSnapshot, String>) -> TestEnv {
    let chat = Arc::new(RecordingChat::default());
    let container = Container::with_services(
        ContainerConfig {
            data_dir: "./chroma_db".to_string(),
            collection: "shariah_texts".to_string(),
            mock_embeddings: true,
        },
        Arc::new(MockEmbedding::new()),
        Arc::new(DuckdbVectorRepository::in_memory().expect("duckdb init")),
        Arc::new(StaticExtractor),
        chat.clone(),
        Arc::new(StubMetrics { result: metrics }),
    );
    TestEnv { container, chat }
}

fn technology() -> FinancialSnapshot {
    FinancialSnapshot::new("Technology", 2.5, Some(1.2))
}

async fn index(router: &Router<'_>) -> String {
    router
        .route(Commands::Index {
            path: "fiqh.pdf".to_string(),
            max_length: 120,
            reset: false,
        })
        .await
        .expect("index")
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stats_on_empty_collection() {
    let env = setup_test_env(Ok(technology()));
    let router = Router::new(&env.container);

    let output = router.route(Commands::Stats).await.expect("stats");
    assert!(output.contains("Collection:   shariah_texts"));
    assert!(output.contains("Total Chunks: 0"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_index_then_search_finds_exact_passage() {
    let env = setup_test_env(Ok(technology()));
    let router = Router::new(&env.container);

    let output = index(&router).await;
    assert!(output.contains("Indexed fiqh.pdf into collection 'shariah_texts'"));

    let stats = router.route(Commands::Stats).await.expect("stats");
    assert!(!stats.contains("Total Chunks: 0"));

    // Mock embeddings hash the text, so the first chunk is its own best match.
    let first_chunk = shariah_screener::chunk_text(FIQH_TEXT, 120)[0].clone();
    let output = router
        .route(Commands::Search {
            query: first_chunk,
            k: 2,
        })
        .await
        .expect("search");
    assert!(output.starts_with("Found 2 passages"));
    assert!(output.contains("1. doc_0"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reindex_with_reset_keeps_same_size() {
    let env = setup_test_env(Ok(technology()));
    let router = Router::new(&env.container);

    index(&router).await;
    let before = router.route(Commands::Stats).await.expect("stats");
    router
        .route(Commands::Index {
            path: "fiqh.pdf".to_string(),
            max_length: 120,
            reset: true,
        })
        .await
        .expect("reindex");
    let after = router.route(Commands::Stats).await.expect("stats");
    assert_eq!(before, after);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_analyze_runs_both_stages_with_context() {
    let env = setup_test_env(Ok(technology()));
    let router = Router::new(&env.container);
    index(&router).await;

    let output = router
        .route(Commands::Analyze {
            ticker: "aapl".to_string(),
            api_key: Some("key".to_string()),
            k: 3,
        })
        .await
        .expect("analyze");

    assert!(output.contains("Financial Snapshot: AAPL"));
    assert!(output.contains("Sector:            Technology"));
    assert!(output.contains("stage 1 answer"));
    assert!(output.contains("stage 2 answer"));

    let prompts = env.chat.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("stage 1 answer"));
    let chunks = shariah_screener::chunk_text(FIQH_TEXT, 120);
    assert!(chunks.iter().any(|c| prompts[1].contains(c.as_str())));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_analyze_on_empty_index_still_completes() {
    let env = setup_test_env(Ok(technology()));
    let router = Router::new(&env.container);

    let output = router
        .route(Commands::Analyze {
            ticker: "MSFT".to_string(),
            api_key: Some("key".to_string()),
            k: 3,
        })
        .await
        .expect("analyze");

    assert!(output.contains("(no passages retrieved)"));
    assert_eq!(env.chat.prompts.lock().unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_analyze_reports_missing_data_without_generation() {
    let env = setup_test_env(Err("Missing data.".to_string()));
    let router = Router::new(&env.container);

    let output = router
        .route(Commands::Analyze {
            ticker: "ZZZZ".to_string(),
            api_key: Some("key".to_string()),
            k: 3,
        })
        .await
        .expect("analyze");

    assert_eq!(output, "Error: Missing data.");
    assert!(env.chat.prompts.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_analyze_requires_ticker_and_key() {
    let env = setup_test_env(Ok(technology()));
    let router = Router::new(&env.container);

    let output = router
        .route(Commands::Analyze {
            ticker: "   ".to_string(),
            api_key: Some("key".to_string()),
            k: 3,
        })
        .await
        .expect("analyze");

    assert_eq!(output, "Please enter both your API key and a valid stock ticker.");
}
