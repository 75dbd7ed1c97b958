//! Hand-written stand-ins for the external collaborators.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use contrail_core::{
    ContextProvider, ContrailError, Embedder, IndexMatch, LanguageModel, Result, SimilarityIndex,
    SupplementaryContext,
};
use serde_json::json;

/// Route pipeline logs to the test output; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Marker present in the default expansion prompt.
pub const EXPANSION_MARKER: &str = "semantically similar queries";

/// Maps each known query to a one-hot vector; unknown queries fail.
#[derive(Debug, Default)]
pub struct TableEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    failing: Vec<String>,
}

impl TableEmbedder {
    pub fn new(queries: &[&str]) -> Self {
        let dimension = queries.len();
        let vectors = queries
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let mut v = vec![0.0; dimension];
                v[i] = 1.0;
                ((*q).to_string(), v)
            })
            .collect();
        Self {
            vectors,
            failing: Vec::new(),
        }
    }

    pub fn failing_on(mut self, query: &str) -> Self {
        self.failing.push(query.to_string());
        self
    }
}

#[async_trait]
impl Embedder for TableEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.failing.iter().any(|q| q == text) {
            return Err(ContrailError::embedding("embedding service unavailable"));
        }
        self.vectors
            .get(text)
            .cloned()
            .ok_or_else(|| ContrailError::embedding(format!("unknown query: {text}")))
    }

    fn dimension(&self) -> usize {
        self.vectors.len()
    }

    fn model_name(&self) -> &str {
        "table"
    }
}

/// Returns a fixed ranking for the position of the hot coordinate.
#[derive(Debug, Default)]
pub struct TableIndex {
    rankings: Vec<Vec<IndexMatch>>,
    pub calls: AtomicUsize,
}

impl TableIndex {
    /// `rankings[i]` is served for the i-th query given to [`TableEmbedder::new`].
    pub fn new(rankings: Vec<Vec<IndexMatch>>) -> Self {
        Self {
            rankings,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl SimilarityIndex for TableIndex {
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<IndexMatch>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let slot = vector
            .iter()
            .position(|v| *v > 0.5)
            .ok_or_else(|| ContrailError::similarity_index("zero vector"))?;
        Ok(self
            .rankings
            .get(slot)
            .map(|r| r.iter().take(top_k).cloned().collect())
            .unwrap_or_default())
    }
}

/// Always fails.
#[derive(Debug)]
pub struct DownIndex;

#[async_trait]
impl SimilarityIndex for DownIndex {
    async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<IndexMatch>> {
        Err(ContrailError::similarity_index("connection refused"))
    }
}

/// Far slower than any timeout the tests configure.
pub const STALL: Duration = Duration::from_secs(5);

/// Answers only after [`STALL`].
#[derive(Debug)]
pub struct StalledIndex;

#[async_trait]
impl SimilarityIndex for StalledIndex {
    async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<IndexMatch>> {
        tokio::time::sleep(STALL).await;
        Ok(vec![passage("Late", 0.99)])
    }
}

/// Answers expansion prompts with fixed lines and everything else with a
/// fixed answer, recording every prompt.
#[derive(Debug)]
pub struct ScriptedModel {
    expansion: String,
    answer: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(expansion: &str, answer: &str) -> Self {
        Self {
            expansion: expansion.to_string(),
            answer: answer.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn synthesis_prompt(&self) -> Option<String> {
        self.prompts
            .lock()
            .unwrap()
            .iter()
            .find(|p| !p.contains(EXPANSION_MARKER))
            .cloned()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if prompt.contains(EXPANSION_MARKER) {
            Ok(self.expansion.clone())
        } else {
            Ok(self.answer.clone())
        }
    }
}

/// Fails every call.
#[derive(Debug)]
pub struct DownModel;

#[async_trait]
impl LanguageModel for DownModel {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        Err(ContrailError::llm("service unavailable"))
    }
}

/// Answers every prompt only after [`STALL`].
#[derive(Debug)]
pub struct StalledModel;

#[async_trait]
impl LanguageModel for StalledModel {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        tokio::time::sleep(STALL).await;
        Ok("too late".to_string())
    }
}

/// Returns a fixed context, or fails.
#[derive(Debug)]
pub struct FixedContextProvider(pub Option<SupplementaryContext>);

#[async_trait]
impl ContextProvider for FixedContextProvider {
    async fn lookup(&self, _query: &str) -> Result<SupplementaryContext> {
        self.0
            .clone()
            .ok_or_else(|| ContrailError::context_provider("graph database offline"))
    }
}

/// Returns a context only after [`STALL`].
#[derive(Debug)]
pub struct StalledContextProvider(pub SupplementaryContext);

#[async_trait]
impl ContextProvider for StalledContextProvider {
    async fn lookup(&self, _query: &str) -> Result<SupplementaryContext> {
        tokio::time::sleep(STALL).await;
        Ok(self.0.clone())
    }
}

/// An index match for a named passage.
pub fn passage(name: &str, score: f32) -> IndexMatch {
    let mut metadata = HashMap::new();
    metadata.insert("filename".to_string(), json!(name.to_lowercase()));
    metadata.insert("file_type".to_string(), json!("pdf"));
    metadata.insert(
        "file_path".to_string(),
        json!(format!("/policies/{}.pdf", name.to_lowercase())),
    );
    IndexMatch::new(format!("{name} content"), metadata, score)
}
