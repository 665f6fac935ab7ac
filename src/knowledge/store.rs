use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AuditError;

/// Stored knowledge document classes, in descending re-rank priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocType {
    VulnerabilityPattern,
    AuditCaseStudy,
    BestPractice,
    ProtocolDoc,
}

impl DocType {
    /// Fixed bonus added to the raw similarity during re-ranking.
    pub fn priority_bonus(&self) -> f32 {
        match self {
            Self::VulnerabilityPattern => 0.15,
            Self::AuditCaseStudy => 0.10,
            Self::BestPractice => 0.05,
            Self::ProtocolDoc => 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeDoc {
    pub doc_type: DocType,
    pub title: String,
    pub content: String,
    /// Free-form tags; a tag matching the analysis mode earns a re-rank bonus.
    pub tags: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub doc: KnowledgeDoc,
    pub similarity: f32,
}

#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub doc_types: Option<Vec<DocType>>,
    pub limit: usize,
    pub similarity_threshold: f32,
}

/// Text-to-vector service. External collaborator; the core only consumes it.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AuditError>;
}

/// Vector similarity lookup over stored documents.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn similarity_search(
        &self,
        embedding: &[f32],
        options: &SearchOptions,
    ) -> Result<Vec<ScoredDocument>, AuditError>;
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// In-process store backed by a plain vector of (embedding, doc) pairs.
/// Used by tests and small deployments; production points the trait at a
/// real vector database.
#[derive(Default)]
pub struct InMemoryVectorStore {
    entries: Vec<(Vec<f32>, KnowledgeDoc)>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, embedding: Vec<f32>, doc: KnowledgeDoc) {
        self.entries.push((embedding, doc));
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn similarity_search(
        &self,
        embedding: &[f32],
        options: &SearchOptions,
    ) -> Result<Vec<ScoredDocument>, AuditError> {
        let mut scored: Vec<ScoredDocument> = self
            .entries
            .iter()
            .filter(|(_, doc)| {
                options
                    .doc_types
                    .as_ref()
                    .map(|types| types.contains(&doc.doc_type))
                    .unwrap_or(true)
            })
            .map(|(emb, doc)| ScoredDocument {
                doc: doc.clone(),
                similarity: cosine_similarity(embedding, emb),
            })
            .filter(|s| s.similarity >= options.similarity_threshold)
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(options.limit);
        Ok(scored)
    }
}

/// OpenAI-compatible /embeddings client.
pub struct HttpEmbeddingService {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpEmbeddingService {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl EmbeddingService for HttpEmbeddingService {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AuditError> {
        let body = serde_json::json!({ "model": self.model, "input": text });
        let resp = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AuditError::Knowledge(format!("Embedding request failed: {}", e)))?;

        let data: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| AuditError::Knowledge(format!("Embedding response parse: {}", e)))?;

        let embedding = data["data"][0]["embedding"]
            .as_array()
            .ok_or_else(|| AuditError::Knowledge("No embedding in response".into()))?
            .iter()
            .filter_map(|v| v.as_f64().map(|f| f as f32))
            .collect();
        Ok(embedding)
    }
}
