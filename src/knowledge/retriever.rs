use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AuditError;
use crate::models::AnalysisMode;

use super::fallback::fallback_bundle;
use super::store::{DocType, EmbeddingService, ScoredDocument, SearchOptions, VectorStore};
use super::topics::{extract_topics, generate_queries};

/// Hard cap on snippets returned per bundle.
const BUNDLE_CAP: usize = 20;
const TOP_K_PER_QUERY: usize = 5;
const SIMILARITY_THRESHOLD: f32 = 0.35;
const MODE_MATCH_BONUS: f32 = 0.10;
const KEYWORD_OVERLAP_BONUS_CAP: f32 = 0.10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSnippet {
    pub doc_type: DocType,
    pub title: String,
    pub content: String,
    pub relevance: f32,
}

/// Best-effort contextual knowledge for one audit. `fallback` marks the
/// built-in degraded bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeBundle {
    pub snippets: Vec<KnowledgeSnippet>,
    pub queries: Vec<String>,
    pub fallback: bool,
}

impl KnowledgeBundle {
    pub fn empty() -> Self {
        Self { snippets: Vec::new(), queries: Vec::new(), fallback: false }
    }
}

pub struct KnowledgeRetriever {
    embeddings: Arc<dyn EmbeddingService>,
    store: Arc<dyn VectorStore>,
}

impl KnowledgeRetriever {
    pub fn new(embeddings: Arc<dyn EmbeddingService>, store: Arc<dyn VectorStore>) -> Self {
        Self { embeddings, store }
    }

    /// Retrieve a contextual knowledge bundle for the source. Never fails:
    /// any retrieval error degrades to the built-in fallback bundle.
    pub async fn contextual_knowledge(&self, source: &str, mode: AnalysisMode) -> KnowledgeBundle {
        let flags = extract_topics(source);
        let queries = generate_queries(&flags, mode);

        match self.retrieve(&queries, mode).await {
            Ok(snippets) => {
                debug!(queries = queries.len(), snippets = snippets.len(), "Knowledge retrieved");
                KnowledgeBundle { snippets, queries, fallback: false }
            }
            Err(e) => {
                warn!(error = %e, "Knowledge retrieval failed, using fallback bundle");
                fallback_bundle(queries)
            }
        }
    }

    async fn retrieve(
        &self,
        queries: &[String],
        mode: AnalysisMode,
    ) -> Result<Vec<KnowledgeSnippet>, AuditError> {
        let options = SearchOptions {
            doc_types: None,
            limit: TOP_K_PER_QUERY,
            similarity_threshold: SIMILARITY_THRESHOLD,
        };

        // Dedup across queries by (doc_type, title), keeping the best-scoring hit.
        let mut merged: HashMap<(DocType, String), KnowledgeSnippet> = HashMap::new();
        for query in queries {
            let embedding = self.embeddings.embed(query).await?;
            let hits = self.store.similarity_search(&embedding, &options).await?;
            for hit in hits {
                let relevance = rerank_score(&hit, query, mode);
                let key = (hit.doc.doc_type, hit.doc.title.clone());
                let entry = merged.entry(key).or_insert_with(|| KnowledgeSnippet {
                    doc_type: hit.doc.doc_type,
                    title: hit.doc.title.clone(),
                    content: hit.doc.content.clone(),
                    relevance,
                });
                if relevance > entry.relevance {
                    entry.relevance = relevance;
                }
            }
        }

        let mut snippets: Vec<KnowledgeSnippet> = merged.into_values().collect();
        snippets.sort_by(|a, b| {
            b.relevance
                .partial_cmp(&a.relevance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        snippets.truncate(BUNDLE_CAP);
        Ok(snippets)
    }
}

/// Weighted relevance: raw similarity, plus a doc-type priority bonus, plus
/// a bonus when the doc is tagged for this analysis mode, plus keyword
/// overlap between query and content.
fn rerank_score(hit: &ScoredDocument, query: &str, mode: AnalysisMode) -> f32 {
    let mut score = hit.similarity + hit.doc.doc_type.priority_bonus();

    if hit.doc.tags.iter().any(|t| t == mode.as_str()) {
        score += MODE_MATCH_BONUS;
    }

    let content_lower = hit.doc.content.to_lowercase();
    let overlap = query
        .split_whitespace()
        .filter(|w| w.len() > 3 && content_lower.contains(&w.to_lowercase()))
        .count();
    score += (overlap as f32 * 0.02).min(KEYWORD_OVERLAP_BONUS_CAP);

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::store::{cosine_similarity, InMemoryVectorStore, KnowledgeDoc};
    use async_trait::async_trait;

    /// Deterministic bag-of-letters embedder for tests.
    struct StubEmbedder;

    #[async_trait]
    impl EmbeddingService for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, AuditError> {
            let mut v = vec![0.0f32; 26];
            for b in text.bytes() {
                if b.is_ascii_alphabetic() {
                    v[((b.to_ascii_lowercase() - b'a') % 26) as usize] += 1.0;
                }
            }
            Ok(v)
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl EmbeddingService for FailingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, AuditError> {
            Err(AuditError::Knowledge("embedding service down".into()))
        }
    }

    fn seeded_store() -> InMemoryVectorStore {
        let mut store = InMemoryVectorStore::new();
        let docs = [
            (DocType::VulnerabilityPattern, "Reentrancy deep dive", "reentrancy attack external call patterns guard"),
            (DocType::BestPractice, "Gas playbook", "gas optimization storage packing calldata"),
            (DocType::ProtocolDoc, "AMM math", "constant product swap reserves liquidity"),
        ];
        for (doc_type, title, content) in docs {
            let mut v = vec![0.0f32; 26];
            for b in content.bytes() {
                if b.is_ascii_alphabetic() {
                    v[((b.to_ascii_lowercase() - b'a') % 26) as usize] += 1.0;
                }
            }
            store.insert(
                v,
                KnowledgeDoc {
                    doc_type,
                    title: title.into(),
                    content: content.into(),
                    tags: vec!["comprehensive".into()],
                },
            );
        }
        store
    }

    #[tokio::test]
    async fn test_retrieval_returns_ranked_snippets() {
        let retriever =
            KnowledgeRetriever::new(Arc::new(StubEmbedder), Arc::new(seeded_store()));
        let src = "contract A { function f() public { (bool ok,) = a.call(\"\"); } }";
        let bundle = retriever.contextual_knowledge(src, AnalysisMode::Comprehensive).await;
        assert!(!bundle.fallback);
        assert!(!bundle.snippets.is_empty());
        assert!(bundle.snippets.len() <= BUNDLE_CAP);
        for pair in bundle.snippets.windows(2) {
            assert!(pair[0].relevance >= pair[1].relevance);
        }
    }

    #[tokio::test]
    async fn test_failure_degrades_to_fallback() {
        let retriever =
            KnowledgeRetriever::new(Arc::new(FailingEmbedder), Arc::new(seeded_store()));
        let bundle = retriever
            .contextual_knowledge("contract A {}", AnalysisMode::Standard)
            .await;
        assert!(bundle.fallback);
        assert!(!bundle.snippets.is_empty());
        assert!(bundle.snippets.iter().any(|s| s.title == "Reentrancy"));
    }

    #[test]
    fn test_rerank_prefers_vulnerability_patterns() {
        let base = |doc_type| ScoredDocument {
            doc: KnowledgeDoc {
                doc_type,
                title: "t".into(),
                content: "irrelevant".into(),
                tags: Vec::new(),
            },
            similarity: 0.5,
        };
        let vuln = rerank_score(&base(DocType::VulnerabilityPattern), "q", AnalysisMode::Standard);
        let proto = rerank_score(&base(DocType::ProtocolDoc), "q", AnalysisMode::Standard);
        assert!(vuln > proto);
    }

    #[test]
    fn test_stub_embedder_is_directional() {
        // sanity: identical text embeds identically
        let a = futures::executor::block_on(StubEmbedder.embed("reentrancy")).unwrap();
        let b = futures::executor::block_on(StubEmbedder.embed("reentrancy")).unwrap();
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
    }
}
