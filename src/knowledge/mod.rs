pub mod fallback;
pub mod retriever;
pub mod store;
pub mod topics;

pub use retriever::{KnowledgeBundle, KnowledgeRetriever, KnowledgeSnippet};
pub use store::{
    cosine_similarity, DocType, EmbeddingService, HttpEmbeddingService, InMemoryVectorStore,
    KnowledgeDoc, ScoredDocument, SearchOptions, VectorStore,
};
pub use topics::{extract_topics, generate_queries, TopicFlags};
