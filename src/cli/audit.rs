use std::sync::Arc;

use tracing::{info, warn};

use crate::db::Database;
use crate::errors::AuditError;
use crate::knowledge::{
    EmbeddingService, HttpEmbeddingService, InMemoryVectorStore, KnowledgeDoc, KnowledgeRetriever,
};
use crate::llm::{create_provider_from_env, ModelClient};
use crate::models::AuditOptions;
use crate::pipeline::Orchestrator;
use crate::reporting::{format_report_markdown, render_report};

use super::commands::{parse_agent_list, parse_mode, parse_strategy, AuditArgs};

pub async fn handle_audit(args: AuditArgs) -> Result<(), AuditError> {
    let source = std::fs::read_to_string(&args.file)?;

    let options = AuditOptions {
        audit_id: args.audit_id.clone(),
        user_id: args.user.clone(),
        mode: parse_mode(&args.mode)?,
        agents: args.agents.as_deref().map(parse_agent_list).transpose()?,
        strategy: args.strategy.as_deref().map(parse_strategy).transpose()?,
        skip_knowledge: args.no_knowledge,
    };

    let provider = create_provider_from_env()?;
    let client = Arc::new(ModelClient::new(provider));

    let mut orchestrator = Orchestrator::new(client);
    if !args.no_db {
        orchestrator = orchestrator.with_database(Database::new(&args.db)?);
    }
    if let Some(path) = &args.knowledge {
        match build_retriever(path).await {
            Ok(retriever) => orchestrator = orchestrator.with_retriever(Arc::new(retriever)),
            Err(e) => warn!(error = %e, "Knowledge store unavailable, continuing without it"),
        }
    }

    let report = orchestrator.analyze_contract(&source, &options).await?;

    if let Some(path) = &args.output {
        std::fs::write(path, format_report_markdown(&report))?;
        info!(path, "Markdown report written");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", render_report(&report));
    }
    Ok(())
}

/// Build a retriever over documents embedded at startup. Requires an
/// OpenAI-compatible embeddings endpoint configured via EMBEDDINGS_BASE_URL
/// and EMBEDDINGS_API_KEY.
async fn build_retriever(docs_path: &str) -> Result<KnowledgeRetriever, AuditError> {
    let base_url = std::env::var("EMBEDDINGS_BASE_URL")
        .map_err(|_| AuditError::Config("EMBEDDINGS_BASE_URL is not set".into()))?;
    let api_key = std::env::var("EMBEDDINGS_API_KEY")
        .map_err(|_| AuditError::Config("EMBEDDINGS_API_KEY is not set".into()))?;
    let model = std::env::var("EMBEDDINGS_MODEL")
        .unwrap_or_else(|_| "text-embedding-3-small".to_string());

    let embeddings = Arc::new(HttpEmbeddingService::new(&base_url, &api_key, &model));

    let raw = std::fs::read_to_string(docs_path)?;
    let docs: Vec<KnowledgeDoc> = serde_json::from_str(&raw)?;

    let mut store = InMemoryVectorStore::new();
    for doc in docs {
        let embedding = embeddings.embed(&format!("{}\n{}", doc.title, doc.content)).await?;
        store.insert(embedding, doc);
    }
    info!(path = docs_path, "Knowledge documents embedded");

    Ok(KnowledgeRetriever::new(embeddings, Arc::new(store)))
}
