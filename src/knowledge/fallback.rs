use super::retriever::{KnowledgeBundle, KnowledgeSnippet};
use super::store::DocType;

/// Built-in core knowledge used whenever retrieval fails. Deterministic and
/// deliberately small; callers treat the result as degraded but valid.
pub fn fallback_bundle(queries: Vec<String>) -> KnowledgeBundle {
    let snippets = vec![
        KnowledgeSnippet {
            doc_type: DocType::VulnerabilityPattern,
            title: "Reentrancy".to_string(),
            content: "External calls hand control to the callee, which may re-enter \
                      before state updates land. Follow checks-effects-interactions; \
                      use reentrancy guards on value-moving entry points."
                .to_string(),
            relevance: 1.0,
        },
        KnowledgeSnippet {
            doc_type: DocType::VulnerabilityPattern,
            title: "Access control".to_string(),
            content: "Privileged functions need explicit caller checks against \
                      msg.sender, never tx.origin. Missing modifiers on mint, \
                      withdraw, or upgrade paths are critical."
                .to_string(),
            relevance: 1.0,
        },
        KnowledgeSnippet {
            doc_type: DocType::VulnerabilityPattern,
            title: "Flash loans".to_string(),
            content: "Any state readable and writable within one transaction can be \
                      distorted by borrowed capital. Spot prices and instantaneous \
                      balances are untrustworthy inside a single block."
                .to_string(),
            relevance: 1.0,
        },
        KnowledgeSnippet {
            doc_type: DocType::BestPractice,
            title: "Governance patterns".to_string(),
            content: "Proposal execution should pass through a timelock; quorum and \
                      voting-period parameters should not be owner-mutable without \
                      delay."
                .to_string(),
            relevance: 1.0,
        },
    ];

    KnowledgeBundle {
        snippets,
        queries,
        fallback: true,
    }
}
