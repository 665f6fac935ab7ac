use std::sync::LazyLock;

use regex::Regex;

use crate::models::AnalysisMode;

static EXTERNAL_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(call|delegatecall|staticcall)\s*[\({]").unwrap());
static DEFI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(swap|liquidity|getReserves|\bstake\b|rewardRate|lending|borrow)").unwrap()
});
static GOVERNANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(propose|castVote|\bquorum\b|votingPeriod|timelock)").unwrap());
static ORACLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(latestAnswer|latestRoundData|getPrice|priceFeed)").unwrap());
static FLASH_LOAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(flashloan|onflashloan|ierc3156)").unwrap());
static UPGRADE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(upgradeable|proxy|implementation\s*=|uups)").unwrap());

/// Coarse topic presence flags extracted from the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopicFlags {
    pub external_calls: bool,
    pub defi: bool,
    pub governance: bool,
    pub oracle: bool,
    pub flash_loan: bool,
    pub upgradeable: bool,
}

pub fn extract_topics(source: &str) -> TopicFlags {
    TopicFlags {
        external_calls: EXTERNAL_CALL_RE.is_match(source),
        defi: DEFI_RE.is_match(source),
        governance: GOVERNANCE_RE.is_match(source),
        oracle: ORACLE_RE.is_match(source),
        flash_loan: FLASH_LOAN_RE.is_match(source),
        upgradeable: UPGRADE_RE.is_match(source),
    }
}

/// Turn topic flags and the analysis mode into a prioritized query list.
/// Order matters: earlier queries get first claim on the result cap.
pub fn generate_queries(flags: &TopicFlags, mode: AnalysisMode) -> Vec<String> {
    let mut queries = Vec::new();

    if flags.external_calls {
        queries.push("reentrancy attack external call patterns".to_string());
    }
    if flags.flash_loan {
        queries.push("flash loan attack price manipulation".to_string());
    }
    if flags.oracle {
        queries.push("oracle manipulation stale price validation".to_string());
    }
    if flags.governance {
        queries.push("governance attack proposal timelock".to_string());
    }
    if flags.defi {
        queries.push("defi vault share inflation sandwich".to_string());
    }
    if flags.upgradeable {
        queries.push("proxy upgrade storage collision initializer".to_string());
    }

    match mode {
        AnalysisMode::GasOptimization => {
            queries.insert(0, "solidity gas optimization storage packing".to_string());
        }
        AnalysisMode::DefiFocused => {
            queries.insert(0, "defi tokenomics supply economic attack".to_string());
        }
        AnalysisMode::Comprehensive => {
            queries.push("smart contract audit checklist common vulnerabilities".to_string());
        }
        _ => {}
    }

    if queries.is_empty() {
        queries.push("smart contract security best practices".to_string());
    }
    queries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_extraction() {
        let src = r#"
            contract Pool {
                function swap(uint256 x) external {
                    (bool ok,) = token.call(abi.encodeWithSelector(0xa9059cbb, msg.sender, x));
                }
                function flashLoan(uint256 amount) external {}
            }
        "#;
        let flags = extract_topics(src);
        assert!(flags.external_calls);
        assert!(flags.defi);
        assert!(flags.flash_loan);
        assert!(!flags.governance);
        assert!(!flags.upgradeable);
    }

    #[test]
    fn test_queries_gated_by_flags() {
        let flags = TopicFlags { governance: true, ..Default::default() };
        let queries = generate_queries(&flags, AnalysisMode::Standard);
        assert_eq!(queries.len(), 1);
        assert!(queries[0].contains("governance"));
    }

    #[test]
    fn test_empty_flags_fall_back_to_generic_query() {
        let queries = generate_queries(&TopicFlags::default(), AnalysisMode::Standard);
        assert_eq!(queries, vec!["smart contract security best practices".to_string()]);
    }

    #[test]
    fn test_gas_mode_query_comes_first() {
        let flags = TopicFlags { external_calls: true, ..Default::default() };
        let queries = generate_queries(&flags, AnalysisMode::GasOptimization);
        assert!(queries[0].contains("gas optimization"));
    }
}
