use std::sync::LazyLock;

use regex::Regex;

use crate::models::{AgentKind, Finding, Severity};

use super::{location_at, ScanReport};

static MINT_FN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"function\s+_?mint\w*\s*\(").unwrap());
static BURN_FN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"function\s+_?burn\w*\s*\(").unwrap());
static SUPPLY_CAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(max_?supply|supply_?cap|\bcap\s*\()").unwrap());
static ONLY_OWNER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"onlyOwner").unwrap());
static AMM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(swap|addLiquidity|removeLiquidity|getReserves)").unwrap());
static STAKING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\bstake\b|unstake|rewardRate|claimReward)").unwrap());
static GOVERNANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(propose|castVote|\bquorum\b|votingPeriod)").unwrap());
static TIMELOCK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)timelock").unwrap());

const OWNER_CONCENTRATION_THRESHOLD: usize = 3;

fn finding(
    category: &str,
    severity: Severity,
    title: &str,
    description: &str,
    location: Option<String>,
    confidence: f64,
    remediation: &str,
) -> Finding {
    Finding {
        category: category.to_string(),
        severity,
        title: title.to_string(),
        description: description.to_string(),
        location,
        confidence,
        agent: AgentKind::Tokenomics,
        remediation: remediation.to_string(),
        gas_savings: None,
    }
}

/// Tokenomics rule set: supply mechanics, ownership concentration, and
/// AMM/staking/governance surface detection.
pub fn scan(source: &str) -> ScanReport {
    let mut report = ScanReport::default();

    let mint_count = MINT_FN_RE.find_iter(source).count();
    if mint_count > 0 && !SUPPLY_CAP_RE.is_match(source) {
        let loc = MINT_FN_RE.find(source).map(|m| m.start()).unwrap_or(0);
        report.findings.push(finding(
            "unlimited-mint",
            Severity::High,
            "Mint function with no supply cap",
            "A mint entry point exists and no supply cap was detected; holders have \
             no dilution bound.",
            location_at(source, loc),
            0.7,
            "Enforce a hard maximum supply or remove the mint path.",
        ));
    }

    if let Some(m) = BURN_FN_RE.find(source) {
        report.findings.push(finding(
            "burn-mechanism",
            Severity::Info,
            "Burn mechanism present",
            "The token supports supply reduction via burning.",
            location_at(source, m.start()),
            0.9,
            "Document who may burn and from which balances.",
        ));
    }

    let only_owner_count = ONLY_OWNER_RE.find_iter(source).count();
    if only_owner_count >= OWNER_CONCENTRATION_THRESHOLD {
        report.findings.push(finding(
            "ownership-concentration",
            Severity::Medium,
            "Broad owner privileges",
            &format!(
                "{} functions are gated on a single owner key; one compromised key \
                 controls supply, parameters, or funds.",
                only_owner_count
            ),
            None,
            0.65,
            "Move privileged operations behind a multisig or governance process.",
        ));
    }

    let has_governance = GOVERNANCE_RE.is_match(source);
    if has_governance && !TIMELOCK_RE.is_match(source) {
        let loc = GOVERNANCE_RE.find(source).map(|m| m.start()).unwrap_or(0);
        report.findings.push(finding(
            "governance",
            Severity::Medium,
            "Governance without a timelock",
            "Proposals appear to execute without a delay window, leaving no exit \
             period for dissenting holders.",
            location_at(source, loc),
            0.5,
            "Route passed proposals through a timelock before execution.",
        ));
    }

    report.estimates.insert("mint_function_count".into(), mint_count as f64);
    report
        .estimates
        .insert("only_owner_count".into(), only_owner_count as f64);
    report
        .estimates
        .insert("has_amm".into(), f64::from(AMM_RE.is_match(source)));
    report
        .estimates
        .insert("has_staking".into(), f64::from(STAKING_RE.is_match(source)));
    report.estimates.insert("has_governance".into(), f64::from(has_governance));

    report
}
