use std::sync::LazyLock;

use regex::Regex;

use crate::models::{AgentKind, Finding, Severity};

use super::{location_at, ScanReport};

static CALL_VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.call\{\s*value\s*:").unwrap());
static STATE_WRITE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-=|\+=|\[\s*msg\.sender\s*\]\s*=|=\s*0\s*;)").unwrap());
static TX_ORIGIN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"tx\.origin").unwrap());
static DELEGATECALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.delegatecall\s*\(").unwrap());
static SELFDESTRUCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"selfdestruct\s*\(").unwrap());
static PRAGMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"pragma\s+solidity\s*[\^>=<~]*\s*0\.(\d+)").unwrap());
static UNCHECKED_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"unchecked\s*\{").unwrap());
static FLASH_LOAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(flashloan|onflashloan|ierc3156)").unwrap());
static DEPRECATED_ORACLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.latestAnswer\s*\(").unwrap());
static TIMESTAMP_COMPARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"require\s*\([^)]*block\.timestamp").unwrap());
static SWAP_FN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"function\s+\w*[sS]wap\w*\s*\(([^)]*)\)").unwrap());
static FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"function\s+\w+").unwrap());
static EXTERNAL_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(call|delegatecall|staticcall|transfer|send)\s*[\({]").unwrap());

// Window scanned after an external call for a subsequent state write. Rough
// proxy for "rest of the function body".
const REENTRANCY_WINDOW: usize = 400;

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
        agent: AgentKind::Security,
        remediation: remediation.to_string(),
        gas_savings: None,
    }
}

/// Security rule set: reentrancy, access control, integer overflow,
/// flash-loan surface, oracle misuse, MEV exposure.
pub fn scan(source: &str) -> ScanReport {
    let mut report = ScanReport::default();

    for m in CALL_VALUE_RE.find_iter(source) {
        let window_end = (m.end() + REENTRANCY_WINDOW).min(source.len());
        if STATE_WRITE_RE.is_match(&source[m.end()..window_end]) {
            report.findings.push(finding(
                "reentrancy",
                Severity::High,
                "State written after external value call",
                "An external call with value transfer is followed by a state update. \
                 The callee can re-enter before the update lands.",
                location_at(source, m.start()),
                0.75,
                "Apply the checks-effects-interactions pattern or a reentrancy guard.",
            ));
        }
    }

    for m in TX_ORIGIN_RE.find_iter(source) {
        report.findings.push(finding(
            "access-control",
            Severity::High,
            "tx.origin used for authorization",
            "tx.origin authentication is phishable: any contract the user calls \
             can relay into this one with the user's origin.",
            location_at(source, m.start()),
            0.9,
            "Use msg.sender for authorization checks.",
        ));
    }

    if let Some(m) = SELFDESTRUCT_RE.find(source) {
        report.findings.push(finding(
            "access-control",
            Severity::High,
            "selfdestruct present",
            "The contract can be destroyed, removing code and forwarding its balance.",
            location_at(source, m.start()),
            0.8,
            "Remove selfdestruct or gate it behind strict, time-locked governance.",
        ));
    }

    if let Some(m) = DELEGATECALL_RE.find(source) {
        report.findings.push(finding(
            "access-control",
            Severity::Medium,
            "delegatecall in use",
            "delegatecall executes foreign code against this contract's storage; \
             an attacker-influenced target is full compromise.",
            location_at(source, m.start()),
            0.6,
            "Restrict delegatecall targets to audited, immutable implementations.",
        ));
    }

    if let Some(cap) = PRAGMA_RE.captures(source) {
        let minor: u32 = cap[1].parse().unwrap_or(8);
        if minor < 8 && !source.contains("SafeMath") {
            report.findings.push(finding(
                "integer-overflow",
                Severity::Medium,
                "Pre-0.8 arithmetic without SafeMath",
                "Solidity before 0.8 wraps on overflow; no SafeMath usage was detected.",
                location_at(source, cap.get(0).map(|m| m.start()).unwrap_or(0)),
                0.7,
                "Upgrade to solidity >=0.8 or use SafeMath for all arithmetic.",
            ));
        }
    }

    for m in UNCHECKED_RE.find_iter(source) {
        report.findings.push(finding(
            "integer-overflow",
            Severity::Low,
            "Unchecked arithmetic block",
            "Arithmetic inside unchecked {} wraps silently.",
            location_at(source, m.start()),
            0.6,
            "Verify every unchecked block has a proven bound.",
        ));
    }

    if let Some(m) = FLASH_LOAN_RE.find(source) {
        report.findings.push(finding(
            "flash-loan",
            Severity::Medium,
            "Flash-loan surface detected",
            "Flash-loan entry points let an attacker wield arbitrary capital for one \
             transaction; every price or share computation reachable in that window matters.",
            location_at(source, m.start()),
            0.5,
            "Snapshot balances and prices before the loan and validate after repayment.",
        ));
    }

    if let Some(m) = DEPRECATED_ORACLE_RE.find(source) {
        report.findings.push(finding(
            "oracle",
            Severity::Medium,
            "Deprecated latestAnswer oracle read",
            "latestAnswer returns no staleness data; a stuck feed reads as a live price.",
            location_at(source, m.start()),
            0.8,
            "Use latestRoundData and validate round completeness and timestamp.",
        ));
    }

    if let Some(m) = TIMESTAMP_COMPARE_RE.find(source) {
        report.findings.push(finding(
            "mev",
            Severity::Low,
            "block.timestamp in a require condition",
            "Validators can nudge block.timestamp; tight timestamp conditions are orderable.",
            location_at(source, m.start()),
            0.5,
            "Allow tolerance in timestamp comparisons; never use them for randomness.",
        ));
    }

    for cap in SWAP_FN_RE.captures_iter(source) {
        let params = &cap[1];
        if !params.contains("amountOutMin") && !params.contains("minAmountOut") {
            report.findings.push(finding(
                "mev",
                Severity::Low,
                "Swap function without a minimum-output parameter",
                "A swap with no caller-supplied output floor is sandwichable.",
                location_at(source, cap.get(0).map(|m| m.start()).unwrap_or(0)),
                0.55,
                "Accept and enforce a minimum acceptable output amount.",
            ));
        }
    }

    report.estimates.insert(
        "external_call_count".into(),
        EXTERNAL_CALL_RE.find_iter(source).count() as f64,
    );
    report
        .estimates
        .insert("function_count".into(), FUNCTION_RE.find_iter(source).count() as f64);
    report.estimates.insert(
        "state_write_count".into(),
        STATE_WRITE_RE.find_iter(source).count() as f64,
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const REENTRANT_VAULT: &str = r#"
        pragma solidity ^0.8.19;
        contract Vault {
            mapping(address => uint256) public balances;
            function withdraw(uint256 amount) public {
                (bool ok,) = msg.sender.call{value: amount}("");
                require(ok);
                balances[msg.sender] -= amount;
            }
        }
    "#;

    #[test]
    fn test_reentrancy_detected() {
        let report = scan(REENTRANT_VAULT);
        let categories: Vec<_> = report.findings.iter().map(|f| f.category.as_str()).collect();
        assert!(categories.contains(&"reentrancy"));
    }

    #[test]
    fn test_checks_effects_interactions_not_flagged() {
        let src = r#"
            contract Vault {
                mapping(address => uint256) public balances;
                function withdraw(uint256 amount) public {
                    balances[msg.sender] -= amount;
                    (bool ok,) = msg.sender.call{value: amount}("");
                    require(ok);
                }
            }
        "#;
        let report = scan(src);
        assert!(!report.findings.iter().any(|f| f.category == "reentrancy"));
    }

    #[test]
    fn test_tx_origin_flagged_with_location() {
        let src = "contract A { function f() public { require(tx.origin == owner); } }";
        let report = scan(src);
        let f = report.findings.iter().find(|f| f.category == "access-control").unwrap();
        assert_eq!(f.severity, Severity::High);
        assert!(f.location.as_deref().unwrap().starts_with("line "));
    }

    #[test]
    fn test_old_pragma_flagged() {
        let src = "pragma solidity ^0.6.12;\ncontract A { uint256 x; }";
        let report = scan(src);
        assert!(report.findings.iter().any(|f| f.category == "integer-overflow"));
    }

    #[test]
    fn test_old_pragma_with_safemath_not_flagged() {
        let src = "pragma solidity ^0.6.12;\nusing SafeMath for uint256;\ncontract A {}";
        let report = scan(src);
        assert!(!report
            .findings
            .iter()
            .any(|f| f.category == "integer-overflow" && f.severity == Severity::Medium));
    }

    #[test]
    fn test_estimates_populated() {
        let report = scan(REENTRANT_VAULT);
        assert_eq!(report.estimates["function_count"], 1.0);
        assert!(report.estimates["external_call_count"] >= 1.0);
    }

    #[test]
    fn test_confidence_in_unit_range() {
        let report = scan(REENTRANT_VAULT);
        for f in &report.findings {
            assert!((0.0..=1.0).contains(&f.confidence));
        }
    }
}
