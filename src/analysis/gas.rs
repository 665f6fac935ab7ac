use std::sync::LazyLock;

use regex::Regex;

use crate::models::{AgentKind, Finding, Severity};

use super::gas_costs::{log_cost, SLOAD, SSTORE_SET};
use super::struct_packing::analyze_structs;
use super::{location_at, ScanReport};

static FOR_LENGTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"for\s*\([^;]*;\s*\w+\s*<\s*\w+\.length").unwrap());
static FOR_LOOP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"for\s*\(").unwrap());
static PUBLIC_FN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"function\s+(\w+)\s*\([^)]*\)\s+public").unwrap());
static EVENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"event\s+(\w+)\s*\(([^)]*)\)").unwrap());
static INCREMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+\+\+").unwrap());
static PRAGMA_08_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"pragma\s+solidity\s*[\^>=<~]*\s*0\.8").unwrap());

// Rough per-iteration figures used for the savings estimates.
const LENGTH_CACHE_SAVING_PER_LOOP: u64 = SLOAD;
const UNCHECKED_INCREMENT_SAVING: u64 = 60;

fn finding(
    category: &str,
    severity: Severity,
    title: &str,
    description: &str,
    location: Option<String>,
    confidence: f64,
    remediation: &str,
    gas_savings: u64,
) -> Finding {
    Finding {
        category: category.to_string(),
        severity,
        title: title.to_string(),
        description: description.to_string(),
        location,
        confidence,
        agent: AgentKind::GasOptimizer,
        remediation: remediation.to_string(),
        gas_savings: Some(gas_savings),
    }
}

/// Gas rule set: struct slot packing, loop patterns, visibility, event topics.
pub fn scan(source: &str) -> ScanReport {
    let mut report = ScanReport::default();

    let layouts = analyze_structs(source);
    let mut current_total = 0u32;
    let mut optimized_total = 0u32;
    for layout in &layouts {
        current_total += layout.current_slots;
        optimized_total += layout.optimized_slots;
        if layout.can_optimize() {
            let saved = u64::from(layout.current_slots - layout.optimized_slots) * SSTORE_SET;
            report.findings.push(finding(
                "storage-packing",
                Severity::Medium,
                &format!("Struct {} wastes storage slots", layout.name),
                &format!(
                    "Reordering fields packs {} into {} slots instead of {}.",
                    layout.name, layout.optimized_slots, layout.current_slots
                ),
                None,
                0.9,
                "Order struct fields from largest to smallest type.",
                saved,
            ));
        }
    }

    for m in FOR_LENGTH_RE.find_iter(source) {
        report.findings.push(finding(
            "loop-length-caching",
            Severity::Low,
            "Array length read every loop iteration",
            "The loop condition re-reads .length each iteration; for storage arrays \
             that is one SLOAD per pass.",
            location_at(source, m.start()),
            0.8,
            "Cache the length in a local variable before the loop.",
            LENGTH_CACHE_SAVING_PER_LOOP,
        ));
    }

    if PRAGMA_08_RE.is_match(source) && !source.contains("unchecked") {
        for m in INCREMENT_RE.find_iter(source).take(1) {
            report.findings.push(finding(
                "unchecked-arithmetic",
                Severity::Info,
                "Loop counters use checked increments",
                "Under solidity >=0.8 each increment carries an overflow check a bounded \
                 loop counter cannot trip.",
                location_at(source, m.start()),
                0.6,
                "Wrap bounded counter increments in an unchecked block.",
                UNCHECKED_INCREMENT_SAVING,
            ));
        }
    }

    let mut public_count = 0u32;
    for cap in PUBLIC_FN_RE.captures_iter(source) {
        public_count += 1;
        let name = &cap[1];
        // A public function only ever referenced at its declaration has no
        // internal callers and can be external (cheaper calldata handling).
        let references = source.matches(&format!("{}(", name)).count();
        if references <= 1 {
            report.findings.push(finding(
                "visibility",
                Severity::Info,
                &format!("Function {} can be external", name),
                "No internal call sites were found for this public function.",
                location_at(source, cap.get(0).map(|m| m.start()).unwrap_or(0)),
                0.5,
                "Declare functions without internal callers as external.",
                0,
            ));
        }
    }

    let mut event_log_gas = 0u64;
    for cap in EVENT_RE.captures_iter(source) {
        let params = &cap[2];
        let topics = params.matches("indexed").count() as u64;
        // +1 topic for the event signature hash
        event_log_gas += log_cost(topics + 1);
        if topics == 0 && !params.trim().is_empty() {
            report.findings.push(finding(
                "event-indexing",
                Severity::Info,
                &format!("Event {} has no indexed parameters", &cap[1]),
                "Unindexed events cannot be filtered by topic off-chain.",
                location_at(source, cap.get(0).map(|m| m.start()).unwrap_or(0)),
                0.6,
                "Index the parameters consumers filter on (up to three).",
                0,
            ));
        }
    }

    let total_savings: u64 = report.findings.iter().filter_map(|f| f.gas_savings).sum();

    report.estimates.insert("struct_count".into(), layouts.len() as f64);
    report.estimates.insert("storage_slots_current".into(), f64::from(current_total));
    report
        .estimates
        .insert("storage_slots_optimized".into(), f64::from(optimized_total));
    report
        .estimates
        .insert("loop_count".into(), FOR_LOOP_RE.find_iter(source).count() as f64);
    report.estimates.insert("public_function_count".into(), f64::from(public_count));
    report.estimates.insert("event_log_gas".into(), event_log_gas as f64);
    report.estimates.insert("estimated_savings".into(), total_savings as f64);

    report
}
