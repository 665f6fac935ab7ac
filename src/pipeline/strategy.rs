use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::models::{AgentKind, AnalysisMode, ExecutionStrategy};

static FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"function\s+\w+").unwrap());
static MODIFIER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"modifier\s+\w+").unwrap());
static EVENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"event\s+\w+").unwrap());
static STRUCT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"struct\s+\w+").unwrap());
static INHERITANCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bis\s+\w+").unwrap());
static EXTERNAL_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(call|delegatecall|staticcall)\s*[\({]").unwrap());
static LOOP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(for|while)\s*\(").unwrap());

/// Source below this size is "small" for scheduling purposes.
pub const SMALL_SOURCE_CHARS: usize = 10_000;
const LOW_COMPLEXITY: u32 = 40;
const HIGH_COMPLEXITY: u32 = 120;

/// Weighted structural complexity of the source. External calls and loops
/// weigh heaviest: they drive both analysis depth and prompt size.
pub fn complexity_score(source: &str) -> u32 {
    let count = |re: &Regex| re.find_iter(source).count() as u32;
    count(&FUNCTION_RE) * 2
        + count(&MODIFIER_RE)
        + count(&EVENT_RE)
        + count(&STRUCT_RE) * 2
        + count(&INHERITANCE_RE) * 3
        + count(&EXTERNAL_CALL_RE) * 4
        + count(&LOOP_RE) * 3
}

/// Choose a scheduling strategy from source shape and agent count. Explicit
/// request overrides are handled by the caller before this runs.
pub fn select_strategy(source: &str, mode: AnalysisMode, agents: &[AgentKind]) -> ExecutionStrategy {
    let complexity = complexity_score(source);
    let strategy = if source.len() < SMALL_SOURCE_CHARS
        && complexity < LOW_COMPLEXITY
        && agents.len() >= 3
    {
        ExecutionStrategy::Parallel
    } else if complexity >= HIGH_COMPLEXITY || mode == AnalysisMode::Comprehensive {
        ExecutionStrategy::Sequential
    } else {
        ExecutionStrategy::Adaptive
    };

    debug!(complexity, source_chars = source.len(), agents = agents.len(), strategy = %strategy, "Strategy selected");
    strategy
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL_SIMPLE: &str = "contract A { uint256 x; function f() public { x = 1; } }";

    #[test]
    fn test_small_low_complexity_three_agents_is_parallel() {
        let agents = AnalysisMode::Comprehensive.default_agents();
        assert!(SMALL_SIMPLE.len() < SMALL_SOURCE_CHARS);
        assert_eq!(
            select_strategy(SMALL_SIMPLE, AnalysisMode::Comprehensive, &agents),
            ExecutionStrategy::Parallel
        );
    }

    #[test]
    fn test_comprehensive_with_few_agents_is_sequential() {
        assert_eq!(
            select_strategy(SMALL_SIMPLE, AnalysisMode::Comprehensive, &[AgentKind::Security]),
            ExecutionStrategy::Sequential
        );
    }

    #[test]
    fn test_high_complexity_is_sequential() {
        let src = "contract C is A, B { }".to_string()
            + &"function f() public { for (uint i; i < 10; i++) { a.call(\"\"); } }".repeat(20);
        assert!(complexity_score(&src) >= HIGH_COMPLEXITY);
        assert_eq!(
            select_strategy(&src, AnalysisMode::Standard, &[AgentKind::Security]),
            ExecutionStrategy::Sequential
        );
    }

    #[test]
    fn test_default_case_is_adaptive() {
        let agents = AnalysisMode::Standard.default_agents();
        assert_eq!(
            select_strategy(SMALL_SIMPLE, AnalysisMode::Standard, &agents),
            ExecutionStrategy::Adaptive
        );
    }
}
