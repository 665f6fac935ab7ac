use std::sync::LazyLock;

use regex::Regex;

use crate::errors::AuditError;

/// Inclusive lower bound on meaningful contract source.
pub const MIN_SOURCE_BYTES: usize = 50;
/// 1 MiB upper bound; anything larger is rejected before any network call.
pub const MAX_SOURCE_BYTES: usize = 1024 * 1024;

static DECLARATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(contract|library|interface)\s+\w+").unwrap());

/// Validate audit input. Fatal and never retried; runs before agent
/// selection, knowledge retrieval, or any model call.
pub fn validate_source(source: &str) -> Result<(), AuditError> {
    if source.trim().is_empty() {
        return Err(AuditError::Validation("Source is empty".into()));
    }
    if source.len() < MIN_SOURCE_BYTES {
        return Err(AuditError::Validation(format!(
            "Source too short: {} bytes, minimum is {}",
            source.len(),
            MIN_SOURCE_BYTES
        )));
    }
    if source.len() > MAX_SOURCE_BYTES {
        return Err(AuditError::Validation(format!(
            "Source too large: {} bytes, maximum is {}",
            source.len(),
            MAX_SOURCE_BYTES
        )));
    }
    if !DECLARATION_RE.is_match(source) {
        return Err(AuditError::Validation(
            "No contract, library, or interface declaration found".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_rejected() {
        assert!(validate_source("").is_err());
        assert!(validate_source(&" ".repeat(2_000_000)).is_err());
    }

    #[test]
    fn test_short_source_rejected() {
        assert!(validate_source("short").is_err());
    }

    #[test]
    fn test_oversized_source_rejected() {
        let mut src = String::from("contract Big { ");
        src.push_str(&"uint256 x; ".repeat(120_000));
        src.push('}');
        assert!(src.len() > MAX_SOURCE_BYTES);
        assert!(validate_source(&src).is_err());
    }

    #[test]
    fn test_non_contract_text_rejected() {
        let src = "this is a paragraph of prose long enough to pass the length check easily";
        let err = validate_source(src).unwrap_err();
        assert!(matches!(err, AuditError::Validation(_)));
    }

    #[test]
    fn test_valid_contract_accepted() {
        let src = "contract Token { uint256 public totalSupply; function f() public {} }";
        assert!(validate_source(src).is_ok());
        let lib = "library SafeTransfer { function t(address a, uint256 v) internal {} }";
        assert!(validate_source(lib).is_ok());
    }
}
