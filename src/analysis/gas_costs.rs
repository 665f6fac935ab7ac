//! Fixed EVM gas cost table used for rough static estimates only. These are
//! the post-Berlin base costs; nothing here is validated against a live EVM.

pub const SSTORE_SET: u64 = 20_000;
pub const SSTORE_RESET: u64 = 5_000;
pub const SSTORE_CLEAR_REFUND: u64 = 4_800;
pub const SLOAD: u64 = 2_100;
pub const CALL: u64 = 2_600;
pub const DELEGATECALL: u64 = 2_600;
pub const STATICCALL: u64 = 2_600;
pub const CREATE: u64 = 32_000;
pub const LOG_BASE: u64 = 375;
pub const LOG_TOPIC: u64 = 375;

/// Cost of a LOG opcode with the given topic count (0..=4).
pub fn log_cost(topics: u64) -> u64 {
    LOG_BASE + LOG_TOPIC * topics.min(4)
}

/// Every op named in the table, in display order for the CLI's cost breakdown.
pub const OPS: &[&str] = &[
    "SSTORE_SET",
    "SSTORE_RESET",
    "SSTORE_CLEAR_REFUND",
    "SLOAD",
    "CALL",
    "DELEGATECALL",
    "STATICCALL",
    "CREATE",
    "LOG0",
    "LOG1",
    "LOG2",
    "LOG3",
    "LOG4",
];

/// Named lookup for estimate maps and the CLI's cost breakdown.
pub fn lookup(op: &str) -> Option<u64> {
    let cost = match op {
        "SSTORE_SET" => SSTORE_SET,
        "SSTORE_RESET" => SSTORE_RESET,
        "SSTORE_CLEAR_REFUND" => SSTORE_CLEAR_REFUND,
        "SLOAD" => SLOAD,
        "CALL" => CALL,
        "DELEGATECALL" => DELEGATECALL,
        "STATICCALL" => STATICCALL,
        "CREATE" => CREATE,
        "LOG0" => log_cost(0),
        "LOG1" => log_cost(1),
        "LOG2" => log_cost(2),
        "LOG3" => log_cost(3),
        "LOG4" => log_cost(4),
        _ => return None,
    };
    Some(cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_costs() {
        assert_eq!(log_cost(0), 375);
        assert_eq!(log_cost(3), 1500);
        assert_eq!(log_cost(9), log_cost(4));
    }

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("SSTORE_SET"), Some(20_000));
        assert_eq!(lookup("LOG2"), Some(1125));
        assert_eq!(lookup("BALANCE"), None);
    }

    #[test]
    fn test_every_listed_op_resolves() {
        for op in OPS {
            assert!(lookup(op).is_some(), "{op} missing from table");
        }
    }
}
