use std::sync::LazyLock;

use regex::Regex;

static STRUCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"struct\s+(\w+)\s*\{([^}]*)\}").unwrap());

/// Storage layout of one declared struct.
#[derive(Debug, Clone, PartialEq)]
pub struct StructLayout {
    pub name: String,
    pub field_sizes: Vec<u32>,
    /// Slots consumed by the declared field order: ceil(sum(sizes) / 32).
    pub current_slots: u32,
    /// Slots after greedy descending-size packing.
    pub optimized_slots: u32,
}

impl StructLayout {
    pub fn can_optimize(&self) -> bool {
        self.optimized_slots < self.current_slots
    }
}

/// Byte size assigned to a Solidity type name. Unknown types (structs,
/// mappings, arrays) are treated as a full 32-byte slot.
pub fn field_size(type_name: &str) -> u32 {
    match type_name {
        "address" | "uint256" | "int256" | "uint" | "int" => 32,
        "uint128" | "int128" => 16,
        "uint64" | "int64" => 8,
        "uint32" | "int32" => 4,
        "uint16" | "int16" => 2,
        "uint8" | "int8" | "bool" => 1,
        _ => 32,
    }
}

/// Slot count for the declared order: ceil(sum(sizes) / 32).
pub fn current_slot_count(sizes: &[u32]) -> u32 {
    let total: u32 = sizes.iter().sum();
    total.div_ceil(32)
}

/// Greedy packer: sort fields descending by size, then fill 32-byte slots,
/// opening a new slot whenever the running total would exceed 32.
pub fn optimized_slot_count(sizes: &[u32]) -> u32 {
    if sizes.is_empty() {
        return 0;
    }
    let mut sorted: Vec<u32> = sizes.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut slots = 1u32;
    let mut fill = 0u32;
    for size in sorted {
        if fill + size > 32 {
            slots += 1;
            fill = size;
        } else {
            fill += size;
        }
    }
    slots
}

/// Extract every struct declaration and compute both layouts.
pub fn analyze_structs(source: &str) -> Vec<StructLayout> {
    STRUCT_RE
        .captures_iter(source)
        .map(|cap| {
            let name = cap[1].to_string();
            let body = &cap[2];
            let field_sizes: Vec<u32> = body
                .lines()
                .filter_map(|line| {
                    let line = line.trim();
                    if line.is_empty() || line.starts_with("//") {
                        return None;
                    }
                    line.split_whitespace().next().map(field_size)
                })
                .collect();

            StructLayout {
                current_slots: current_slot_count(&field_sizes),
                optimized_slots: optimized_slot_count(&field_sizes),
                name,
                field_sizes,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_sizes() {
        assert_eq!(field_size("address"), 32);
        assert_eq!(field_size("uint256"), 32);
        assert_eq!(field_size("uint128"), 16);
        assert_eq!(field_size("uint64"), 8);
        assert_eq!(field_size("uint32"), 4);
        assert_eq!(field_size("uint16"), 2);
        assert_eq!(field_size("uint8"), 1);
        assert_eq!(field_size("bool"), 1);
        assert_eq!(field_size("MyStruct"), 32);
    }

    #[test]
    fn test_worked_example() {
        // [32, 1, 1, 32, 8]: sum = 74, current = ceil(74/32) = 3.
        // Sorted desc [32, 32, 8, 1, 1] packs as 32 | 32 | 8+1+1 = 3 slots.
        let sizes = [32, 1, 1, 32, 8];
        assert_eq!(current_slot_count(&sizes), 3);
        assert_eq!(optimized_slot_count(&sizes), 3);
    }

    #[test]
    fn test_packing_meets_ceil_bound() {
        // With power-of-two field sizes the greedy packer always reaches the
        // ceil(sum/32) lower bound.
        let cases: &[&[u32]] = &[
            &[16, 32, 16],
            &[32, 16, 16, 16],
            &[8, 8, 8, 8, 32],
            &[1, 1, 2, 4, 8, 16, 32],
        ];
        for sizes in cases {
            assert_eq!(optimized_slot_count(sizes), current_slot_count(sizes));
        }
    }

    #[test]
    fn test_analyze_structs_extracts_layouts() {
        let src = r#"
            contract C {
                struct Position {
                    uint128 amount;
                    address owner;
                    uint128 debt;
                }
            }
        "#;
        let layouts = analyze_structs(src);
        assert_eq!(layouts.len(), 1);
        assert_eq!(layouts[0].name, "Position");
        assert_eq!(layouts[0].field_sizes, vec![16, 32, 16]);
        assert_eq!(layouts[0].current_slots, 2);
        assert_eq!(layouts[0].optimized_slots, 2);
        assert!(!layouts[0].can_optimize());
    }

    #[test]
    fn test_analyze_structs_mixed_widths() {
        let src = r#"
            struct Packed {
                uint64 a;
                uint256 b;
                uint64 c;
                uint64 d;
                uint64 e;
                uint64 f;
            }
        "#;
        let layouts = analyze_structs(src);
        // sizes [8, 32, 8, 8, 8, 8]: sum = 72, ceil = 3; greedy packs
        // 32 | 8+8+8+8 | 8 = 3 slots.
        assert_eq!(layouts[0].field_sizes, vec![8, 32, 8, 8, 8, 8]);
        assert_eq!(layouts[0].current_slots, 3);
        assert_eq!(layouts[0].optimized_slots, 3);
    }

    #[test]
    fn test_empty_struct() {
        assert_eq!(optimized_slot_count(&[]), 0);
        assert_eq!(current_slot_count(&[]), 0);
    }
}
