//! 不足番号の計算

use crate::inventory::name_index;
use crate::model::MemberRecord;
use std::collections::BTreeSet;

/// `{1..target}` のうち準拠ノードで埋まっていない番号を昇順で返す
///
/// 準拠ノードが目標数以上あれば空（余剰・不正ノードは報告のみで削除しない）。
pub fn missing_indices(compliant: &[MemberRecord], target_count: u32) -> Vec<u32> {
    if compliant.len() >= target_count as usize {
        return Vec::new();
    }

    let present: BTreeSet<u32> = compliant
        .iter()
        .filter_map(|record| name_index(&record.name).ok())
        .collect();

    (1..=target_count)
        .filter(|index| !present.contains(index))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemberState;

    fn members(names: &[&str]) -> Vec<MemberRecord> {
        names
            .iter()
            .map(|n| MemberRecord::new(*n, "v2-8", MemberState::Ready, "z"))
            .collect()
    }

    #[test]
    fn test_gap_in_the_middle() {
        assert_eq!(missing_indices(&members(&["v2-1", "v2-3", "v2-4"]), 4), vec![2]);
    }

    #[test]
    fn test_gap_regardless_of_order() {
        assert_eq!(missing_indices(&members(&["v2-4", "v2-1", "v2-3"]), 4), vec![2]);
    }

    #[test]
    fn test_generalized_gap() {
        for gap in 1..=5u32 {
            let names: Vec<String> = (1..=5)
                .filter(|i| *i != gap)
                .map(|i| format!("v2-{}", i))
                .collect();
            let refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
            assert_eq!(missing_indices(&members(&refs), 5), vec![gap]);
        }
    }

    #[test]
    fn test_tail_missing() {
        assert_eq!(missing_indices(&members(&["v2-1", "v2-2"]), 4), vec![3, 4]);
    }

    #[test]
    fn test_empty_fleet() {
        assert_eq!(missing_indices(&[], 3), vec![1, 2, 3]);
    }

    #[test]
    fn test_satisfied_or_surplus() {
        assert!(missing_indices(&members(&["v2-1", "v2-2"]), 2).is_empty());
        assert!(missing_indices(&members(&["v2-1", "v2-2", "v2-3"]), 2).is_empty());
        assert!(missing_indices(&members(&["v2-1"]), 0).is_empty());
    }
}
