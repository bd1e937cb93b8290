//! Per-line condition coverage from a file's branch regions.

use crate::model::{BranchRegion, ConditionCoverage, LineRecord, RegionKind};

/// Condition coverage for `line`, or `None` when no branch region spans it.
///
/// Each matching region contributes two arms; an arm counts as covered
/// when its execution count is non-zero.
#[must_use]
pub fn evaluate_line(line: u32, branches: &[BranchRegion]) -> Option<ConditionCoverage> {
    let mut matched: u64 = 0;
    let mut taken: u64 = 0;

    for branch in branches
        .iter()
        .filter(|b| b.kind == RegionKind::Branch && b.spans_line(line))
    {
        matched += 1;
        if branch.execution_count != 0 {
            taken += 1;
        }
        if branch.false_execution_count != 0 {
            taken += 1;
        }
    }

    if matched == 0 {
        return None;
    }

    let total = matched * 2;
    Some(ConditionCoverage {
        not_covered: total - taken,
        total,
    })
}

/// Build the output record for one aggregated line.
#[must_use]
pub fn line_record(line: u32, hits: u64, branches: &[BranchRegion]) -> LineRecord {
    LineRecord {
        line,
        hits,
        branch: evaluate_line(line, branches),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_branches() {
        assert_eq!(evaluate_line(1, &[]), None);
        let elsewhere = [BranchRegion::new(4, 4, 1, 1)];
        assert_eq!(evaluate_line(1, &elsewhere), None);
    }

    #[test]
    fn test_half_covered() {
        let branches = [BranchRegion::new(10, 10, 1, 0)];
        let cc = evaluate_line(10, &branches).unwrap();
        assert_eq!(cc, ConditionCoverage { not_covered: 1, total: 2 });
        assert_eq!(cc.to_string(), "50% (1/2)");
    }

    #[test]
    fn test_fully_covered_is_still_a_branch() {
        let branches = [BranchRegion::new(3, 3, 2, 5)];
        let record = line_record(3, 7, &branches);
        assert!(record.is_branch());
        assert_eq!(record.branch.unwrap().not_covered, 0);
        assert_eq!(record.branch.unwrap().to_string(), "100% (0/2)");
    }

    #[test]
    fn test_multi_line_branch_attributed_to_every_line() {
        let branches = [BranchRegion::new(4, 6, 0, 3)];
        for line in 4..=6 {
            let cc = evaluate_line(line, &branches).unwrap();
            assert_eq!(cc.total, 2);
            assert_eq!(cc.not_covered, 1);
        }
        assert_eq!(evaluate_line(7, &branches), None);
    }

    #[test]
    fn test_total_is_twice_matched() {
        let branches = [
            BranchRegion::new(8, 8, 1, 1),
            BranchRegion::new(8, 9, 0, 0),
            BranchRegion::new(7, 8, 4, 0),
        ];
        let cc = evaluate_line(8, &branches).unwrap();
        assert_eq!(cc.total, 6);
        assert_eq!(cc.not_covered, 3);
        assert!(cc.not_covered <= cc.total);
        assert_eq!(cc.to_string(), "50% (3/6)");
    }

    #[test]
    fn test_non_branch_kinds_ignored() {
        let mut code = BranchRegion::new(2, 2, 1, 1);
        code.kind = RegionKind::Code;
        let mut mcdc = BranchRegion::new(2, 2, 1, 1);
        mcdc.kind = RegionKind::McdcBranch;
        assert_eq!(evaluate_line(2, &[code, mcdc]), None);
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let branches = [BranchRegion::new(9, 5, 1, 1)];
        for line in 4..=10 {
            assert_eq!(evaluate_line(line, &branches), None);
        }
    }

    #[test]
    fn test_uncovered_percent_rounds() {
        // 1 of 6 arms taken: 16.67% rounds to 17
        let branches = [
            BranchRegion::new(1, 1, 1, 0),
            BranchRegion::new(1, 1, 0, 0),
            BranchRegion::new(1, 1, 0, 0),
        ];
        assert_eq!(evaluate_line(1, &branches).unwrap().to_string(), "17% (5/6)");
    }
}
