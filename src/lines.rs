//! Per-line hit counts from a file's segment stream.

use std::collections::HashMap;

use crate::model::CoverageSegment;

/// Collapse segments into `(line, hits)` pairs in first-seen line order.
///
/// Only counted segments contribute. When a line is reported more than
/// once, the maximum count wins: the line executed if any instrumented
/// instance of it executed.
pub fn aggregate_lines<'a, I>(segments: I) -> Vec<(u32, u64)>
where
    I: IntoIterator<Item = &'a CoverageSegment>,
{
    let mut lines: Vec<(u32, u64)> = Vec::new();
    let mut index: HashMap<u32, usize> = HashMap::new();

    for segment in segments.into_iter().filter(|s| s.has_count) {
        if let Some(&idx) = index.get(&segment.line) {
            if segment.count > lines[idx].1 {
                lines[idx].1 = segment.count;
            }
        } else {
            index.insert(segment.line, lines.len());
            lines.push((segment.line, segment.count));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_max_count() {
        let segments = [
            CoverageSegment::counted(5, 3),
            CoverageSegment::counted(5, 1),
            CoverageSegment::uncounted(5),
        ];
        assert_eq!(aggregate_lines(&segments), vec![(5, 3)]);
    }

    #[test]
    fn test_max_is_order_independent() {
        let forward = [
            CoverageSegment::counted(2, 1),
            CoverageSegment::counted(2, 7),
            CoverageSegment::counted(2, 4),
        ];
        let mut reversed = forward;
        reversed.reverse();
        assert_eq!(aggregate_lines(&forward), vec![(2, 7)]);
        assert_eq!(aggregate_lines(&reversed), vec![(2, 7)]);
    }

    #[test]
    fn test_uncounted_segments_create_no_line() {
        let segments = [
            CoverageSegment::uncounted(1),
            CoverageSegment::counted(2, 0),
            CoverageSegment::uncounted(3),
        ];
        assert_eq!(aggregate_lines(&segments), vec![(2, 0)]);
    }

    #[test]
    fn test_first_seen_order() {
        // Expansions can report an earlier line after a later one.
        let segments = [
            CoverageSegment::counted(10, 1),
            CoverageSegment::counted(3, 2),
            CoverageSegment::counted(10, 5),
            CoverageSegment::counted(7, 0),
        ];
        assert_eq!(aggregate_lines(&segments), vec![(10, 5), (3, 2), (7, 0)]);
    }

    #[test]
    fn test_empty() {
        let none: Vec<CoverageSegment> = Vec::new();
        assert!(aggregate_lines(&none).is_empty());
    }
}
