//! Per-file and report-wide summaries for a selection of files.

use log::debug;

use crate::mapping::CoverageMapping;
use crate::model::{FileCoverageSummary, ReportTotals};

/// One summary per selected file, in selection order. Each is also added
/// into `totals`.
pub fn prepare_file_reports<M, S>(
    mapping: &M,
    totals: &mut ReportTotals,
    files: &[S],
) -> Vec<FileCoverageSummary>
where
    M: CoverageMapping + ?Sized,
    S: AsRef<str>,
{
    let reports: Vec<FileCoverageSummary> = files
        .iter()
        .map(|file| mapping.file_summary(file.as_ref()))
        .collect();

    for report in &reports {
        totals.add(report);
    }

    debug!(
        "summarized {} files: {}/{} lines, {}/{} branches, {}/{} functions",
        reports.len(),
        totals.lines.covered,
        totals.lines.total,
        totals.branches.covered,
        totals.branches.total,
        totals.functions.covered,
        totals.functions.total,
    );

    reports
}
