//! The coverage provider consumed by the exporter, and an in-memory store
//! implementing it.

use std::collections::BTreeMap;

use crate::lines::aggregate_lines;
use crate::model::{
    BranchRegion, CoverageCounts, CoverageSegment, FileCoverageSummary, FunctionRecord,
    RegionKind,
};

/// Coverage of a single file as seen by the renderer.
#[derive(Debug, Clone, Copy)]
pub struct FileCoverage<'a> {
    pub segments: &'a [CoverageSegment],
    pub branches: &'a [BranchRegion],
}

impl FileCoverage<'static> {
    pub const EMPTY: Self = FileCoverage {
        segments: &[],
        branches: &[],
    };
}

/// Read-only access to coverage data keyed by filename.
pub trait CoverageMapping {
    /// Every source file with coverage, sorted and deduplicated.
    fn unique_source_files(&self) -> Vec<&str>;

    /// Segments and branch regions for `filename`. Unknown files yield
    /// empty coverage.
    fn coverage_for_file(&self, filename: &str) -> FileCoverage<'_>;

    /// Function records attributed to `filename`.
    fn functions_for_file(&self, filename: &str) -> &[FunctionRecord];

    /// Line, branch, and function coverage for `filename`.
    ///
    /// The default derives the summary from the file's own segments,
    /// branch regions, and function records.
    fn file_summary(&self, filename: &str) -> FileCoverageSummary {
        derive_summary(filename, self.coverage_for_file(filename), self.functions_for_file(filename))
    }
}

fn derive_summary(
    filename: &str,
    coverage: FileCoverage<'_>,
    functions: &[FunctionRecord],
) -> FileCoverageSummary {
    let lines = aggregate_lines(coverage.segments);
    let line_counts = CoverageCounts::new(
        lines.iter().filter(|(_, hits)| *hits > 0).count() as u64,
        lines.len() as u64,
    );

    let mut branch_counts = CoverageCounts::default();
    for branch in coverage.branches.iter().filter(|b| b.kind == RegionKind::Branch) {
        branch_counts.total += 2;
        branch_counts.covered += u64::from(branch.execution_count != 0)
            + u64::from(branch.false_execution_count != 0);
    }

    let function_counts = CoverageCounts::new(
        functions.iter().filter(|f| f.execution_count > 0).count() as u64,
        functions.len() as u64,
    );

    FileCoverageSummary {
        name: filename.to_string(),
        lines: line_counts,
        branches: branch_counts,
        functions: function_counts,
    }
}

/// Everything recorded for one file.
#[derive(Debug, Clone, Default)]
pub struct FileRecord {
    pub segments: Vec<CoverageSegment>,
    pub branches: Vec<BranchRegion>,
    pub functions: Vec<FunctionRecord>,
    /// Summary supplied alongside the raw data, if any.
    pub summary: Option<FileCoverageSummary>,
}

/// In-memory [`CoverageMapping`], filled by a parser or by hand.
#[derive(Debug, Clone, Default)]
pub struct CoverageStore {
    files: BTreeMap<String, FileRecord>,
}

impl CoverageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable record for `filename`, created on first use.
    pub fn file_mut(&mut self, filename: &str) -> &mut FileRecord {
        self.files.entry(filename.to_string()).or_default()
    }

    #[must_use]
    pub fn contains(&self, filename: &str) -> bool {
        self.files.contains_key(filename)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl CoverageMapping for CoverageStore {
    fn unique_source_files(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    fn coverage_for_file(&self, filename: &str) -> FileCoverage<'_> {
        match self.files.get(filename) {
            Some(record) => FileCoverage {
                segments: &record.segments,
                branches: &record.branches,
            },
            None => FileCoverage::EMPTY,
        }
    }

    fn functions_for_file(&self, filename: &str) -> &[FunctionRecord] {
        self.files
            .get(filename)
            .map(|record| record.functions.as_slice())
            .unwrap_or(&[])
    }

    fn file_summary(&self, filename: &str) -> FileCoverageSummary {
        match self.files.get(filename) {
            Some(FileRecord {
                summary: Some(summary),
                ..
            }) => FileCoverageSummary {
                name: filename.to_string(),
                ..summary.clone()
            },
            Some(record) => derive_summary(
                filename,
                FileCoverage {
                    segments: &record.segments,
                    branches: &record.branches,
                },
                &record.functions,
            ),
            None => FileCoverageSummary::new(filename),
        }
    }
}
