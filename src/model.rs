//! In-memory representation of LLVM source-based coverage as consumed by the
//! exporter: line segments, branch regions, and the summary counters rolled
//! up per file and per report.

use std::fmt;
use std::ops::AddAssign;

use serde::Serialize;

/// Compute a coverage rate, returning 0.0 when the total is zero.
#[must_use]
pub fn rate(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    }
}

/// One observation of line execution. The same line may be reported by
/// several segments (macro expansions, re-entered regions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageSegment {
    pub line: u32,
    pub col: u32,
    pub count: u64,
    /// Segments without a count carry no execution information.
    pub has_count: bool,
    pub is_region_entry: bool,
    pub is_gap_region: bool,
}

impl CoverageSegment {
    /// A counted segment at column 1, the common case in tests and fixtures.
    #[must_use]
    pub fn counted(line: u32, count: u64) -> Self {
        Self {
            line,
            col: 1,
            count,
            has_count: true,
            is_region_entry: true,
            is_gap_region: false,
        }
    }

    /// A segment that closes a region and carries no count.
    #[must_use]
    pub fn uncounted(line: u32) -> Self {
        Self {
            line,
            col: 1,
            count: 0,
            has_count: false,
            is_region_entry: false,
            is_gap_region: false,
        }
    }
}

/// Kind of a counter mapping region, using LLVM's numeric encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionKind {
    Code,
    Expansion,
    Skipped,
    Gap,
    Branch,
    McdcDecision,
    McdcBranch,
    Unknown(u64),
}

impl From<u64> for RegionKind {
    fn from(value: u64) -> Self {
        match value {
            0 => RegionKind::Code,
            1 => RegionKind::Expansion,
            2 => RegionKind::Skipped,
            3 => RegionKind::Gap,
            4 => RegionKind::Branch,
            5 => RegionKind::McdcDecision,
            6 => RegionKind::McdcBranch,
            n => RegionKind::Unknown(n),
        }
    }
}

/// A source range for one conditional branch, with separate counts for
/// its true and false arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchRegion {
    pub line_start: u32,
    pub col_start: u32,
    pub line_end: u32,
    pub col_end: u32,
    pub kind: RegionKind,
    pub execution_count: u64,
    pub false_execution_count: u64,
}

impl BranchRegion {
    /// A `Branch`-kind region spanning `line_start..=line_end`.
    #[must_use]
    pub fn new(line_start: u32, line_end: u32, execution_count: u64, false_execution_count: u64) -> Self {
        Self {
            line_start,
            col_start: 1,
            line_end,
            col_end: 1,
            kind: RegionKind::Branch,
            execution_count,
            false_execution_count,
        }
    }

    /// Inclusive on both ends. Inverted ranges contain nothing.
    #[must_use]
    pub fn spans_line(&self, line: u32) -> bool {
        self.line_start <= line && line <= self.line_end
    }
}

/// A function record, used to derive function coverage for its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRecord {
    pub name: String,
    pub execution_count: u64,
}

/// A covered/total pair with rate helpers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoverageCounts {
    pub covered: u64,
    pub total: u64,
}

impl CoverageCounts {
    #[must_use]
    pub fn new(covered: u64, total: u64) -> Self {
        Self { covered, total }
    }

    /// Fraction in `[0, 1]`.
    #[must_use]
    pub fn rate(&self) -> f64 {
        rate(self.covered, self.total)
    }

    #[must_use]
    pub fn percent_covered(&self) -> f64 {
        self.rate() * 100.0
    }
}

impl AddAssign for CoverageCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.covered += rhs.covered;
        self.total += rhs.total;
    }
}

/// Line, branch, and function coverage for one file (or, named `Totals`,
/// for the whole report).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileCoverageSummary {
    pub name: String,
    pub lines: CoverageCounts,
    pub branches: CoverageCounts,
    pub functions: CoverageCounts,
}

impl FileCoverageSummary {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add another summary's counters into this one, keeping the name.
    pub fn add(&mut self, other: &FileCoverageSummary) {
        self.lines += other.lines;
        self.branches += other.branches;
        self.functions += other.functions;
    }
}

/// Report-wide totals share the per-file shape.
pub type ReportTotals = FileCoverageSummary;

/// Branch arms of one line: how many were never taken out of how many exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionCoverage {
    pub not_covered: u64,
    pub total: u64,
}

impl ConditionCoverage {
    #[must_use]
    pub fn covered(&self) -> u64 {
        self.total - self.not_covered
    }

    #[must_use]
    pub fn percent(&self) -> f64 {
        rate(self.covered(), self.total) * 100.0
    }
}

impl fmt::Display for ConditionCoverage {
    /// Cobertura `condition-coverage` text, e.g. `50% (1/2)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}% ({}/{})", self.percent(), self.not_covered, self.total)
    }
}

/// One `<line>` of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord {
    pub line: u32,
    pub hits: u64,
    pub branch: Option<ConditionCoverage>,
}

impl LineRecord {
    #[must_use]
    pub fn is_branch(&self) -> bool {
        self.branch.is_some()
    }
}
