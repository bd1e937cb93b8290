/// Parser for the JSON document written by `llvm-cov export -format=text`.
///
/// Structure:
///   {
///     "type": "llvm.coverage.json.export",
///     "version": "2.0.1",
///     "data": [{
///       "files": [{
///         "filename": "...",
///         "segments": [[line, col, count, has_count, is_region_entry, is_gap_region], ...],
///         "branches": [[line_start, col_start, line_end, col_end,
///                       execution_count, false_execution_count,
///                       file_id, expanded_file_id, kind], ...],
///         "summary": {"lines": {"count": N, "covered": N, ...}, "functions": {...}, "branches": {...}}
///       }],
///       "functions": [{"name": "...", "count": N, "filenames": ["..."], ...}],
///       "totals": {...}
///     }]
///   }
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{CovxmlError, Result};
use crate::mapping::CoverageStore;
use crate::model::*;
use crate::parsers::Parser;

pub const EXPORT_TYPE: &str = "llvm.coverage.json.export";

pub struct LlvmJsonParser;

impl Parser for LlvmJsonParser {
    fn parse(&self, input: &[u8]) -> Result<CoverageStore> {
        parse_llvm_json(input)
    }
}

#[derive(Debug, Deserialize)]
struct ExportDocument {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    version: Option<String>,
    data: Vec<ExportData>,
}

#[derive(Debug, Deserialize)]
struct ExportData {
    #[serde(default)]
    files: Vec<ExportFile>,
    #[serde(default)]
    functions: Vec<ExportFunction>,
}

#[derive(Debug, Deserialize)]
struct ExportFile {
    filename: String,
    #[serde(default)]
    segments: Vec<Vec<Value>>,
    #[serde(default)]
    branches: Vec<Vec<Value>>,
    #[serde(default)]
    summary: Option<ExportSummary>,
}

#[derive(Debug, Deserialize)]
struct ExportSummary {
    #[serde(default)]
    lines: Option<ExportCounts>,
    #[serde(default)]
    functions: Option<ExportCounts>,
    #[serde(default)]
    branches: Option<ExportCounts>,
}

#[derive(Debug, Deserialize)]
struct ExportCounts {
    count: u64,
    covered: u64,
}

impl From<Option<ExportCounts>> for CoverageCounts {
    fn from(counts: Option<ExportCounts>) -> Self {
        counts
            .map(|c| CoverageCounts::new(c.covered, c.count))
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct ExportFunction {
    name: String,
    count: u64,
    #[serde(default)]
    filenames: Vec<String>,
}

fn parse_llvm_json(input: &[u8]) -> Result<CoverageStore> {
    let doc: ExportDocument = serde_json::from_slice(input)?;

    match doc.kind.as_deref() {
        None | Some(EXPORT_TYPE) => {}
        Some(other) => {
            return Err(CovxmlError::Parse(format!(
                "Unsupported export type: '{}' (expected '{}')",
                other, EXPORT_TYPE
            )))
        }
    }
    debug!(
        "llvm-cov export version {}",
        doc.version.as_deref().unwrap_or("unknown")
    );

    let mut store = CoverageStore::new();

    for data in doc.data {
        for file in data.files {
            load_file(&mut store, file);
        }

        for function in data.functions {
            // A function belongs to the file holding its first region.
            match function.filenames.first() {
                Some(filename) if store.contains(filename) => {
                    store.file_mut(filename).functions.push(FunctionRecord {
                        name: function.name,
                        execution_count: function.count,
                    });
                }
                _ => debug!("skipping function '{}' with no known file", function.name),
            }
        }
    }

    Ok(store)
}

fn load_file(store: &mut CoverageStore, file: ExportFile) {
    let first_entry = !store.contains(&file.filename);
    let record = store.file_mut(&file.filename);

    for (i, raw) in file.segments.iter().enumerate() {
        match segment_from_array(raw) {
            Some(segment) => record.segments.push(segment),
            None => warn!("{}: skipping malformed segment #{}: {:?}", file.filename, i, raw),
        }
    }

    for (i, raw) in file.branches.iter().enumerate() {
        match branch_from_array(raw) {
            Some(branch) => record.branches.push(branch),
            None => warn!("{}: skipping malformed branch #{}: {:?}", file.filename, i, raw),
        }
    }

    // Supplied summaries are only trusted while every entry for the file
    // carries one; otherwise the summary is derived from the merged data.
    let incoming = file.summary.map(|summary| FileCoverageSummary {
        name: file.filename.clone(),
        lines: summary.lines.into(),
        branches: summary.branches.into(),
        functions: summary.functions.into(),
    });
    match (first_entry, incoming) {
        (true, incoming) => record.summary = incoming,
        (false, Some(incoming)) => {
            if let Some(existing) = record.summary.as_mut() {
                existing.add(&incoming);
            }
        }
        (false, None) => record.summary = None,
    }

    debug!(
        "loaded {}: {} segments, {} branches",
        file.filename,
        record.segments.len(),
        record.branches.len()
    );
}

fn u32_at(raw: &[Value], idx: usize) -> Option<u32> {
    raw.get(idx)?.as_u64().and_then(|v| u32::try_from(v).ok())
}

fn u64_at(raw: &[Value], idx: usize) -> Option<u64> {
    raw.get(idx)?.as_u64()
}

/// Booleans may also be written as 0/1 by older exporters.
fn bool_at(raw: &[Value], idx: usize) -> Option<bool> {
    match raw.get(idx)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_u64().map(|v| v != 0),
        _ => None,
    }
}

/// `[line, col, count, has_count, is_region_entry, is_gap_region]`.
/// The last two flags are optional.
fn segment_from_array(raw: &[Value]) -> Option<CoverageSegment> {
    Some(CoverageSegment {
        line: u32_at(raw, 0)?,
        col: u32_at(raw, 1)?,
        count: u64_at(raw, 2)?,
        has_count: bool_at(raw, 3)?,
        is_region_entry: bool_at(raw, 4).unwrap_or(false),
        is_gap_region: bool_at(raw, 5).unwrap_or(false),
    })
}

/// `[line_start, col_start, line_end, col_end, execution_count,
/// false_execution_count, file_id, expanded_file_id, kind, ...]`.
fn branch_from_array(raw: &[Value]) -> Option<BranchRegion> {
    Some(BranchRegion {
        line_start: u32_at(raw, 0)?,
        col_start: u32_at(raw, 1)?,
        line_end: u32_at(raw, 2)?,
        col_end: u32_at(raw, 3)?,
        execution_count: u64_at(raw, 4)?,
        false_execution_count: u64_at(raw, 5)?,
        kind: RegionKind::from(u64_at(raw, 8)?),
    })
}
