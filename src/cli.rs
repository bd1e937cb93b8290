//! Command handler functions for the covxml CLI.
//!
//! Each `cmd_*` function returns its status or report text as a `String`,
//! making them easy to test without capturing stdout.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use log::info;
use serde::Serialize;

use crate::error::CovxmlError;
use crate::filter::IgnoreFilters;
use crate::mapping::{CoverageMapping, CoverageStore};
use crate::model::{FileCoverageSummary, ReportTotals};
use crate::report::{CoverageExporter, XmlExporter};
use crate::summary::prepare_file_reports;

/// Pick the files to report on.
///
/// Ignore filters are compiled up front and apply to explicit sources as
/// well. Explicit sources keep their order and must all exist in `store`.
pub fn select_files(store: &CoverageStore, ignore: &[String], sources: &[String]) -> Result<Vec<String>> {
    let filters = IgnoreFilters::from_patterns(ignore)?;

    if sources.is_empty() {
        return Ok(filters.select_files(store));
    }

    let mut files = Vec::with_capacity(sources.len());
    for source in sources {
        if !store.contains(source) {
            return Err(CovxmlError::FileNotFound(source.clone()).into());
        }
        if filters.matches_filename(source) {
            info!("ignoring {source}");
            continue;
        }
        files.push(source.clone());
    }
    Ok(files)
}

/// Write the Cobertura report for `files` to `out`, returning a status line.
pub fn cmd_export(
    store: &CoverageStore,
    files: &[String],
    exporter: &XmlExporter,
    out: &mut dyn Write,
) -> Result<String> {
    exporter.render(store, files, out)?;
    out.flush()?;
    Ok(format!("Wrote {} of {} files\n", files.len(), store.len()))
}

#[derive(Serialize)]
struct SummaryOutput {
    files: Vec<FileCoverageSummary>,
    totals: ReportTotals,
}

/// Per-file and total coverage, as a table or as JSON.
pub fn cmd_summary(store: &CoverageStore, files: &[String], json: bool) -> Result<String> {
    let mut totals = ReportTotals::new("Totals");
    let reports = prepare_file_reports(store, &mut totals, files);

    if json {
        let output = SummaryOutput {
            files: reports,
            totals,
        };
        return Ok(format!("{}\n", serde_json::to_string_pretty(&output)?));
    }

    let mut out = String::new();
    writeln!(
        out,
        "{:<60} {:>14} {:>14} {:>14}",
        "FILE", "LINES", "BRANCHES", "FUNCTIONS"
    )
    .unwrap();
    writeln!(out, "{}", "-".repeat(105)).unwrap();
    for report in reports.iter().chain(std::iter::once(&totals)) {
        writeln!(
            out,
            "{:<60} {:>13.1}% {:>13.1}% {:>13.1}%",
            report.name,
            report.lines.percent_covered(),
            report.branches.percent_covered(),
            report.functions.percent_covered(),
        )
        .unwrap();
    }

    let available = store.unique_source_files().len();
    if available != files.len() {
        writeln!(
            out,
            "({} of {} files ignored)",
            available - files.len(),
            available
        )
        .unwrap();
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::llvm_json::LlvmJsonParser;
    use crate::parsers::Parser;

    fn sample_store() -> CoverageStore {
        let input = include_bytes!("../tests/fixtures/sample_export.json");
        LlvmJsonParser.parse(input).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_all_files() {
        let store = sample_store();
        let files = select_files(&store, &[], &[]).unwrap();
        assert_eq!(
            files,
            vec!["/proj/src/main.c", "/proj/src/util.c", "/usr/include/stdio.h"]
        );
    }

    #[test]
    fn test_select_with_ignore_filter() {
        let store = sample_store();
        let files = select_files(&store, &strings(&["^/usr/"]), &[]).unwrap();
        assert_eq!(files, vec!["/proj/src/main.c", "/proj/src/util.c"]);
    }

    #[test]
    fn test_explicit_sources_keep_order() {
        let store = sample_store();
        let sources = strings(&["/proj/src/util.c", "/proj/src/main.c"]);
        let files = select_files(&store, &[], &sources).unwrap();
        assert_eq!(files, sources);
    }

    #[test]
    fn test_explicit_source_missing() {
        let store = sample_store();
        let err = select_files(&store, &[], &strings(&["/proj/src/gone.c"])).unwrap_err();
        match err.downcast_ref::<CovxmlError>() {
            Some(CovxmlError::FileNotFound(path)) => assert_eq!(path, "/proj/src/gone.c"),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_ignore_filters_apply_to_explicit_sources() {
        let store = sample_store();
        let sources = strings(&["/usr/include/stdio.h", "/proj/src/main.c"]);
        let files = select_files(&store, &strings(&["^/usr/"]), &sources).unwrap();
        assert_eq!(files, vec!["/proj/src/main.c"]);
    }

    #[test]
    fn test_invalid_filter_rejected_with_explicit_sources() {
        let store = sample_store();
        let err = select_files(&store, &strings(&["("]), &strings(&["/proj/src/main.c"]))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CovxmlError>(),
            Some(CovxmlError::InvalidFilter { .. })
        ));
    }

    #[test]
    fn test_cmd_export() {
        let store = sample_store();
        let files = strings(&["/proj/src/main.c"]);
        let mut out = Vec::new();
        let status = cmd_export(&store, &files, &XmlExporter::new().with_timestamp(1), &mut out)
            .unwrap();

        assert_eq!(status, "Wrote 1 of 3 files\n");
        let xml = String::from_utf8(out).unwrap();
        assert!(xml.contains("filename=\"/proj/src/main.c\""));
        assert!(!xml.contains("/proj/src/util.c"));
        assert!(xml.contains("timestamp=\"1\""));
    }

    #[test]
    fn test_cmd_summary_table() {
        let store = sample_store();
        let files = select_files(&store, &strings(&["^/usr/"]), &[]).unwrap();
        let out = cmd_summary(&store, &files, false).unwrap();

        assert!(out.starts_with("FILE"));
        let main = out.lines().find(|l| l.starts_with("/proj/src/main.c")).unwrap();
        assert!(main.contains("83.3%"));
        assert!(main.contains("50.0%"));
        assert!(main.contains("100.0%"));
        let totals = out.lines().find(|l| l.starts_with("Totals")).unwrap();
        assert!(totals.contains("80.0%"));
        assert!(totals.contains("66.7%"));
        assert!(out.contains("(1 of 3 files ignored)"));
    }

    #[test]
    fn test_cmd_summary_table_nothing_ignored() {
        let store = sample_store();
        let files = select_files(&store, &[], &[]).unwrap();
        let out = cmd_summary(&store, &files, false).unwrap();
        assert!(!out.contains("ignored"));
    }

    #[test]
    fn test_cmd_summary_json() {
        let store = sample_store();
        let files = strings(&["/proj/src/main.c", "/proj/src/util.c"]);
        let out = cmd_summary(&store, &files, true).unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["files"].as_array().unwrap().len(), 2);
        assert_eq!(value["files"][0]["name"], "/proj/src/main.c");
        assert_eq!(value["files"][1]["lines"]["covered"], 3);
        assert_eq!(value["totals"]["name"], "Totals");
        assert_eq!(value["totals"]["lines"]["covered"], 8);
        assert_eq!(value["totals"]["lines"]["total"], 10);
        assert_eq!(value["totals"]["functions"]["total"], 3);
    }
}
