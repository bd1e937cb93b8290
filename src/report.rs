//! Cobertura XML export.
//!
//! Document layout (DTD `coverage-04`):
//!   <coverage line-rate=".." branch-rate=".." lines-covered=".." ...>
//!     <sources><source>.</source></sources>
//!     <packages>
//!       <package name="" line-rate=".." branch-rate=".." ...>
//!         <classes>
//!           <class name="" filename="..." line-rate=".." branch-rate=".." complexity="0.0">
//!             <methods/>
//!             <lines>
//!               <line number=".." hits=".." branch="true|false"
//!                     condition-coverage="50% (1/2)"/>
//!             </lines>
//!           </class>
//!         </classes>
//!       </package>
//!     </packages>
//!   </coverage>
//!
//! Output is streamed event by event; only one file's lines are held in
//! memory at a time.

use std::io::Write;

use chrono::Utc;
use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::branch::line_record;
use crate::error::Result;
use crate::filter::IgnoreFilters;
use crate::lines::aggregate_lines;
use crate::mapping::CoverageMapping;
use crate::model::{FileCoverageSummary, LineRecord, ReportTotals};
use crate::summary::prepare_file_reports;

pub const COBERTURA_DTD: &str = "http://cobertura.sourceforge.net/xml/coverage-04.dtd";

/// Value of the `version` attribute on `<coverage>`.
pub const TOOL_VERSION: &str = concat!("covxml ", env!("CARGO_PKG_VERSION"));

const COMPLEXITY: &str = "0.0";

/// Every export format implements this trait.
pub trait CoverageExporter {
    /// Render a report for exactly `files`, in the given order.
    fn render(&self, mapping: &dyn CoverageMapping, files: &[String], out: &mut dyn Write) -> Result<()>;

    /// Render a report for every file in `mapping` not matched by `filters`.
    fn render_root(
        &self,
        mapping: &dyn CoverageMapping,
        filters: &IgnoreFilters,
        out: &mut dyn Write,
    ) -> Result<()> {
        let files = filters.select_files(mapping);
        self.render(mapping, &files, out)
    }
}

/// Cobertura XML exporter.
#[derive(Debug, Clone, Default)]
pub struct XmlExporter {
    timestamp: Option<i64>,
}

impl XmlExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed `timestamp` instead of the time of rendering.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    fn timestamp(&self) -> i64 {
        self.timestamp.unwrap_or_else(|| Utc::now().timestamp())
    }
}

impl CoverageExporter for XmlExporter {
    fn render(&self, mapping: &dyn CoverageMapping, files: &[String], out: &mut dyn Write) -> Result<()> {
        let mut totals = ReportTotals::new("Totals");
        let reports = prepare_file_reports(mapping, &mut totals, files);

        let mut writer = Writer::new(out);
        render_header(&mut writer, &totals, self.timestamp())?;
        for (filename, report) in files.iter().zip(&reports) {
            render_file(&mut writer, mapping, filename, report)?;
        }
        render_footer(&mut writer)?;
        writer.get_mut().flush()?;
        Ok(())
    }
}

/// Rates are fractions with five decimals, e.g. `0.83333`.
fn fixed5(value: f64) -> String {
    format!("{value:.5}")
}

fn start<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn render_header<W: Write>(writer: &mut Writer<W>, totals: &ReportTotals, timestamp: i64) -> Result<()> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped(format!(
        "coverage SYSTEM '{COBERTURA_DTD}'"
    ))))?;

    let line_rate = fixed5(totals.lines.rate());
    let branch_rate = fixed5(totals.branches.rate());
    let function_rate = fixed5(totals.functions.rate());

    let coverage_attrs = [
        ("line-rate", line_rate.clone()),
        ("branch-rate", branch_rate.clone()),
        ("lines-covered", totals.lines.covered.to_string()),
        ("lines-valid", totals.lines.total.to_string()),
        ("branches-covered", totals.branches.covered.to_string()),
        ("branches-valid", totals.branches.total.to_string()),
        ("function-rate", function_rate.clone()),
        ("functions-covered", totals.functions.covered.to_string()),
        ("functions-valid", totals.functions.total.to_string()),
        ("complexity", COMPLEXITY.to_string()),
        ("version", TOOL_VERSION.to_string()),
        ("timestamp", timestamp.to_string()),
    ];
    let coverage = BytesStart::new("coverage")
        .with_attributes(coverage_attrs.iter().map(|(k, v)| (*k, v.as_str())));
    writer.write_event(Event::Start(coverage))?;

    // The source root is not known here; "." keeps filenames as given.
    start(writer, "sources")?;
    start(writer, "source")?;
    writer.write_event(Event::Text(BytesText::new(".")))?;
    end(writer, "source")?;
    end(writer, "sources")?;

    start(writer, "packages")?;
    let package = BytesStart::new("package").with_attributes([
        ("name", ""),
        ("line-rate", line_rate.as_str()),
        ("branch-rate", branch_rate.as_str()),
        ("function-rate", function_rate.as_str()),
        ("complexity", COMPLEXITY),
    ]);
    writer.write_event(Event::Start(package))?;
    start(writer, "classes")
}

fn render_file<W: Write>(
    writer: &mut Writer<W>,
    mapping: &dyn CoverageMapping,
    filename: &str,
    report: &FileCoverageSummary,
) -> Result<()> {
    debug!("rendering {filename}");

    let line_rate = fixed5(report.lines.rate());
    let branch_rate = fixed5(report.branches.rate());
    let class = BytesStart::new("class").with_attributes([
        ("name", ""),
        ("filename", filename),
        ("line-rate", line_rate.as_str()),
        ("branch-rate", branch_rate.as_str()),
        ("complexity", COMPLEXITY),
    ]);
    writer.write_event(Event::Start(class))?;
    writer.write_event(Event::Empty(BytesStart::new("methods")))?;

    start(writer, "lines")?;
    let coverage = mapping.coverage_for_file(filename);
    for (line, hits) in aggregate_lines(coverage.segments) {
        render_line(writer, &line_record(line, hits, coverage.branches))?;
    }
    end(writer, "lines")?;
    end(writer, "class")
}

fn render_line<W: Write>(writer: &mut Writer<W>, record: &LineRecord) -> Result<()> {
    let number = record.line.to_string();
    let hits = record.hits.to_string();

    let mut line = BytesStart::new("line");
    line.push_attribute(("number", number.as_str()));
    line.push_attribute(("hits", hits.as_str()));
    match record.branch {
        None => line.push_attribute(("branch", "false")),
        Some(condition) => {
            let condition = condition.to_string();
            line.push_attribute(("branch", "true"));
            line.push_attribute(("condition-coverage", condition.as_str()));
        }
    }
    writer.write_event(Event::Empty(line))?;
    Ok(())
}

fn render_footer<W: Write>(writer: &mut Writer<W>) -> Result<()> {
    end(writer, "classes")?;
    end(writer, "package")?;
    end(writer, "packages")?;
    end(writer, "coverage")
}
