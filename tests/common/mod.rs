use covxml::mapping::CoverageStore;
use covxml::parsers::llvm_json::LlvmJsonParser;
use covxml::parsers::Parser;
use covxml::report::{CoverageExporter, XmlExporter};

#[allow(dead_code)]
pub const TIMESTAMP: i64 = 1_700_000_000;

/// Parse the bundled llvm-cov export fixture.
pub fn sample_store() -> CoverageStore {
    let json = include_bytes!("../fixtures/sample_export.json");
    LlvmJsonParser.parse(json).unwrap()
}

/// Render `files` with a fixed timestamp and return the document text.
#[allow(dead_code)]
pub fn render(store: &CoverageStore, files: &[&str]) -> String {
    let files: Vec<String> = files.iter().map(|f| f.to_string()).collect();
    let mut out = Vec::new();
    XmlExporter::new()
        .with_timestamp(TIMESTAMP)
        .render(store, &files, &mut out)
        .unwrap();
    String::from_utf8(out).unwrap()
}
