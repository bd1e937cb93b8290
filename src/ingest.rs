use std::path::Path;

use log::info;

use crate::error::Result;
use crate::mapping::CoverageStore;
use crate::parsers::llvm_json::LlvmJsonParser;
use crate::parsers::Parser;

/// Read an `llvm-cov export` JSON file into a coverage store.
pub fn load(file_path: &Path) -> Result<CoverageStore> {
    let content = std::fs::read(file_path)?;
    let store = LlvmJsonParser.parse(&content)?;
    info!(
        "loaded {} source files from {}",
        store.len(),
        file_path.display()
    );
    Ok(store)
}
