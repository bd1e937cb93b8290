pub mod llvm_json;

use crate::error::Result;
use crate::mapping::CoverageStore;

/// Every input format parser implements this trait.
pub trait Parser {
    /// Parse the input bytes into an in-memory coverage store.
    fn parse(&self, input: &[u8]) -> Result<CoverageStore>;
}
