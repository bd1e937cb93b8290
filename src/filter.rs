//! Filename filters used to drop files from an export.

use regex::Regex;

use crate::error::{CovxmlError, Result};
use crate::mapping::CoverageMapping;

/// A set of regular expressions; a file is ignored when any of them
/// matches its filename.
#[derive(Debug, Clone, Default)]
pub struct IgnoreFilters {
    patterns: Vec<Regex>,
}

impl IgnoreFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every pattern, failing on the first invalid one.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filters = Self::new();
        for pattern in patterns {
            filters.push(pattern.as_ref())?;
        }
        Ok(filters)
    }

    pub fn push(&mut self, pattern: &str) -> Result<()> {
        let re = Regex::new(pattern).map_err(|source| CovxmlError::InvalidFilter {
            pattern: pattern.to_string(),
            source,
        })?;
        self.patterns.push(re);
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    #[must_use]
    pub fn matches_filename(&self, filename: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(filename))
    }

    /// The mapping's source files that no filter matches, in the mapping's
    /// order.
    pub fn select_files<M>(&self, mapping: &M) -> Vec<String>
    where
        M: CoverageMapping + ?Sized,
    {
        mapping
            .unique_source_files()
            .into_iter()
            .filter(|f| !self.matches_filename(f))
            .map(str::to_string)
            .collect()
    }
}
