pub mod branch;
pub mod cli;
pub mod error;
pub mod filter;
pub mod ingest;
pub mod lines;
pub mod mapping;
pub mod model;
pub mod parsers;
pub mod report;
pub mod summary;
