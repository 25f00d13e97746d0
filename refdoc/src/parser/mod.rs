//! Source parsers, dispatched by file extension.

pub mod java;

use anyhow::{anyhow, Result};
use refdoc_graph::syntax::SourceUnit;
use std::path::Path;

/// Parse a source file into its declarations based on its extension.
pub fn parse_file(path: &Path, content: &str) -> Result<SourceUnit> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("java") => Ok(java::parse(content)?),
        _ => Err(anyhow!("unsupported file type: {}", path.display())),
    }
}
