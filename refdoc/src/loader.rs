//! Input loading: the surface file and the source directories.

use crate::parser;
use anyhow::{Context, Result};
use refdoc_graph::{SourceSet, Surface, TypeName};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Read the structural surface description (JSON).
pub fn load_surface(path: &Path) -> Result<Surface> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read surface file: {}", path.display()))?;
    let surface: Surface = serde_json::from_str(&text)
        .with_context(|| format!("invalid surface file: {}", path.display()))?;
    Ok(surface)
}

/// Expand glob patterns into source root directories, keeping the order in
/// which they were given.
pub fn expand_dirs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        let matches: Vec<PathBuf> = if path.is_dir() {
            vec![path.to_path_buf()]
        } else {
            let mut found: Vec<PathBuf> = glob::glob(pattern)
                .with_context(|| format!("invalid glob pattern: {}", pattern))?
                .filter_map(|r| r.ok())
                .filter(|p| p.is_dir())
                .collect();
            found.sort();
            found
        };
        if matches.is_empty() {
            warn!(pattern = %pattern, "no source directory matched");
        }
        for dir in matches {
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
    }
    Ok(dirs)
}

/// Relative path of the file declaring `top_level` (`a.b.Outer` → `a/b/Outer.java`).
pub fn source_path(top_level: &str) -> PathBuf {
    let mut path: PathBuf = top_level.split('.').collect();
    path.set_extension("java");
    path
}

/// Parse the source file of every top-level type in `types`, looking in
/// `dirs` in order. Missing or unparseable files leave the type undocumented.
pub fn load_sources<'a>(types: impl IntoIterator<Item = &'a TypeName>, dirs: &[PathBuf]) -> SourceSet {
    let top_levels: BTreeSet<&str> = types
        .into_iter()
        .filter(|t| !t.is_primitive())
        .map(TypeName::top_level)
        .collect();

    let mut sources = SourceSet::new();
    let mut missing = 0usize;
    for top_level in top_levels {
        let relative = source_path(top_level);
        let Some(file) = dirs.iter().map(|d| d.join(&relative)).find(|f| f.is_file()) else {
            if !top_level.starts_with("java.") {
                debug!(type_name = top_level, "cannot find source code");
                missing += 1;
            }
            continue;
        };
        match read_unit(&file) {
            Ok(unit) => sources.insert(top_level, unit),
            Err(e) => warn!(file = %file.display(), "skipping unparseable source: {:#}", e),
        }
    }
    info!(parsed = sources.len(), missing, "loaded source files");
    sources
}

fn read_unit(file: &Path) -> Result<refdoc_graph::syntax::SourceUnit> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    parser::parse_file(file, &content)
}
