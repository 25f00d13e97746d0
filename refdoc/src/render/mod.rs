//! Renderers: trait-based format dispatch.

pub mod json;
pub mod markdown;

use anyhow::{anyhow, Result};
use refdoc_graph::{Docs, DocsId, Param, Reference};

/// One output file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub file_name: String,
    pub contents: String,
}

/// Trait for rendering a finished reference into a specific output format.
pub trait Renderer {
    fn render(&self, reference: &Reference) -> Result<Vec<Page>>;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        _ => Err(anyhow!("unknown format: {}. Use markdown or json", format)),
    }
}

/// A property value shape worth printing.
pub(crate) struct Shown<'r> {
    pub id: DocsId,
    pub docs: &'r Docs,
    /// Reference-site text, falling back to the value's own description.
    pub description: Option<&'r str>,
}

/// Alternatives of `param` that document anything; undocumented leaves are
/// skipped.
pub(crate) fn shown<'r>(reference: &'r Reference, param: &'r Param) -> Vec<Shown<'r>> {
    param
        .alternatives
        .iter()
        .filter_map(|alt| {
            let docs = reference.docs(alt.docs);
            let description = alt
                .description
                .as_deref()
                .or(docs.owner_description.as_deref());
            let documented = description.is_some()
                || docs.is_complex()
                || docs.valueless
                || !docs.options.is_empty();
            documented.then_some(Shown {
                id: alt.docs,
                docs,
                description,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_formats() {
        assert!(create_renderer("markdown").is_ok());
        assert!(create_renderer("md").is_ok());
        assert!(create_renderer("json").is_ok());
        let err = create_renderer("html").err().unwrap();
        assert!(err.to_string().contains("unknown format: html"));
    }
}
