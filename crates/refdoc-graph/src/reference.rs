//! Assembly of the complete reference: steps plus registry index sections.

use crate::docs::{Docs, DocsArena, DocsId};
use crate::error::Result;
use crate::graph::GraphBuilder;
use crate::matcher;
use crate::surface::{MethodDescriptor, Surface, TypeName};
use crate::syntax::{MethodDecl, SourceSet};
use crate::text;
use crate::vocabulary::Vocabulary;
use tracing::{debug, info, instrument, warn};

pub const STEPS_TITLE: &str = "Steps";
pub const STEPS_PREFIX: &str = "step";

/// One top-level page of the reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    /// Summary shown in the index.
    pub description: Option<String>,
    /// Text opening the entry's own page.
    pub type_description: Option<String>,
    pub inline_param: Option<String>,
    /// Node whose properties the page documents; `None` for steps that take
    /// at most an inline value.
    pub docs: Option<DocsId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSection {
    pub title: String,
    /// File name prefix of the entry pages.
    pub prefix: String,
    pub entries: Vec<Entry>,
}

impl IndexSection {
    pub fn file_stem(&self, entry: &Entry) -> String {
        format!("{}_{}", self.prefix, entry.name)
    }
}

/// Everything a renderer needs; owns the finished graph.
#[derive(Debug)]
pub struct Reference {
    pub title: String,
    pub arena: DocsArena,
    pub sections: Vec<IndexSection>,
}

impl Reference {
    pub fn docs(&self, id: DocsId) -> &Docs {
        self.arena.get(id)
    }
}

/// Describe every step and every indexed registry of the API.
#[instrument(skip_all, fields(title = %title))]
pub fn build(
    surface: &Surface,
    sources: &SourceSet,
    vocabulary: &Vocabulary,
    title: &str,
) -> Result<Reference> {
    let mut graph = GraphBuilder::new(surface, sources, vocabulary);
    let mut steps: Vec<Entry> = Vec::new();

    if let Some(catalog) = &vocabulary.step_catalog {
        add_catalog_steps(&mut graph, &mut steps, catalog)?;
    }
    if let Some(factory) = &vocabulary.step_factory {
        for entry in surface.implementations(factory) {
            if graph.find_class(&entry.factory).is_none() {
                debug!(step = %entry.name, factory = %entry.factory, "no source for step factory, skipped");
                continue;
            }
            let inline = if entry.accepts_param {
                graph.inline_param_docs(&entry.factory)
            } else {
                None
            };
            add_step(&mut graph, &mut steps, &entry.name, &entry.builder, None, inline)?;
        }
    }
    sort_entries(&mut steps);

    let mut sections = vec![IndexSection {
        title: STEPS_TITLE.to_string(),
        prefix: STEPS_PREFIX.to_string(),
        entries: steps,
    }];
    for index in &vocabulary.index {
        let registry = graph.registry(&index.factory)?;
        let mut entries: Vec<Entry> = graph
            .docs(registry)
            .params
            .iter()
            .filter_map(|param| {
                let first = param.alternatives.first()?;
                let node = graph.docs(first.docs);
                Some(Entry {
                    name: param.name.clone(),
                    description: node.owner_description.clone(),
                    type_description: node.type_description.clone(),
                    inline_param: node.inline_param.clone(),
                    docs: Some(first.docs),
                })
            })
            .collect();
        sort_entries(&mut entries);
        debug!(section = %index.title, entries = entries.len(), "indexed registry");
        sections.push(IndexSection {
            title: index.title.clone(),
            prefix: index.prefix.clone(),
            entries,
        });
    }

    let builders = graph.described();
    let arena = graph.finish();
    info!(builders, nodes = arena.len(), "reference assembled");
    Ok(Reference {
        title: title.to_string(),
        arena,
        sections,
    })
}

fn add_catalog_steps(
    graph: &mut GraphBuilder<'_>,
    steps: &mut Vec<Entry>,
    catalog: &TypeName,
) -> Result<()> {
    if graph.find_class(catalog).is_none() {
        warn!(catalog = %catalog, "step catalog has no declaration, skipping catalog steps");
        return Ok(());
    }
    let candidates = graph.method_decls(catalog);
    let surface = graph.surface();
    let vocabulary = graph.vocabulary();
    for method in surface.methods(catalog) {
        let Some(decl) = matcher::find_matching(&candidates, method) else {
            continue;
        };
        let returns = &method.returns.name;
        if surface.is_subtype(returns, &vocabulary.step_builder) {
            add_step(graph, steps, &method.name, returns, decl.description(), None)?;
        } else if surface.is_subtype(returns, &vocabulary.sequence_builder) {
            add_simple_step(steps, method, decl);
        }
    }
    Ok(())
}

/// A step backed by a builder. A step of the same name created earlier as a
/// simple step gains the builder's properties.
fn add_step(
    graph: &mut GraphBuilder<'_>,
    steps: &mut Vec<Entry>,
    name: &str,
    builder: &TypeName,
    description: Option<String>,
    inline: Option<String>,
) -> Result<()> {
    let index = match position(steps, name) {
        None => {
            let Some(id) = graph.describe(builder)? else {
                warn!(step = name, builder = %builder, "cannot describe step builder");
                return Ok(());
            };
            let type_description = graph.docs(id).type_description.clone();
            steps.push(Entry {
                name: name.to_string(),
                description: description.or_else(|| text::first_line(type_description.as_deref())),
                type_description,
                inline_param: None,
                docs: Some(id),
            });
            steps.len() - 1
        }
        Some(i) if steps[i].docs.is_none() => {
            let Some(id) = graph.describe(builder)? else {
                return Ok(());
            };
            let entry = &mut steps[i];
            entry.type_description = description.or_else(|| graph.docs(id).type_description.clone());
            entry.docs = Some(id);
            if entry.description.is_none() {
                entry.description = text::first_line(entry.type_description.as_deref());
            }
            i
        }
        Some(i) => {
            if steps[i].description.is_none() {
                steps[i].description = description;
            }
            i
        }
    };
    let entry = &mut steps[index];
    if entry.inline_param.is_none() {
        entry.inline_param = inline;
    }
    Ok(())
}

/// A catalog method that only opens a sequence: documented by its own
/// comment and, with one argument, by that argument's `@param` text.
fn add_simple_step(steps: &mut Vec<Entry>, method: &MethodDescriptor, decl: &MethodDecl) {
    let description = decl.description();
    let simple = |description: Option<String>| Entry {
        name: method.name.clone(),
        description: description.clone(),
        type_description: description,
        ..Default::default()
    };
    match method.params.len() {
        0 => {
            if position(steps, &method.name).is_none() {
                steps.push(simple(description));
            }
        }
        1 => {
            let index = position(steps, &method.name).unwrap_or_else(|| {
                steps.push(simple(description));
                steps.len() - 1
            });
            steps[index].inline_param = decl
                .params
                .first()
                .and_then(|p| decl.doc.as_ref()?.param(&p.name));
        }
        _ => debug!(step = %method.name, "catalog sequence method with several arguments ignored"),
    }
}

fn position(entries: &[Entry], name: &str) -> Option<usize> {
    let key = name.to_lowercase();
    entries.iter().position(|e| e.name.to_lowercase() == key)
}

fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by_cached_key(|e| e.name.to_lowercase());
}
