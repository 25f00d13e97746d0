//! JSON renderer for tooling integration.
//!
//! Writes the whole reference as one `reference.json`: the same sections,
//! entries, property tables and nested sections the markdown pages show.

use crate::render::{shown, Page, Renderer};
use anyhow::{Context, Result};
use refdoc_graph::flatten::{flatten, Flattened};
use refdoc_graph::{Docs, EnumOption, Reference};
use serde::Serialize;

pub struct JsonRenderer;

pub const FILE_NAME: &str = "reference.json";

#[derive(Serialize)]
struct ReferenceView<'a> {
    title: &'a str,
    sections: Vec<SectionView<'a>>,
}

#[derive(Serialize)]
struct SectionView<'a> {
    title: &'a str,
    entries: Vec<EntryView<'a>>,
}

#[derive(Serialize)]
struct EntryView<'a> {
    name: &'a str,
    page: String,
    description: Option<&'a str>,
    type_description: Option<&'a str>,
    inline_param: Option<&'a str>,
    properties: Vec<PropertyView<'a>>,
    sections: Vec<NodeView<'a>>,
}

#[derive(Serialize)]
struct NodeView<'a> {
    name: String,
    anchor: String,
    type_description: Option<&'a str>,
    properties: Vec<PropertyView<'a>>,
}

#[derive(Serialize)]
struct PropertyView<'a> {
    name: &'a str,
    alternatives: Vec<AlternativeView<'a>>,
}

#[derive(Serialize)]
struct AlternativeView<'a> {
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<&'a str>,
    /// Anchor of the nested section documenting this value.
    #[serde(skip_serializing_if = "Option::is_none")]
    section: Option<String>,
    #[serde(skip_serializing_if = "no_options")]
    options: &'a [EnumOption],
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    valueless: bool,
}

impl Renderer for JsonRenderer {
    fn render(&self, reference: &Reference) -> Result<Vec<Page>> {
        let view = ReferenceView {
            title: &reference.title,
            sections: reference
                .sections
                .iter()
                .map(|section| SectionView {
                    title: &section.title,
                    entries: section
                        .entries
                        .iter()
                        .map(|entry| {
                            let (props, nested) = match entry.docs {
                                Some(id) => {
                                    let flattened = flatten(&reference.arena, id);
                                    (
                                        properties(reference, reference.docs(id), &flattened),
                                        nodes(reference, &flattened),
                                    )
                                }
                                None => (Vec::new(), Vec::new()),
                            };
                            EntryView {
                                name: &entry.name,
                                page: section.file_stem(entry),
                                description: entry.description.as_deref(),
                                type_description: entry.type_description.as_deref(),
                                inline_param: entry.inline_param.as_deref(),
                                properties: props,
                                sections: nested,
                            }
                        })
                        .collect(),
                })
                .collect(),
        };
        let contents = serde_json::to_string_pretty(&view).context("failed to serialize reference")?;
        Ok(vec![Page {
            file_name: FILE_NAME.to_string(),
            contents,
        }])
    }
}

fn no_options(options: &&[EnumOption]) -> bool {
    options.is_empty()
}

fn nodes<'a>(reference: &'a Reference, flattened: &Flattened) -> Vec<NodeView<'a>> {
    flattened
        .sections()
        .iter()
        .map(|section| {
            let docs = reference.docs(section.docs);
            NodeView {
                name: section.name.clone(),
                anchor: section.anchor.clone(),
                type_description: docs.type_description.as_deref(),
                properties: properties(reference, docs, flattened),
            }
        })
        .collect()
}

fn properties<'a>(reference: &'a Reference, docs: &'a Docs, flattened: &Flattened) -> Vec<PropertyView<'a>> {
    docs.params
        .sorted()
        .into_iter()
        .map(|param| PropertyView {
            name: &param.name,
            alternatives: shown(reference, param)
                .into_iter()
                .map(|shape| AlternativeView {
                    description: shape.description,
                    link: shape.docs.link.as_deref(),
                    section: flattened.section_of(shape.id).map(|s| s.anchor.clone()),
                    options: &shape.docs.options,
                    valueless: shape.docs.valueless,
                })
                .collect(),
        })
        .collect()
}
