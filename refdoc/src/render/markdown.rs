//! Markdown renderer.
//!
//! Produces `index.md` listing every entry by section, and one page per
//! entry: its description, the inline definition, the property table and one
//! `###` section per nested builder reachable from it.

use crate::render::{shown, Page, Renderer, Shown};
use anyhow::Result;
use refdoc_graph::flatten::{flatten, Flattened};
use refdoc_graph::text;
use refdoc_graph::{Docs, DocsId, Entry, Reference};

pub struct MarkdownRenderer;

const NO_DESCRIPTION: &str = "<font color=\"#606060\">&lt;no description&gt;</font>";
const VALUELESS_NOTE: &str = "Note: property does not have any value";

impl Renderer for MarkdownRenderer {
    fn render(&self, reference: &Reference) -> Result<Vec<Page>> {
        let mut pages = vec![Page {
            file_name: "index.md".to_string(),
            contents: render_index(reference),
        }];
        for section in &reference.sections {
            for entry in &section.entries {
                pages.push(Page {
                    file_name: format!("{}.md", section.file_stem(entry)),
                    contents: render_entry(reference, entry),
                });
            }
        }
        Ok(pages)
    }
}

fn render_index(reference: &Reference) -> String {
    let mut out = format!("# {} reference\n", reference.title);
    for section in &reference.sections {
        out.push_str(&format!("\n## {}\n\n", section.title));
        for entry in &section.entries {
            let stem = section.file_stem(entry);
            match text::first_line(entry.description.as_deref()) {
                Some(line) => out.push_str(&format!("* [{}](./{}.html): {}\n", entry.name, stem, line)),
                None => out.push_str(&format!("* [{}](./{}.html)\n", entry.name, stem)),
            }
        }
    }
    out
}

fn render_entry(reference: &Reference, entry: &Entry) -> String {
    let mut out = format!("# {}\n\n", entry.name);
    if let Some(description) = &entry.type_description {
        out.push_str(&paragraphs(description));
        out.push('\n');
    }
    if let Some(inline) = &entry.inline_param {
        out.push_str("\n| Inline definition |\n| -------- |\n");
        out.push_str(&format!("| {} |\n", cell(inline)));
    }

    let Some(id) = entry.docs else {
        return out;
    };
    let root = reference.docs(id);
    if root.params.is_empty() {
        return out;
    }

    let flattened = flatten(&reference.arena, id);
    out.push('\n');
    out.push_str(&properties(reference, root, &flattened, id));
    for section in flattened.sections() {
        let docs = reference.docs(section.docs);
        out.push_str(&format!(
            "\n### <a id=\"{}\"></a>{}\n\n",
            section.anchor,
            escape(&section.name)
        ));
        if let Some(description) = &docs.type_description {
            out.push_str(&paragraphs(description));
            out.push_str("\n\n");
        }
        out.push_str(&properties(reference, docs, &flattened, id));
    }
    out
}

/// Property table of `docs`; a value leading back to `root` links to the
/// page top.
fn properties(reference: &Reference, docs: &Docs, flattened: &Flattened, root: DocsId) -> String {
    let mut out = String::from("| Property | Description |\n| ------- | -------- |\n");
    for param in docs.params.sorted() {
        let name = escape(&param.name);
        let shapes = shown(reference, param);
        if shapes.is_empty() {
            out.push_str(&format!("| {} | {} |\n", name, NO_DESCRIPTION));
            continue;
        }
        for (i, shape) in shapes.iter().enumerate() {
            let name_cell = match (&shape.docs.link, flattened.section_of(shape.id)) {
                (Some(link), _) => format!("[{}]({})", name, link),
                (None, Some(section)) => format!("[{}](#{})", name, section.anchor),
                (None, None) if shape.id == root => format!("[{}](#)", name),
                (None, None) => name.clone(),
            };
            let alternative = if i > 0 { " (alternative)" } else { "" };
            out.push_str(&format!(
                "| {}{} | {} |\n",
                name_cell,
                alternative,
                description(shape)
            ));
        }
    }
    out
}

fn description(shape: &Shown<'_>) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(text) = shape.description {
        parts.push(cell(text));
    }
    if shape.docs.valueless {
        parts.push(VALUELESS_NOTE.to_string());
    }
    if !shape.docs.options.is_empty() {
        let mut list = String::from("Options:<ul>");
        for option in &shape.docs.options {
            list.push_str(&format!("<li><code>{}</code>", option.name));
            if let Some(text) = &option.description {
                list.push_str(": ");
                list.push_str(&cell(text));
            }
            list.push_str("</li>");
        }
        list.push_str("</ul>");
        parts.push(list);
    }
    if parts.is_empty() {
        NO_DESCRIPTION.to_string()
    } else {
        parts.join("<br>")
    }
}

/// Table cell text: one line, pipes escaped.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}

/// Synthetic property names such as `<any>` must not read as HTML tags.
fn escape(name: &str) -> String {
    name.replace('<', "&lt;").replace('>', "&gt;")
}

fn paragraphs(text: &str) -> String {
    text.replace('\n', "\n\n")
}
