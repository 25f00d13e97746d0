//! Docs nodes and the arena that owns them.
//!
//! Nodes reference each other by [`DocsId`], so cycles and shared
//! substructure are plain index reuse. Identity of a node is its id.

use serde::Serialize;

/// Stable address of a [`Docs`] node inside a [`DocsArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocsId(usize);

impl DocsId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One documented shape of a property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub docs: DocsId,
    /// Documentation of the reference site (the method comment).
    pub description: Option<String>,
    /// Direct reference to another builder's shared node; dropped when that
    /// node turns out to have no properties.
    pub nested: bool,
}

impl Alternative {
    pub fn new(docs: DocsId, description: Option<String>) -> Self {
        Self {
            docs,
            description,
            nested: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub alternatives: Vec<Alternative>,
}

/// Properties of a node: insertion ordered, names compared case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<Param>,
}

impl Params {
    /// Append `alternative` to the property `name`, creating it if needed.
    /// The first spelling of a name is kept.
    pub fn add(&mut self, name: &str, alternative: Alternative) {
        let key = name.to_lowercase();
        match self.entries.iter_mut().find(|p| p.name.to_lowercase() == key) {
            Some(param) => param.alternatives.push(alternative),
            None => self.entries.push(Param {
                name: name.to_string(),
                alternatives: vec![alternative],
            }),
        }
    }

    pub fn extend(&mut self, other: &Params) {
        for param in &other.entries {
            for alternative in &param.alternatives {
                self.add(&param.name, alternative.clone());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Param> {
        let key = name.to_lowercase();
        self.entries.iter().find(|p| p.name.to_lowercase() == key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Properties in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.entries.iter()
    }

    /// Properties in case-insensitive alphabetical order; ties keep
    /// discovery order.
    pub fn sorted(&self) -> Vec<&Param> {
        let mut sorted: Vec<&Param> = self.entries.iter().collect();
        sorted.sort_by_cached_key(|p| p.name.to_lowercase());
        sorted
    }

    /// Drop alternatives rejected by `keep`, then properties left empty.
    /// Returns whether anything was removed.
    pub(crate) fn retain_alternatives(&mut self, mut keep: impl FnMut(&Alternative) -> bool) -> bool {
        let before: usize = self.entries.iter().map(|p| p.alternatives.len()).sum();
        for param in &mut self.entries {
            param.alternatives.retain(|a| keep(a));
        }
        self.entries.retain(|p| !p.alternatives.is_empty());
        let after: usize = self.entries.iter().map(|p| p.alternatives.len()).sum();
        before != after
    }
}

/// One enum constant offered by a scalar property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumOption {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Docs {
    /// Shown where this node is referenced as a property value.
    pub owner_description: Option<String>,
    /// Shown once, in this node's own section.
    pub type_description: Option<String>,
    /// Documentation of the single inline value a builder may accept.
    pub inline_param: Option<String>,
    pub params: Params,
    /// External reference used instead of a local section.
    pub link: Option<String>,
    /// Constants of the enum a scalar property accepts.
    pub options: Vec<EnumOption>,
    /// Scalar property set by calling it without a value.
    pub valueless: bool,
}

impl Docs {
    /// Node whose owner and type descriptions are the same text.
    pub fn described(description: Option<String>) -> Self {
        Self {
            owner_description: description.clone(),
            type_description: description,
            ..Default::default()
        }
    }

    /// Has properties of its own and therefore its own section.
    pub fn is_complex(&self) -> bool {
        !self.params.is_empty()
    }
}

/// Owner of every node built during one generation run.
#[derive(Debug, Default)]
pub struct DocsArena {
    nodes: Vec<Docs>,
}

impl DocsArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, docs: Docs) -> DocsId {
        self.nodes.push(docs);
        DocsId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: DocsId) -> &Docs {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: DocsId) -> &mut Docs {
        &mut self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = DocsId> {
        (0..self.nodes.len()).map(DocsId)
    }
}
