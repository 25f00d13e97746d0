//! Flattening of a root's reachable graph into named sections.
//!
//! Every distinct complex node reachable from the root gets one section,
//! named after the first (shortest, then alphabetically first) path that
//! reaches it. Shared and cyclic nodes are therefore printed once and
//! referenced by anchor everywhere else.

use crate::docs::{DocsArena, DocsId};
use std::collections::{HashMap, HashSet, VecDeque};

/// A node printed as its own section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Dotted property path from the root.
    pub name: String,
    /// Link target, unique within one flattening.
    pub anchor: String,
    pub docs: DocsId,
}

#[derive(Debug, Default)]
pub struct Flattened {
    sections: Vec<Section>,
    by_docs: HashMap<DocsId, usize>,
}

impl Flattened {
    /// Sections in case-insensitive name order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The section assigned to `id`, if it has one.
    pub fn section_of(&self, id: DocsId) -> Option<&Section> {
        self.by_docs.get(&id).map(|&i| &self.sections[i])
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Name every complex, unlinked node reachable from `root`.
pub fn flatten(arena: &DocsArena, root: DocsId) -> Flattened {
    let mut seen: HashSet<DocsId> = HashSet::from([root]);
    let mut found: Vec<(String, DocsId)> = Vec::new();
    let mut queue: VecDeque<(Option<String>, DocsId)> = VecDeque::from([(None, root)]);

    while let Some((path, id)) = queue.pop_front() {
        for param in arena.get(id).params.sorted() {
            let name = match &path {
                Some(prefix) => format!("{}.{}", prefix, param.name),
                None => param.name.clone(),
            };
            for alternative in &param.alternatives {
                let target = arena.get(alternative.docs);
                if target.link.is_some() || !target.is_complex() {
                    continue;
                }
                if seen.insert(alternative.docs) {
                    found.push((name.clone(), alternative.docs));
                    queue.push_back((Some(name.clone()), alternative.docs));
                }
            }
        }
    }

    found.sort_by_cached_key(|(name, _)| name.to_lowercase());

    let mut anchors: HashSet<String> = HashSet::new();
    let mut flattened = Flattened::default();
    for (name, docs) in found {
        let anchor = unique_anchor(&mut anchors, &name);
        flattened.by_docs.insert(docs, flattened.sections.len());
        flattened.sections.push(Section { name, anchor, docs });
    }
    flattened
}

fn unique_anchor(taken: &mut HashSet<String>, name: &str) -> String {
    let base: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let base = if base.is_empty() { "section".to_string() } else { base };
    let mut anchor = base.clone();
    let mut n = 1;
    while !taken.insert(anchor.clone()) {
        anchor = format!("{}-{}", base, n);
        n += 1;
    }
    anchor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::{Alternative, Docs};

    struct Graph {
        arena: DocsArena,
        leaf: DocsId,
    }

    impl Graph {
        fn new() -> Self {
            let mut arena = DocsArena::new();
            let leaf = arena.alloc(Docs::described(Some("A scalar.".to_string())));
            Self { arena, leaf }
        }

        fn node(&mut self) -> DocsId {
            let id = self.arena.alloc(Docs::default());
            let leaf = self.leaf;
            self.link(id, "value", leaf);
            id
        }

        fn link(&mut self, from: DocsId, name: &str, to: DocsId) {
            self.arena.get_mut(from).params.add(name, Alternative::new(to, None));
        }
    }

    fn names(flattened: &Flattened) -> Vec<&str> {
        flattened.sections().iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn diamond_is_named_once_by_first_path() {
        let mut g = Graph::new();
        let root = g.node();
        let left = g.node();
        let right = g.node();
        let shared = g.node();
        g.link(root, "right", right);
        g.link(root, "left", left);
        g.link(left, "shared", shared);
        g.link(right, "shared", shared);

        let flattened = flatten(&g.arena, root);
        assert_eq!(names(&flattened), vec!["left", "left.shared", "right"]);
        assert_eq!(flattened.section_of(shared).unwrap().name, "left.shared");
    }

    #[test]
    fn cycle_terminates_and_root_is_not_a_section() {
        let mut g = Graph::new();
        let root = g.node();
        let a = g.node();
        let b = g.node();
        g.link(root, "a", a);
        g.link(a, "b", b);
        g.link(b, "a", a);
        g.link(b, "root", root);

        let flattened = flatten(&g.arena, root);
        assert_eq!(names(&flattened), vec!["a", "a.b"]);
        assert!(flattened.section_of(root).is_none());
    }

    #[test]
    fn leaves_and_linked_nodes_get_no_section() {
        let mut g = Graph::new();
        let root = g.node();
        let linked = g.node();
        g.arena.get_mut(linked).link = Some("index.html#actions".to_string());
        let leaf = g.leaf;
        g.link(root, "handler", linked);
        g.link(root, "timeout", leaf);

        assert!(flatten(&g.arena, root).is_empty());
    }

    #[test]
    fn breadth_first_prefers_shorter_path() {
        let mut g = Graph::new();
        let root = g.node();
        let deep = g.node();
        let target = g.node();
        g.link(root, "a", deep);
        g.link(deep, "x", target);
        g.link(root, "z", target);

        let flattened = flatten(&g.arena, root);
        assert_eq!(flattened.section_of(target).unwrap().name, "z");
    }

    #[test]
    fn sections_sorted_case_insensitively() {
        let mut g = Graph::new();
        let root = g.node();
        for name in ["Zeta", "alpha", "Beta"] {
            let child = g.node();
            g.link(root, name, child);
        }
        let flattened = flatten(&g.arena, root);
        assert_eq!(names(&flattened), vec!["alpha", "Beta", "Zeta"]);
    }

    #[test]
    fn anchors_are_sanitized_and_unique() {
        let mut taken = HashSet::new();
        assert_eq!(unique_anchor(&mut taken, "headers.<any>"), "headers.any");
        assert_eq!(unique_anchor(&mut taken, "headers.any"), "headers.any-1");
        assert_eq!(unique_anchor(&mut taken, "<list of steps>"), "listofsteps");
    }
}
