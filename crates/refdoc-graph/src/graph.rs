//! Docs graph construction.
//!
//! [`GraphBuilder`] walks the builder surface from any starting type,
//! correlating every public method with its parsed declaration and turning
//! the method's return type into documented properties. Each builder type is
//! described once: the node is memoized before its methods are visited, so a
//! builder reachable from itself finds its own half-built node and reuses it.

use crate::classify::{self, Category, ACCEPT, ADD_ITEM, NEW_BUILDER, WITH_KEY};
use crate::docs::{Alternative, Docs, DocsArena, DocsId, EnumOption};
use crate::error::{Error, Result};
use crate::matcher;
use crate::surface::{MethodDescriptor, Surface, TypeKind, TypeName, TypeRef};
use crate::syntax::{DeclKind, DocComment, MethodDecl, SourceSet, TypeDecl};
use crate::vocabulary::Vocabulary;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Property name for values keyed by an arbitrary string.
pub const ANY_KEY: &str = "<any>";
pub const LIST_OF_STEPS: &str = "<list of steps>";
pub const LIST_OF_STRINGS: &str = "<list of strings>";
pub const LIST_OF_MAPPINGS: &str = "<list of mappings>";

/// What one category adds to a method's documented value.
enum Contribution {
    /// A synthetic property of the value.
    Property(&'static str, Alternative),
    /// A whole shared node (a nested builder or a registry).
    Node(DocsId),
}

pub struct GraphBuilder<'a> {
    surface: &'a Surface,
    sources: &'a SourceSet,
    vocabulary: &'a Vocabulary,
    arena: DocsArena,
    memo: HashMap<TypeName, DocsId>,
    registries: HashMap<TypeName, DocsId>,
    in_progress: HashSet<DocsId>,
    empty: DocsId,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(surface: &'a Surface, sources: &'a SourceSet, vocabulary: &'a Vocabulary) -> Self {
        let mut arena = DocsArena::new();
        let empty = arena.alloc(Docs::default());
        Self {
            surface,
            sources,
            vocabulary,
            arena,
            memo: HashMap::new(),
            registries: HashMap::new(),
            in_progress: HashSet::new(),
            empty,
        }
    }

    pub fn surface(&self) -> &'a Surface {
        self.surface
    }

    pub fn vocabulary(&self) -> &'a Vocabulary {
        self.vocabulary
    }

    pub fn arena(&self) -> &DocsArena {
        &self.arena
    }

    pub fn docs(&self, id: DocsId) -> &Docs {
        self.arena.get(id)
    }

    /// The shared explicitly empty leaf.
    pub fn empty(&self) -> DocsId {
        self.empty
    }

    /// Number of builder types described so far.
    pub fn described(&self) -> usize {
        self.memo.len()
    }

    /// Describe a builder type, at most once per run.
    ///
    /// Returns `None` when the type has no declaration to document it.
    pub fn describe(&mut self, ty: &TypeName) -> Result<Option<DocsId>> {
        if let Some(&id) = self.memo.get(ty) {
            return Ok(Some(id));
        }
        let Some(decl) = self.find_class(ty) else {
            return Ok(None);
        };
        let candidates = self.method_decls(ty);

        let id = self.arena.alloc(Docs {
            type_description: decl.description(),
            ..Default::default()
        });
        self.memo.insert(ty.clone(), id);

        let surface = self.surface;
        if surface.is_subtype(ty, &self.vocabulary.sequence_builder) {
            debug!(builder = %ty, "sequence scaffolding, not inspected");
            return Ok(Some(id));
        }

        self.in_progress.insert(id);
        for method in surface.methods(ty) {
            if classify::is_excluded(surface, self.vocabulary, ty, method) {
                continue;
            }
            let decl = matcher::find_matching(&candidates, method);
            if decl.is_none() {
                debug!(builder = %ty, method = %method.name, "no matching declaration");
            }
            if let Some(alternative) = self.describe_method(ty, method, decl)? {
                self.arena.get_mut(id).params.add(&method.name, alternative);
            }
        }
        self.in_progress.remove(&id);
        Ok(Some(id))
    }

    /// Document one method of `owner` as a property value.
    ///
    /// `None` means the method documents nothing beyond itself.
    pub fn describe_method(
        &mut self,
        owner: &TypeName,
        method: &MethodDescriptor,
        decl: Option<&MethodDecl>,
    ) -> Result<Option<Alternative>> {
        let description = decl.and_then(MethodDecl::description);
        let returns = &method.returns.name;

        let mut contributions = Vec::new();
        for category in classify::classify(self.surface, self.vocabulary, owner, method) {
            match category {
                Category::SelfReturn => return Ok(Some(self.scalar(method, description))),
                Category::Pair => contributions.push(self.pair(returns)?),
                Category::Partial => contributions.push(self.partial(returns)?),
                Category::Sequence => contributions.push(Contribution::Property(
                    LIST_OF_STEPS,
                    Alternative::new(self.empty, None),
                )),
                Category::StringList => contributions.push(self.string_list(returns)?),
                Category::MappingList => contributions.push(self.mapping_list(returns)?),
                Category::Registry => contributions.push(self.registry_of(owner, &method.returns)?),
                Category::Nested => {
                    if let Some(id) = self.describe(returns)? {
                        contributions.push(Contribution::Node(id));
                    }
                }
            }
        }
        Ok(self.resolve(contributions, description))
    }

    /// Resolve a plugin registry: one property per registered implementation.
    pub fn registry(&mut self, factory: &TypeName) -> Result<DocsId> {
        if let Some(&id) = self.registries.get(factory) {
            return Ok(id);
        }
        let id = self.arena.alloc(Docs {
            type_description: self.find_class(factory).and_then(TypeDecl::description),
            link: self.vocabulary.link_for(factory).map(str::to_string),
            ..Default::default()
        });
        self.registries.insert(factory.clone(), id);

        self.in_progress.insert(id);
        let surface = self.surface;
        for entry in surface.implementations(factory) {
            let Some(builder) = self.describe(&entry.builder)? else {
                warn!(registry = %factory, name = %entry.name, builder = %entry.builder, "cannot describe registered builder");
                continue;
            };
            let inline = if entry.accepts_param {
                self.inline_param_docs(&entry.factory)
            } else {
                None
            };
            let docs = self.arena.get_mut(builder);
            if docs.owner_description.is_none() {
                docs.owner_description = docs.type_description.clone();
            }
            if docs.inline_param.is_none() {
                docs.inline_param = inline;
            }
            let description = docs.owner_description.clone();
            self.arena
                .get_mut(id)
                .params
                .add(&entry.name, Alternative::new(builder, description));
        }
        self.in_progress.remove(&id);
        Ok(id)
    }

    /// `@param` text of the inline value taken by a factory's
    /// `newBuilder(Locator, String)`.
    pub fn inline_param_docs(&self, factory: &TypeName) -> Option<String> {
        let decl = self.find_class(factory)?;
        let signature = [&self.vocabulary.locator, &self.vocabulary.string];
        let method = decl
            .methods
            .iter()
            .find(|m| matcher::matches_signature(m, NEW_BUILDER, &signature))?;
        let param = method.params.get(1)?;
        method.doc.as_ref()?.param(&param.name)
    }

    /// Parsed methods of `ty` and its supertypes, own declarations first.
    pub fn method_decls(&self, ty: &TypeName) -> Vec<&'a MethodDecl> {
        let surface = self.surface;
        std::iter::once(ty)
            .chain(surface.supertypes(ty))
            .filter_map(|owner| self.lookup(owner, false))
            .flat_map(|decl| decl.methods.iter())
            .collect()
    }

    /// Class or interface declaration of `ty`, unless it is opaque scaffolding.
    pub fn find_class(&self, ty: &TypeName) -> Option<&'a TypeDecl> {
        let decl = self.lookup(ty, true)?;
        (decl.kind != DeclKind::Enum).then_some(decl)
    }

    fn find_enum(&self, ty: &TypeName) -> Option<&'a TypeDecl> {
        let decl = self.lookup(ty, true)?;
        (decl.kind == DeclKind::Enum).then_some(decl)
    }

    fn lookup(&self, ty: &TypeName, report: bool) -> Option<&'a TypeDecl> {
        if self.vocabulary.is_opaque(ty) {
            return None;
        }
        let sources: &'a SourceSet = self.sources;
        if !sources.has_unit(ty) {
            if report {
                debug!(type_name = %ty, "no source code");
            }
            return None;
        }
        let found = sources.find_type(ty);
        if found.is_none() && report {
            warn!(type_name = %ty, "cannot find declaration in source");
        }
        found
    }

    /// Finish the run: drop direct references to builders that ended with no
    /// properties, repeating until nothing changes, and hand over the arena.
    pub fn finish(mut self) -> DocsArena {
        loop {
            let hollow: HashSet<DocsId> = self
                .arena
                .ids()
                .filter(|&id| !self.arena.get(id).is_complex())
                .collect();
            let mut changed = false;
            for id in self.arena.ids().collect::<Vec<_>>() {
                changed |= self
                    .arena
                    .get_mut(id)
                    .params
                    .retain_alternatives(|alt| !(alt.nested && hollow.contains(&alt.docs)));
            }
            if !changed {
                break;
            }
        }
        self.arena
    }

    // -- category handlers ----------------------------------------------------

    fn scalar(&mut self, method: &MethodDescriptor, description: Option<String>) -> Alternative {
        let mut docs = Docs::described(description.clone());
        match method.params.as_slice() {
            [] => docs.valueless = true,
            [single] if self.surface.kind(&single.name) == Some(TypeKind::Enum) => {
                if let Some(decl) = self.find_enum(&single.name) {
                    docs.options = decl
                        .constants
                        .iter()
                        .map(|c| EnumOption {
                            name: c.name.clone(),
                            description: c.doc.as_ref().and_then(DocComment::text),
                        })
                        .collect();
                }
            }
            _ => {}
        }
        Alternative::new(self.arena.alloc(docs), description)
    }

    fn pair(&mut self, returns: &TypeName) -> Result<Contribution> {
        let inner = self.describe(returns)?.unwrap_or(self.empty);
        let description = self.shape_method_docs(returns, ACCEPT, 2);
        Ok(Contribution::Property(ANY_KEY, Alternative::new(inner, description)))
    }

    fn partial(&mut self, returns: &TypeName) -> Result<Contribution> {
        let surface = self.surface;
        let with_key = surface
            .find_method(returns, WITH_KEY, &[&self.vocabulary.string])
            .ok_or_else(|| Error::invariant(returns, "partial builder without withKey(String)"))?;
        let inner = self.describe(&with_key.returns.name)?.unwrap_or(self.empty);
        let description = self.shape_method_docs(returns, WITH_KEY, 1);
        Ok(Contribution::Property(ANY_KEY, Alternative::new(inner, description)))
    }

    fn string_list(&mut self, returns: &TypeName) -> Result<Contribution> {
        let type_description = match self.describe(returns)? {
            Some(id) => self.arena.get(id).type_description.clone(),
            None => None,
        };
        let id = self.arena.alloc(Docs::described(type_description));
        Ok(Contribution::Property(LIST_OF_STRINGS, Alternative::new(id, None)))
    }

    fn mapping_list(&mut self, returns: &TypeName) -> Result<Contribution> {
        let surface = self.surface;
        let add_item = surface
            .find_method(returns, ADD_ITEM, &[])
            .ok_or_else(|| Error::invariant(returns, "mapping list builder without addItem()"))?;
        let inner = self.describe(&add_item.returns.name)?.unwrap_or(self.empty);
        let description = self.shape_method_docs(returns, ADD_ITEM, 0);
        Ok(Contribution::Property(LIST_OF_MAPPINGS, Alternative::new(inner, description)))
    }

    fn registry_of(&mut self, owner: &TypeName, returns: &TypeRef) -> Result<Contribution> {
        let factory = returns.args.get(1).ok_or_else(|| {
            Error::invariant(owner, format!("registry provider {} has no factory type argument", returns))
        })?;
        Ok(Contribution::Node(self.registry(&factory.name)?))
    }

    /// Comment of a shape accessor (`accept`, `withKey`, `addItem`) as
    /// declared on the builder returned by the method.
    fn shape_method_docs(&self, builder: &TypeName, name: &str, arity: usize) -> Option<String> {
        self.find_class(builder)
            .and_then(|decl| decl.find_method(name, arity))
            .and_then(MethodDecl::description)
    }

    fn resolve(&mut self, contributions: Vec<Contribution>, description: Option<String>) -> Option<Alternative> {
        if let [Contribution::Node(target)] = contributions.as_slice() {
            let target = *target;
            if !self.in_progress.contains(&target) && !self.arena.get(target).is_complex() {
                return None;
            }
            return Some(Alternative {
                docs: target,
                description,
                nested: true,
            });
        }

        let mut docs = Docs {
            owner_description: description.clone(),
            ..Default::default()
        };
        for contribution in contributions {
            match contribution {
                Contribution::Property(name, alternative) => docs.params.add(name, alternative),
                Contribution::Node(target) => {
                    let node = self.arena.get(target);
                    if docs.type_description.is_none() {
                        docs.type_description = node.type_description.clone();
                    }
                    if docs.link.is_none() {
                        docs.link = node.link.clone();
                    }
                    docs.params.extend(&node.params);
                }
            }
        }
        if docs.params.is_empty() {
            return None;
        }
        Some(Alternative::new(self.arena.alloc(docs), description))
    }
}
