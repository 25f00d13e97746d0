//! Parsed declarations with their documentation comments.
//!
//! The source side of the correlation: names and parameter types exactly as
//! written, without symbol resolution. Produced by a source scanner, looked up
//! here by [`TypeName`].

use crate::surface::TypeName;
use crate::text;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

/// A `/** ... */` comment split into free text and `@param` tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    pub description: String,
    /// `@param` tags in declaration order: (parameter name, text).
    pub params: Vec<(String, String)>,
}

impl DocComment {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: &str, text: &str) -> Self {
        self.params.push((name.to_string(), text.to_string()));
        self
    }

    /// Normalized description, `None` when the comment has no free text.
    pub fn text(&self) -> Option<String> {
        text::normalize(&self.description)
    }

    /// Normalized text of the `@param` tag for `name`.
    pub fn param(&self, name: &str) -> Option<String> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, t)| text::normalize(t))
    }
}

/// A parameter type as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxType {
    Primitive(String),
    /// Class or interface type, possibly qualified, type arguments dropped.
    Named(String),
    /// Arrays, varargs, wildcards: never matched against structural types.
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDecl {
    pub name: String,
    pub ty: SyntaxType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub doc: Option<DocComment>,
    pub line: usize,
}

impl MethodDecl {
    pub fn description(&self) -> Option<String> {
        self.doc.as_ref().and_then(DocComment::text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstant {
    pub name: String,
    pub doc: Option<DocComment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub kind: DeclKind,
    pub doc: Option<DocComment>,
    pub methods: Vec<MethodDecl>,
    pub constants: Vec<EnumConstant>,
    pub nested: Vec<TypeDecl>,
}

impl TypeDecl {
    pub fn new(name: &str, kind: DeclKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            doc: None,
            methods: Vec::new(),
            constants: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn description(&self) -> Option<String> {
        self.doc.as_ref().and_then(DocComment::text)
    }

    /// First method declared directly in this type with the given name and arity.
    pub fn find_method(&self, name: &str, arity: usize) -> Option<&MethodDecl> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.params.len() == arity)
    }

    /// Depth-first search for a nested declaration by simple name.
    pub fn find_nested(&self, name: &str) -> Option<&TypeDecl> {
        find_first(&self.nested, name)
    }
}

fn find_first<'a>(decls: &'a [TypeDecl], name: &str) -> Option<&'a TypeDecl> {
    for decl in decls {
        if decl.name == name {
            return Some(decl);
        }
        if let Some(found) = find_first(&decl.nested, name) {
            return Some(found);
        }
    }
    None
}

/// All declarations of one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceUnit {
    pub package: Option<String>,
    pub types: Vec<TypeDecl>,
}

/// Parsed source units keyed by the top-level type they declare.
#[derive(Debug, Default)]
pub struct SourceSet {
    units: HashMap<String, SourceUnit>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, top_level: impl Into<String>, unit: SourceUnit) {
        self.units.insert(top_level.into(), unit);
    }

    pub fn has_unit(&self, ty: &TypeName) -> bool {
        self.units.contains_key(ty.top_level())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Declaration of `ty`, following the nesting path from its source unit.
    pub fn find_type(&self, ty: &TypeName) -> Option<&TypeDecl> {
        let unit = self.units.get(ty.top_level())?;
        let mut path = ty.nesting().into_iter();
        let mut decl = find_first(&unit.types, path.next()?)?;
        for name in path {
            decl = decl.find_nested(name)?;
        }
        Some(decl)
    }
}
