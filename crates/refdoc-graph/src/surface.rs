//! Structural description of the builder API.
//!
//! This is what runtime introspection reports about each type: its kind,
//! its supertypes and its public methods with resolved parameter and return
//! types. It also carries the plugin registries (the implementations
//! registered for each factory kind). The whole surface is loaded once and
//! is read-only afterwards.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;

const PRIMITIVES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void",
];

/// Identity of a declared type: dotted package path, `$` between nested
/// types (`io.acme.Http$Builder`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The outermost enclosing type, which names the source file.
    pub fn top_level(&self) -> &str {
        self.0.split('$').next().unwrap_or(&self.0)
    }

    /// Last segment of the name, without package or enclosing types.
    pub fn simple_name(&self) -> &str {
        self.0.rsplit(|c: char| c == '.' || c == '$').next().unwrap_or(&self.0)
    }

    /// Simple names from the outermost type down to this one.
    /// `a.b.Outer$Mid$Inner` → `["Outer", "Mid", "Inner"]`
    pub fn nesting(&self) -> Vec<&str> {
        let mut parts = self.0.split('$');
        let mut path = Vec::new();
        if let Some(top) = parts.next() {
            path.push(top.rsplit('.').next().unwrap_or(top));
        }
        path.extend(parts);
        path
    }

    /// The name as it would be written in source (`Outer.Inner`).
    pub fn source_form(&self) -> String {
        self.0.replace('$', ".")
    }

    pub fn is_primitive(&self) -> bool {
        PRIMITIVES.contains(&self.0.as_str())
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A resolved type as used in a method signature, with type arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct TypeRef {
    pub name: TypeName,
    pub args: Vec<TypeRef>,
    pub array: bool,
}

impl TypeRef {
    pub fn simple(name: &str) -> Self {
        Self {
            name: TypeName::new(name),
            args: Vec::new(),
            array: false,
        }
    }

    pub fn is_primitive(&self) -> bool {
        !self.array && self.name.is_primitive()
    }
}

impl FromStr for TypeRef {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let mut cursor = Cursor { input, pos: 0 };
        let parsed = cursor.type_ref()?;
        cursor.skip_ws();
        if cursor.pos != input.len() {
            return Err(Error::type_ref(input, "trailing input"));
        }
        Ok(parsed)
    }
}

impl TryFrom<String> for TypeRef {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
            write!(f, "<{}>", args.join(", "))?;
        }
        if self.array {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn type_ref(&mut self) -> Result<TypeRef> {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, '<' | '>' | ',' | '[') {
                break;
            }
            self.pos += c.len_utf8();
        }
        let name = self.input[start..self.pos].trim();
        if name.is_empty() {
            return Err(Error::type_ref(self.input, "empty type name"));
        }

        let mut args = Vec::new();
        if self.peek() == Some('<') {
            self.pos += 1;
            loop {
                args.push(self.type_ref()?);
                self.skip_ws();
                match self.peek() {
                    Some(',') => self.pos += 1,
                    Some('>') => {
                        self.pos += 1;
                        break;
                    }
                    _ => return Err(Error::type_ref(self.input, "unclosed type arguments")),
                }
            }
        }

        self.skip_ws();
        let mut array = false;
        while self.input[self.pos..].starts_with("[]") {
            array = true;
            self.pos += 2;
            self.skip_ws();
        }

        Ok(TypeRef {
            name: TypeName::new(name),
            args,
            array,
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Enum,
}

/// A public method as reported by introspection.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub params: Vec<TypeRef>,
    pub returns: TypeRef,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_synthetic: bool,
}

impl MethodDescriptor {
    pub fn new(name: &str, params: &[&str], returns: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            params: params.iter().map(|p| p.parse()).collect::<Result<_>>()?,
            returns: returns.parse()?,
            is_static: false,
            is_default: false,
            is_synthetic: false,
        })
    }

    fn same_signature(&self, other: &MethodDescriptor) -> bool {
        self.name == other.name && self.params == other.params
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeDescriptor {
    pub name: TypeName,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub superclass: Option<TypeName>,
    #[serde(default)]
    pub interfaces: Vec<TypeName>,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

/// One implementation registered for a plugin factory kind.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryEntry {
    /// Display name the implementation is registered under.
    pub name: String,
    /// Concrete factory type (carries the inline parameter docs).
    pub factory: TypeName,
    /// Return type of the factory's builder-construction entry point.
    pub builder: TypeName,
    #[serde(default)]
    pub accepts_param: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registry {
    pub factory: TypeName,
    #[serde(default)]
    pub implementations: Vec<RegistryEntry>,
}

#[derive(Deserialize)]
struct SurfaceFile {
    #[serde(default)]
    types: Vec<TypeDescriptor>,
    #[serde(default)]
    registries: Vec<Registry>,
}

/// Indexed structural description of the whole API surface.
#[derive(Debug, Default, Deserialize)]
#[serde(from = "SurfaceFile")]
pub struct Surface {
    types: HashMap<TypeName, TypeDescriptor>,
    registries: HashMap<TypeName, Registry>,
}

impl From<SurfaceFile> for Surface {
    fn from(file: SurfaceFile) -> Self {
        Self::new(file.types, file.registries)
    }
}

impl Surface {
    pub fn new(types: Vec<TypeDescriptor>, registries: Vec<Registry>) -> Self {
        Self {
            types: types.into_iter().map(|t| (t.name.clone(), t)).collect(),
            registries: registries
                .into_iter()
                .map(|r| (r.factory.clone(), r))
                .collect(),
        }
    }

    pub fn kind(&self, ty: &TypeName) -> Option<TypeKind> {
        self.types.get(ty).map(|t| t.kind)
    }

    /// All supertypes of `ty`, breadth-first: superclass before interfaces.
    pub fn supertypes(&self, ty: &TypeName) -> Vec<&TypeName> {
        let mut result = Vec::new();
        let mut visited: HashSet<&TypeName> = HashSet::new();
        let mut queue: VecDeque<&TypeName> = VecDeque::new();
        if let Some(desc) = self.types.get(ty) {
            visited.insert(&desc.name);
            queue.push_back(&desc.name);
        }
        while let Some(current) = queue.pop_front() {
            let Some(desc) = self.types.get(current) else {
                continue;
            };
            for parent in desc.superclass.iter().chain(desc.interfaces.iter()) {
                if visited.insert(parent) {
                    result.push(parent);
                    queue.push_back(parent);
                }
            }
        }
        result
    }

    /// `ty` is `of` or inherits from it.
    pub fn is_subtype(&self, ty: &TypeName, of: &TypeName) -> bool {
        ty == of || self.supertypes(ty).into_iter().any(|s| s == of)
    }

    /// Public methods of `ty`, own declarations first, then inherited ones
    /// not overridden by an earlier signature.
    pub fn methods(&self, ty: &TypeName) -> Vec<&MethodDescriptor> {
        let mut result: Vec<&MethodDescriptor> = Vec::new();
        let owners = std::iter::once(ty).chain(self.supertypes(ty));
        for owner in owners {
            let Some(desc) = self.types.get(owner) else {
                continue;
            };
            for method in &desc.methods {
                if !result.iter().any(|m| m.same_signature(method)) {
                    result.push(method);
                }
            }
        }
        result
    }

    /// Look up a public method by exact name and parameter type names.
    pub fn find_method(
        &self,
        ty: &TypeName,
        name: &str,
        params: &[&TypeName],
    ) -> Option<&MethodDescriptor> {
        self.methods(ty).into_iter().find(|m| {
            m.name == name
                && m.params.len() == params.len()
                && m.params.iter().zip(params).all(|(p, q)| &p.name == *q)
        })
    }

    /// Implementations registered for a factory kind, in registration order.
    pub fn implementations(&self, factory: &TypeName) -> &[RegistryEntry] {
        self.registries
            .get(factory)
            .map(|r| r.implementations.as_slice())
            .unwrap_or(&[])
    }

    /// Every type whose declaration the engine may ask for.
    pub fn referenced_types(&self) -> BTreeSet<&TypeName> {
        let mut names = BTreeSet::new();
        for desc in self.types.values() {
            names.insert(&desc.name);
            names.extend(desc.superclass.iter().chain(&desc.interfaces));
            for method in &desc.methods {
                for param in &method.params {
                    names.insert(&param.name);
                }
                names.insert(&method.returns.name);
            }
        }
        for registry in self.registries.values() {
            names.insert(&registry.factory);
            for entry in &registry.implementations {
                names.insert(&entry.factory);
                names.insert(&entry.builder);
            }
        }
        names.retain(|n| !n.is_primitive());
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, superclass: Option<&str>, methods: Vec<MethodDescriptor>) -> TypeDescriptor {
        TypeDescriptor {
            name: TypeName::new(name),
            kind: TypeKind::Class,
            superclass: superclass.map(TypeName::new),
            interfaces: Vec::new(),
            methods,
        }
    }

    #[test]
    fn type_name_parts() {
        let name = TypeName::new("io.acme.Http$Builder");
        assert_eq!(name.top_level(), "io.acme.Http");
        assert_eq!(name.simple_name(), "Builder");
        assert_eq!(name.nesting(), vec!["Http", "Builder"]);
        assert_eq!(name.source_form(), "io.acme.Http.Builder");
    }

    #[test]
    fn parse_generic_type_ref() {
        let parsed: TypeRef = "a.Provider<a.Action, a.Action$Factory>".parse().unwrap();
        assert_eq!(parsed.name.as_str(), "a.Provider");
        assert_eq!(parsed.args.len(), 2);
        assert_eq!(parsed.args[1].name.as_str(), "a.Action$Factory");
        assert_eq!(parsed.to_string(), "a.Provider<a.Action, a.Action$Factory>");
    }

    #[test]
    fn parse_array_and_nested_generics() {
        let parsed: TypeRef = "java.util.Map<java.lang.String, java.util.List<int[]>>"
            .parse()
            .unwrap();
        assert!(parsed.args[1].args[0].array);
        let arr: TypeRef = "int[]".parse().unwrap();
        assert!(arr.array);
        assert!(!arr.is_primitive());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("a.Foo<".parse::<TypeRef>().is_err());
        assert!("".parse::<TypeRef>().is_err());
        assert!("a.Foo> b".parse::<TypeRef>().is_err());
    }

    #[test]
    fn subtype_walks_chain() {
        let surface = Surface::new(
            vec![
                class("a.Base", None, vec![]),
                class("a.Mid", Some("a.Base"), vec![]),
                class("a.Leaf", Some("a.Mid"), vec![]),
            ],
            vec![],
        );
        let leaf = TypeName::new("a.Leaf");
        assert!(surface.is_subtype(&leaf, &TypeName::new("a.Base")));
        assert!(surface.is_subtype(&leaf, &leaf));
        assert!(!surface.is_subtype(&TypeName::new("a.Base"), &leaf));
    }

    #[test]
    fn methods_include_inherited_without_overridden() {
        let surface = Surface::new(
            vec![
                class(
                    "a.Base",
                    None,
                    vec![
                        MethodDescriptor::new("name", &["java.lang.String"], "a.Base").unwrap(),
                        MethodDescriptor::new("timeout", &["int"], "a.Base").unwrap(),
                    ],
                ),
                class(
                    "a.Leaf",
                    Some("a.Base"),
                    vec![MethodDescriptor::new("name", &["java.lang.String"], "a.Leaf").unwrap()],
                ),
            ],
            vec![],
        );
        let methods = surface.methods(&TypeName::new("a.Leaf"));
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].returns.name.as_str(), "a.Leaf");
        assert_eq!(methods[1].name, "timeout");
    }

    #[test]
    fn deserialize_surface_file() {
        let json = r#"{
            "types": [
                {"name": "a.Foo", "kind": "interface", "methods": [
                    {"name": "bar", "params": ["int"], "returns": "a.Foo"}
                ]}
            ],
            "registries": [
                {"factory": "a.Action$Factory", "implementations": [
                    {"name": "log", "factory": "a.Log$Factory", "builder": "a.Log$Builder", "accepts_param": true}
                ]}
            ]
        }"#;
        let surface: Surface = serde_json::from_str(json).unwrap();
        let foo = TypeName::new("a.Foo");
        assert_eq!(surface.kind(&foo), Some(TypeKind::Interface));
        assert_eq!(surface.methods(&foo)[0].params[0].name.as_str(), "int");
        let impls = surface.implementations(&TypeName::new("a.Action$Factory"));
        assert_eq!(impls.len(), 1);
        assert!(impls[0].accepts_param);
        assert!(surface.referenced_types().contains(&TypeName::new("a.Log$Builder")));
    }
}
