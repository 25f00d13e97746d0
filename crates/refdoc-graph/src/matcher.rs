//! Signature matching between introspected methods and parsed declarations.
//!
//! The parser has no symbol resolution, so a written type `Foo` (or
//! `pkg.Foo`, or `Outer.Foo`) matches any structural type whose qualified
//! name ends with it. Two distinct types sharing a simple name are therefore
//! indistinguishable; the first declaration that matches wins.

use crate::surface::{MethodDescriptor, TypeName, TypeRef};
use crate::syntax::{MethodDecl, SyntaxType};

/// Find the declaration documenting `target` among `candidates`.
pub fn find_matching<'a>(
    candidates: &[&'a MethodDecl],
    target: &MethodDescriptor,
) -> Option<&'a MethodDecl> {
    candidates.iter().copied().find(|decl| {
        decl.name == target.name
            && decl.params.len() == target.params.len()
            && decl
                .params
                .iter()
                .zip(&target.params)
                .all(|(p, t)| type_matches(&p.ty, t))
    })
}

/// `decl` is named `name` and takes exactly `params`, in order.
pub fn matches_signature(decl: &MethodDecl, name: &str, params: &[&TypeName]) -> bool {
    decl.name == name
        && decl.params.len() == params.len()
        && decl.params.iter().zip(params).all(|(p, t)| {
            let resolved = TypeRef::simple(t.as_str());
            type_matches(&p.ty, &resolved)
        })
}

/// Whether a written parameter type denotes the structural one.
pub fn type_matches(written: &SyntaxType, resolved: &TypeRef) -> bool {
    match written {
        SyntaxType::Primitive(name) => resolved.is_primitive() && resolved.name.as_str() == name,
        SyntaxType::Named(name) => {
            !resolved.array && resolved.name.source_form().ends_with(name.as_str())
        }
        SyntaxType::Other(_) => false,
    }
}
