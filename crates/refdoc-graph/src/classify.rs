//! Builder shape classification of a method's return type.

use crate::surface::{MethodDescriptor, Surface, TypeName};
use crate::vocabulary::Vocabulary;
use regex::Regex;
use std::sync::LazyLock;

/// Scope-closing methods that climb back to a parent builder.
static RE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^end(\p{Lu}.*)?$").unwrap());

pub(crate) const ACCEPT: &str = "accept";
pub(crate) const WITH_KEY: &str = "withKey";
pub(crate) const NEXT_ITEM: &str = "nextItem";
pub(crate) const ADD_ITEM: &str = "addItem";
pub(crate) const COPY: &str = "copy";
pub(crate) const NEW_BUILDER: &str = "newBuilder";

/// Shape categories, declared in evaluation priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    /// Returns its own builder: a scalar property.
    SelfReturn,
    /// Accepts arbitrary key → value pairs.
    Pair,
    /// Selects a nested builder by string key.
    Partial,
    /// A list of steps, documented elsewhere.
    Sequence,
    StringList,
    MappingList,
    /// Values chosen among registered plugin implementations.
    Registry,
    /// Any other builder.
    Nested,
}

/// Categories of `method` declared on `owner`, in priority order.
///
/// A self-returning method is only ever a scalar property; every other
/// method collects all categories its return type satisfies.
pub fn classify(
    surface: &Surface,
    vocabulary: &Vocabulary,
    owner: &TypeName,
    method: &MethodDescriptor,
) -> Vec<Category> {
    let returns = &method.returns.name;
    if surface.is_subtype(owner, returns) {
        return vec![Category::SelfReturn];
    }

    let checks = [
        (Category::Pair, surface.is_subtype(returns, &vocabulary.pair_builder)),
        (Category::Partial, surface.is_subtype(returns, &vocabulary.partial_builder)),
        (Category::Sequence, surface.is_subtype(returns, &vocabulary.sequence_builder)),
        (Category::StringList, surface.is_subtype(returns, &vocabulary.list_builder)),
        (Category::MappingList, surface.is_subtype(returns, &vocabulary.mapping_list_builder)),
        (Category::Registry, surface.is_subtype(returns, &vocabulary.registry_provider)),
        (Category::Nested, vocabulary.is_builder_name(returns)),
    ];
    checks
        .into_iter()
        .filter_map(|(category, applies)| applies.then_some(category))
        .collect()
}

/// Whether the method is plumbing that never documents a property.
pub fn is_excluded(
    surface: &Surface,
    vocabulary: &Vocabulary,
    owner: &TypeName,
    method: &MethodDescriptor,
) -> bool {
    let name = method.name.as_str();
    let arity = method.params.len();
    if method.is_static || method.is_default || method.is_synthetic {
        return true;
    }
    if is_scope_end(name) {
        return true;
    }
    let owner_is = |base: &TypeName| surface.is_subtype(owner, base);
    match (name, arity) {
        (ACCEPT, 2) if owner_is(&vocabulary.pair_builder) => true,
        (WITH_KEY, 1) if owner_is(&vocabulary.partial_builder) => true,
        (NEXT_ITEM, 1) if owner_is(&vocabulary.list_builder) => true,
        (ADD_ITEM, 0) if owner_is(&vocabulary.mapping_list_builder) => true,
        (COPY, 1) => method.params[0].name == vocabulary.locator,
        _ => false,
    }
}

/// `end`, `endStep`, `endSequence`… but not `endless`.
pub fn is_scope_end(name: &str) -> bool {
    RE_END.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{TypeDescriptor, TypeKind};

    fn vocabulary() -> Vocabulary {
        Vocabulary {
            sequence_builder: "api.BaseSequenceBuilder".into(),
            list_builder: "api.ListBuilder".into(),
            mapping_list_builder: "api.MappingListBuilder".into(),
            pair_builder: "api.PairBuilder".into(),
            partial_builder: "api.PartialBuilder".into(),
            registry_provider: "api.Provider".into(),
            step_builder: "api.StepBuilder".into(),
            locator: "api.Locator".into(),
            ..Vocabulary::default()
        }
    }

    fn class(name: &str, interfaces: &[&str]) -> TypeDescriptor {
        TypeDescriptor {
            name: name.into(),
            kind: TypeKind::Class,
            superclass: None,
            interfaces: interfaces.iter().map(|i| TypeName::new(*i)).collect(),
            methods: Vec::new(),
        }
    }

    fn method(name: &str, params: &[&str], returns: &str) -> MethodDescriptor {
        MethodDescriptor::new(name, params, returns).unwrap()
    }

    fn surface() -> Surface {
        Surface::new(
            vec![
                class("a.HttpBuilder", &[]),
                class("a.HeadersBuilder", &["api.PairBuilder"]),
                class("a.SequenceBuilder", &["api.BaseSequenceBuilder"]),
                class("a.Names", &["api.ListBuilder"]),
                class("a.Mappings", &["api.MappingListBuilder"]),
                class("a.Provider", &["api.Provider"]),
                class("a.Cache", &["api.Locator"]),
            ],
            vec![],
        )
    }

    #[test]
    fn self_return_wins_over_nested() {
        let owner = TypeName::new("a.HttpBuilder");
        let m = method("sync", &["boolean"], "a.HttpBuilder");
        assert_eq!(
            classify(&surface(), &vocabulary(), &owner, &m),
            vec![Category::SelfReturn]
        );
    }

    #[test]
    fn supertype_return_is_self_return() {
        let owner = TypeName::new("a.HeadersBuilder");
        let m = method("clear", &[], "api.PairBuilder");
        assert_eq!(
            classify(&surface(), &vocabulary(), &owner, &m),
            vec![Category::SelfReturn]
        );
    }

    #[test]
    fn pair_builder_is_also_nested() {
        let owner = TypeName::new("a.HttpBuilder");
        let m = method("headers", &[], "a.HeadersBuilder");
        assert_eq!(
            classify(&surface(), &vocabulary(), &owner, &m),
            vec![Category::Pair, Category::Nested]
        );
    }

    #[test]
    fn sequence_list_and_registry() {
        let s = surface();
        let v = vocabulary();
        let owner = TypeName::new("a.HttpBuilder");
        assert_eq!(
            classify(&s, &v, &owner, &method("steps", &[], "a.SequenceBuilder")),
            vec![Category::Sequence, Category::Nested]
        );
        assert_eq!(
            classify(&s, &v, &owner, &method("names", &[], "a.Names")),
            vec![Category::StringList]
        );
        assert_eq!(
            classify(&s, &v, &owner, &method("handler", &[], "a.Provider<a.X, a.X$Factory>")),
            vec![Category::Registry]
        );
    }

    #[test]
    fn scalar_non_builder_has_no_category() {
        let owner = TypeName::new("a.HttpBuilder");
        let m = method("build", &[], "a.Http");
        assert!(classify(&surface(), &vocabulary(), &owner, &m).is_empty());
    }

    #[test]
    fn end_methods_are_excluded() {
        assert!(is_scope_end("end"));
        assert!(is_scope_end("endFoo"));
        assert!(is_scope_end("endSequence"));
        assert!(!is_scope_end("endless"));
        assert!(!is_scope_end("append"));

        let s = surface();
        let v = vocabulary();
        let owner = TypeName::new("a.HttpBuilder");
        assert!(is_excluded(&s, &v, &owner, &method("endStep", &[], "a.HttpBuilder")));
        assert!(!is_excluded(&s, &v, &owner, &method("endless", &[], "a.HttpBuilder")));
    }

    #[test]
    fn shape_accessors_are_excluded_only_on_their_shape() {
        let s = surface();
        let v = vocabulary();
        let headers = TypeName::new("a.HeadersBuilder");
        let http = TypeName::new("a.HttpBuilder");
        let accept = method("accept", &["java.lang.String", "java.lang.String"], "void");
        assert!(is_excluded(&s, &v, &headers, &accept));
        assert!(!is_excluded(&s, &v, &http, &accept));

        let names = TypeName::new("a.Names");
        let next_item = method("nextItem", &["java.lang.String"], "a.Names");
        assert!(is_excluded(&s, &v, &names, &next_item));
        assert!(!is_excluded(&s, &v, &http, &next_item));

        let mappings = TypeName::new("a.Mappings");
        let add_item = method("addItem", &[], "a.Header");
        assert!(is_excluded(&s, &v, &mappings, &add_item));
        assert!(!is_excluded(&s, &v, &http, &add_item));
    }

    #[test]
    fn copy_with_locator_is_excluded() {
        let s = surface();
        let v = vocabulary();
        let owner = TypeName::new("a.HttpBuilder");
        assert!(is_excluded(&s, &v, &owner, &method("copy", &["api.Locator"], "a.HttpBuilder")));
        assert!(!is_excluded(&s, &v, &owner, &method("copy", &["a.Cache"], "a.HttpBuilder")));
    }

    #[test]
    fn static_methods_are_excluded() {
        let mut m = method("create", &[], "a.HttpBuilder");
        m.is_static = true;
        assert!(is_excluded(&surface(), &vocabulary(), &TypeName::new("a.HttpBuilder"), &m));
    }
}
