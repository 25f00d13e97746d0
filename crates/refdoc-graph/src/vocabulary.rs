//! The builder vocabulary: which well-known types define each builder shape.
//!
//! Defaults name the Hyperfoil configuration API. Every field can be
//! overridden from the `[vocabulary]` table of the configuration file.

use crate::surface::TypeName;
use serde::Deserialize;

/// External link used instead of a local section for a shared registry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryLink {
    pub factory: TypeName,
    pub link: String,
}

/// A registry listed as its own section of the reference index.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndexRegistry {
    pub title: String,
    /// File name prefix of the entry pages (`action` → `action_log.md`).
    pub prefix: String,
    pub factory: TypeName,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Vocabulary {
    pub sequence_builder: TypeName,
    pub list_builder: TypeName,
    pub mapping_list_builder: TypeName,
    pub pair_builder: TypeName,
    pub partial_builder: TypeName,
    pub registry_provider: TypeName,
    pub step_builder: TypeName,
    pub locator: TypeName,
    pub string: TypeName,
    /// Collection scaffolding base types that are never described themselves.
    pub opaque: Vec<TypeName>,
    /// A return type whose simple name ends with this is a nested builder.
    pub builder_suffix: String,
    pub step_catalog: Option<TypeName>,
    pub step_factory: Option<TypeName>,
    pub links: Vec<RegistryLink>,
    pub index: Vec<IndexRegistry>,
}

const API: &str = "io.hyperfoil.api.config";

fn api(name: &str) -> TypeName {
    TypeName::new(format!("{}.{}", API, name))
}

impl Default for Vocabulary {
    fn default() -> Self {
        let action_factory = TypeName::new("io.hyperfoil.api.session.Action$BuilderFactory");
        let processor_factory =
            TypeName::new("io.hyperfoil.api.connection.Request$ProcessorBuilderFactory");
        Self {
            sequence_builder: api("BaseSequenceBuilder"),
            list_builder: api("ListBuilder"),
            mapping_list_builder: api("MappingListBuilder"),
            pair_builder: api("PairBuilder"),
            partial_builder: api("PartialBuilder"),
            registry_provider: TypeName::new("io.hyperfoil.core.steps.ServiceLoadedBuilderProvider"),
            step_builder: api("StepBuilder"),
            locator: api("Locator"),
            string: TypeName::new("java.lang.String"),
            opaque: vec![
                api("BaseSequenceBuilder"),
                api("ListBuilder"),
                api("MappingListBuilder"),
                api("PairBuilder"),
                api("PairBuilder$OfString"),
                api("PairBuilder$OfDouble"),
                api("PartialBuilder"),
            ],
            builder_suffix: "Builder".to_string(),
            step_catalog: Some(TypeName::new("io.hyperfoil.core.builders.StepCatalog")),
            step_factory: Some(api("StepBuilder$Factory")),
            links: vec![
                RegistryLink {
                    factory: action_factory.clone(),
                    link: "index.html#actions".to_string(),
                },
                RegistryLink {
                    factory: processor_factory.clone(),
                    link: "index.html#processors".to_string(),
                },
                RegistryLink {
                    factory: TypeName::new(
                        "io.hyperfoil.api.connection.HttpRequest$ProcessorBuilderFactory",
                    ),
                    link: "index.html#processors".to_string(),
                },
            ],
            index: vec![
                IndexRegistry {
                    title: "Actions".to_string(),
                    prefix: "action".to_string(),
                    factory: action_factory,
                },
                IndexRegistry {
                    title: "Processors".to_string(),
                    prefix: "processor".to_string(),
                    factory: processor_factory,
                },
            ],
        }
    }
}

impl Vocabulary {
    pub fn is_opaque(&self, ty: &TypeName) -> bool {
        self.opaque.contains(ty)
    }

    pub fn link_for(&self, factory: &TypeName) -> Option<&str> {
        self.links
            .iter()
            .find(|l| &l.factory == factory)
            .map(|l| l.link.as_str())
    }

    pub fn is_builder_name(&self, ty: &TypeName) -> bool {
        ty.simple_name().ends_with(&self.builder_suffix)
    }
}
