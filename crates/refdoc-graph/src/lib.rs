//! Documentation graph engine for fluent builder APIs.
//!
//! Given the structural surface of an API (types, methods, plugin
//! registries) and the parsed declarations carrying its doc comments, this
//! crate builds a deduplicated graph of documented configuration properties
//! and flattens it into named sections for rendering.

pub mod classify;
pub mod docs;
pub mod error;
pub mod flatten;
pub mod graph;
pub mod matcher;
pub mod reference;
pub mod surface;
pub mod syntax;
pub mod text;
pub mod vocabulary;

pub use docs::{Alternative, Docs, DocsArena, DocsId, EnumOption, Param, Params};
pub use error::{Error, Result};
pub use flatten::{flatten, Flattened, Section};
pub use graph::GraphBuilder;
pub use reference::{Entry, IndexSection, Reference};
pub use surface::{Surface, TypeName};
pub use syntax::SourceSet;
pub use vocabulary::Vocabulary;
