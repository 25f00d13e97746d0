//! Configuration for refdoc.
//!
//! Optional `refdoc.toml`, given with `--config` or found in the current
//! directory. CLI flags override config file values, which override defaults.

use anyhow::{Context, Result};
use refdoc_graph::Vocabulary;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "refdoc.toml";

pub const DEFAULT_TITLE: &str = "Hyperfoil";
pub const DEFAULT_FORMAT: &str = "markdown";

/// Top-level config, deserialized from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Product name used in the index heading.
    pub title: Option<String>,
    /// Output format: markdown (default) or json.
    pub format: Option<String>,
    /// `[vocabulary]` section; unset keys keep the built-in names.
    pub vocabulary: Vocabulary,
}

impl Config {
    /// Load the explicit config file, or `refdoc.toml` in the current
    /// directory when present, or the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let candidate = Path::new(CONFIG_FILE_NAME);
                if candidate.is_file() {
                    Self::from_file(candidate)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config file: {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdoc_graph::TypeName;

    #[test]
    fn empty_config_keeps_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.title, None);
        let defaults = Vocabulary::default();
        assert_eq!(config.vocabulary.step_builder, defaults.step_builder);
        assert_eq!(config.vocabulary.index.len(), 2);
    }

    #[test]
    fn vocabulary_overrides() {
        let config = Config::parse(
            r#"
title = "Acme"
format = "json"

[vocabulary]
step_builder = "com.acme.StepBuilder"
builder_suffix = "Spec"
opaque = []

[[vocabulary.links]]
factory = "com.acme.Action$Factory"
link = "index.html#actions"

[[vocabulary.index]]
title = "Actions"
prefix = "action"
factory = "com.acme.Action$Factory"
"#,
        )
        .unwrap();
        assert_eq!(config.title.as_deref(), Some("Acme"));
        assert_eq!(config.format.as_deref(), Some("json"));
        let vocabulary = &config.vocabulary;
        assert_eq!(vocabulary.step_builder, TypeName::new("com.acme.StepBuilder"));
        assert!(vocabulary.is_builder_name(&TypeName::new("com.acme.HttpSpec")));
        assert!(vocabulary.opaque.is_empty());
        assert_eq!(
            vocabulary.link_for(&TypeName::new("com.acme.Action$Factory")),
            Some("index.html#actions")
        );
        assert_eq!(vocabulary.index.len(), 1);
        // untouched keys keep their defaults
        assert_eq!(vocabulary.locator, Vocabulary::default().locator);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("titel = \"typo\"").is_err());
        assert!(Config::parse("[vocabulary]\nstep_buildr = \"a.Step\"").is_err());
        assert!(Config::parse(
            "[[vocabulary.index]]\ntitle = \"Actions\"\nprefix = \"action\"\nfactory = \"a.F\"\nlnk = \"x\""
        )
        .is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/refdoc.toml"))).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }
}
