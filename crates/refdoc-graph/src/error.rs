//! Error types for the graph engine.
//!
//! Missing sources and unmatched declarations are not errors: they degrade to
//! partial documentation. Only a broken assumption about the builder
//! vocabulary aborts a run.

/// Errors produced while building the documentation graph.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input does not follow the builder vocabulary the classifier
    /// relies on (e.g. a partial builder without `withKey(String)`).
    #[error("invariant violated for {owner}: {message}")]
    Invariant { owner: String, message: String },

    /// A type reference string in the surface could not be parsed.
    #[error("invalid type reference `{input}`: {message}")]
    TypeRef { input: String, message: String },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invariant violation for the given owner type.
    pub fn invariant(owner: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::Invariant {
            owner: owner.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn type_ref(input: &str, message: impl Into<String>) -> Self {
        Self::TypeRef {
            input: input.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_display() {
        let err = Error::invariant("a.Foo", "missing withKey(String)");
        assert_eq!(
            err.to_string(),
            "invariant violated for a.Foo: missing withKey(String)"
        );
    }
}
