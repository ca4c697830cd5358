//! Identifier representations used across the resolved AST.
//!
//! The frontend emits two encoded spellings: a library name as a dotted path
//! (`example.media`) and a declaration name qualified by its library
//! (`example.media/AudioRenderer`). Backends parse these into their split
//! forms once and format them per target language.

use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A single resolved name, e.g. `AudioRenderer` or `sample_rate`.
#[derive(Clone, Debug, Serialize, Deserialize, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct Identifier(pub String);

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::new(name)
    }
}

/// A library name split into its ordered path segments.
#[derive(Clone, Debug, Serialize, Deserialize, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct LibraryIdentifier(pub Vec<Identifier>);

impl LibraryIdentifier {
    pub fn segments(&self) -> &[Identifier] {
        &self.0
    }

    /// The same path with its segments reversed. Emitters close nested
    /// namespaces in the opposite order they were opened.
    pub fn reversed(&self) -> LibraryIdentifier {
        LibraryIdentifier(self.0.iter().rev().cloned().collect())
    }
}

impl fmt::Display for LibraryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("."))
    }
}

/// Dotted library name as emitted by the frontend, e.g. `example.media`.
#[derive(Clone, Debug, Serialize, Deserialize, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct EncodedLibraryIdentifier(pub String);

impl EncodedLibraryIdentifier {
    pub fn parse(&self) -> LibraryIdentifier {
        LibraryIdentifier(
            self.0
                .split('.')
                .filter(|part| !part.is_empty())
                .map(Identifier::new)
                .collect(),
        )
    }
}

impl fmt::Display for EncodedLibraryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Library-qualified declaration name as emitted by the frontend, e.g.
/// `example.media/AudioRenderer`.
#[derive(Clone, Debug, Serialize, Deserialize, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct EncodedCompoundIdentifier(pub String);

impl EncodedCompoundIdentifier {
    pub fn parse(&self) -> CompoundIdentifier {
        match self.0.split_once('/') {
            Some((library, name)) => CompoundIdentifier {
                library: EncodedLibraryIdentifier(library.to_string()).parse(),
                name: Identifier::new(name),
            },
            None => CompoundIdentifier {
                library: LibraryIdentifier(Vec::new()),
                name: Identifier::new(self.0.as_str()),
            },
        }
    }
}

impl fmt::Display for EncodedCompoundIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An [EncodedCompoundIdentifier] split into its library path and name.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct CompoundIdentifier {
    pub library: LibraryIdentifier,
    pub name: Identifier,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_compound_identifier() {
        let eci = EncodedCompoundIdentifier("example.media/AudioRenderer".to_string());
        let ci = eci.parse();
        assert_eq!(ci.library.to_string(), "example.media");
        assert_eq!(ci.name.as_str(), "AudioRenderer");
    }

    #[test]
    fn parse_compound_identifier_without_library() {
        let ci = EncodedCompoundIdentifier("Lone".to_string()).parse();
        assert!(ci.library.segments().is_empty());
        assert_eq!(ci.name.as_str(), "Lone");
    }

    #[test]
    fn reversed_library_path() {
        let library = EncodedLibraryIdentifier("example.media.audio".to_string()).parse();
        assert_eq!(library.reversed().to_string(), "audio.media.example");
    }
}
