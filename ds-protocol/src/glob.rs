//! Serializable glob patterns.

use std::fmt;
use std::sync::OnceLock;

use globset::{GlobBuilder, GlobMatcher};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A list of patterns for glob matching.
///
/// Patterns are matched case-insensitively and `*` also matches path separators. Patterns are
/// compiled lazily on first use. Invalid patterns never match, but they are still serialized so
/// that a downstream consumer with a more permissive parser can use them.
#[derive(Clone, Default)]
pub struct GlobPatterns {
    patterns: Vec<String>,
    compiled: OnceLock<Vec<GlobMatcher>>,
}

impl GlobPatterns {
    /// Creates a new set of glob patterns from their string representation.
    pub fn new(patterns: Vec<String>) -> Self {
        Self {
            patterns,
            compiled: OnceLock::new(),
        }
    }

    /// Returns `true` if the list of patterns is empty.
    pub fn is_empty(&self) -> bool {
        // Check the list of patterns and not globs. Even if there are no globs to parse, we still
        // want to serialize the "invalid" patterns.
        self.patterns.is_empty()
    }

    /// Returns `true` if any of the patterns match the given message.
    pub fn is_match<S>(&self, message: S) -> bool
    where
        S: AsRef<str>,
    {
        let message = message.as_ref();
        if message.is_empty() {
            return false;
        }

        let compiled = self.compiled.get_or_init(|| {
            self.patterns
                .iter()
                .filter_map(|p| {
                    GlobBuilder::new(p)
                        .case_insensitive(true)
                        .literal_separator(false)
                        .build()
                        .ok()
                })
                .map(|glob| glob.compile_matcher())
                .collect()
        });

        compiled.iter().any(|pattern| pattern.is_match(message))
    }
}

impl fmt::Debug for GlobPatterns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.patterns.fmt(f)
    }
}

impl Serialize for GlobPatterns {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.patterns.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GlobPatterns {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let patterns = Deserialize::deserialize(deserializer)?;
        Ok(GlobPatterns::new(patterns))
    }
}

impl PartialEq for GlobPatterns {
    fn eq(&self, other: &Self) -> bool {
        self.patterns == other.patterns
    }
}
