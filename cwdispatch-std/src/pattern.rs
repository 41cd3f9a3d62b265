//! Match patterns for the source and detail-type axes.

use cwdispatch_core::RegistrationError;
use std::fmt;

const WILDCARD: char = '*';

/// An exact string, or a prefix followed by a single trailing `*`.
///
/// `"*"` alone is a prefix pattern with an empty prefix and matches
/// everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Matches one value exactly.
    Exact(String),
    /// Matches every value starting with the prefix.
    Prefix(String),
}

/// How specific a matching pattern is on one axis.
///
/// Orders as: any wildcard < exact, and among wildcards the longer prefix is
/// more specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Specificity {
    /// Matched by a wildcard with a prefix of this many bytes.
    Wildcard(usize),
    /// Matched exactly.
    Exact,
}

impl Pattern {
    /// Parse a pattern string.
    ///
    /// Fails with [`RegistrationError::InvalidPattern`] when the pattern is
    /// empty, or when `*` appears anywhere but as the final character.
    pub fn parse(pattern: &str) -> Result<Self, RegistrationError> {
        let invalid = |reason| RegistrationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        if pattern.is_empty() {
            return Err(invalid("pattern is empty"));
        }

        match pattern.find(WILDCARD) {
            None => Ok(Pattern::Exact(pattern.to_string())),
            Some(at) if at == pattern.len() - 1 => {
                Ok(Pattern::Prefix(pattern[..at].to_string()))
            }
            Some(_) => Err(invalid("`*` is only allowed once, as the last character")),
        }
    }

    /// Whether `value` matches this pattern.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Pattern::Exact(exact) => exact == value,
            Pattern::Prefix(prefix) => value.starts_with(prefix.as_str()),
        }
    }

    /// Specificity of this pattern against `value`; `None` when it does not
    /// match.
    pub fn specificity(&self, value: &str) -> Option<Specificity> {
        if !self.matches(value) {
            return None;
        }
        Some(match self {
            Pattern::Exact(_) => Specificity::Exact,
            Pattern::Prefix(prefix) => Specificity::Wildcard(prefix.len()),
        })
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Exact(exact) => f.write_str(exact),
            Pattern::Prefix(prefix) => write!(f, "{prefix}{WILDCARD}"),
        }
    }
}

impl std::str::FromStr for Pattern {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::parse(s)
    }
}
