//! Canonical author tokens and ordered author lists.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Canonical `lastname,firstmiddle` token used for author equality.
///
/// Tokens are produced by [`crate::attribution::normalize_author`]; two tokens
/// name the same person only when their strings are identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedAuthor(String);

impl NormalizedAuthor {
    /// Assemble a token from an already-cleaned last name and first/middle part.
    pub(crate) fn from_parts(last: &str, first_middle: &str) -> Self {
        Self(format!("{},{}", last, first_middle))
    }

    /// Wrap a string that is already in canonical form (e.g. read back from an export).
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The full canonical token
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Surname part of the token
    pub fn last_name(&self) -> &str {
        self.0.split_once(',').map(|(last, _)| last).unwrap_or(&self.0)
    }

    /// First and middle names, empty when only a surname was known
    pub fn first_middle(&self) -> &str {
        self.0.split_once(',').map(|(_, first)| first).unwrap_or("")
    }
}

impl fmt::Display for NormalizedAuthor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedAuthor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered list of normalized authors.
///
/// Order is preserved from the source string and duplicates are kept; only the
/// last-author policy looks at position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthorList(Vec<NormalizedAuthor>);

impl AuthorList {
    pub fn new(authors: Vec<NormalizedAuthor>) -> Self {
        Self(authors)
    }

    /// Build a list from canonical tokens
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(tokens.into_iter().map(NormalizedAuthor::from_token).collect())
    }

    /// Parse a list previously rendered with [`AuthorList::joined`]
    pub fn from_joined(joined: &str) -> Self {
        Self::from_tokens(
            joined
                .split(';')
                .map(str::trim)
                .filter(|token| !token.is_empty()),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedAuthor> {
        self.0.iter()
    }

    /// The last-listed author
    pub fn last(&self) -> Option<&NormalizedAuthor> {
        self.0.last()
    }

    /// Borrowed set view for intersection tests
    pub fn as_set(&self) -> HashSet<&NormalizedAuthor> {
        self.0.iter().collect()
    }

    /// Token strings in order
    pub fn tokens(&self) -> Vec<&str> {
        self.0.iter().map(NormalizedAuthor::as_str).collect()
    }

    /// Tokens joined by `"; "` (export format)
    pub fn joined(&self) -> String {
        self.tokens().join("; ")
    }
}

impl FromIterator<NormalizedAuthor> for AuthorList {
    fn from_iter<T: IntoIterator<Item = NormalizedAuthor>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a AuthorList {
    type Item = &'a NormalizedAuthor;
    type IntoIter = std::slice::Iter<'a, NormalizedAuthor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for AuthorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}
