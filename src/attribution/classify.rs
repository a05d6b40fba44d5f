//! Self-citation decision rule.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::models::{AuthorList, CitationRecord, CitingWork, Publication};

/// Which authors of the original publication count toward a self-citation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationPolicy {
    /// Any shared author makes the citation a self-citation
    #[default]
    #[serde(alias = "any")]
    AnyAuthorOverlap,
    /// Only the last-listed author of the original publication is checked
    #[serde(alias = "last")]
    LastAuthorOnly,
}

impl ClassificationPolicy {
    pub fn id(&self) -> &'static str {
        match self {
            ClassificationPolicy::AnyAuthorOverlap => "any_author_overlap",
            ClassificationPolicy::LastAuthorOnly => "last_author_only",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ClassificationPolicy::AnyAuthorOverlap => "any shared author",
            ClassificationPolicy::LastAuthorOnly => "last author of the original",
        }
    }
}

impl fmt::Display for ClassificationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown classification policy: {0} (expected \"any\" or \"last\")")]
pub struct ParsePolicyError(String);

impl FromStr for ClassificationPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "any" | "any_author_overlap" => Ok(ClassificationPolicy::AnyAuthorOverlap),
            "last" | "last_author_only" => Ok(ClassificationPolicy::LastAuthorOnly),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

/// Decide whether `citing` is a self-citation of `original`.
///
/// An empty list on either side is never a self-citation. Tokens are compared
/// by exact equality.
pub fn classify(original: &AuthorList, citing: &AuthorList, policy: ClassificationPolicy) -> bool {
    if original.is_empty() || citing.is_empty() {
        return false;
    }

    let citing_set = citing.as_set();
    match policy {
        ClassificationPolicy::AnyAuthorOverlap => {
            original.iter().any(|author| citing_set.contains(author))
        }
        ClassificationPolicy::LastAuthorOnly => original
            .last()
            .is_some_and(|last| citing_set.contains(last)),
    }
}

/// Classifier bound to the policy chosen for a run
#[derive(Debug, Clone, Copy, Default)]
pub struct CitationClassifier {
    policy: ClassificationPolicy,
}

impl CitationClassifier {
    pub fn new(policy: ClassificationPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ClassificationPolicy {
        self.policy
    }

    pub fn is_self_citation(&self, original: &AuthorList, citing: &AuthorList) -> bool {
        classify(original, citing, self.policy)
    }

    /// Classify one citing work of `publication` into a record
    pub fn record(&self, publication: &Arc<Publication>, citing: CitingWork) -> CitationRecord {
        let is_self_citation = self.is_self_citation(&publication.authors, &citing.authors);
        tracing::trace!(
            original = %publication.title,
            citing = %citing.title,
            is_self_citation,
            "Classified citation"
        );
        CitationRecord {
            publication: Arc::clone(publication),
            citing,
            is_self_citation,
        }
    }
}
