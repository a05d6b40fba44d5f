//! Citation attribution engine.
//!
//! Decides whether a citing work shares an author with the publication it
//! cites. Author strings arrive in whatever shape the source printed them
//! ("Smith, J., and Doe, A.", "J Smith, A Doe…", "John Smith"), so each name is
//! first reduced to a canonical `lastname,firstmiddle` token:
//!
//! - [`get_normalized_authors`]: split a full author string into names and
//!   normalize each one, dropping truncation markers and unparseable pieces
//! - [`normalize_author`]: normalize a single name
//! - [`classify`] / [`CitationClassifier`]: compare two token lists under a
//!   [`ClassificationPolicy`]
//!
//! Everything here is a pure function over strings: no I/O, and no input can
//! make these functions fail.
//!
//! ```rust
//! use scholar_selfcite::attribution::{classify, get_normalized_authors, ClassificationPolicy};
//!
//! let original = get_normalized_authors("Smith, J., and Doe, A.");
//! let citing = get_normalized_authors("A Doe, K Lee");
//! assert!(classify(&original, &citing, ClassificationPolicy::AnyAuthorOverlap));
//! ```

mod classify;
mod normalize;

pub use classify::{classify, CitationClassifier, ClassificationPolicy, ParsePolicyError};
pub use normalize::{get_normalized_authors, normalize_author, segment_authors};
