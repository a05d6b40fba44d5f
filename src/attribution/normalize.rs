//! Author-name normalization.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{AuthorList, NormalizedAuthor};

/// Truncation marker used when a source cuts an author list short.
const ELLIPSIS: &str = "...";

/// Single-character form of the truncation marker (Google Scholar uses this one).
const UNICODE_ELLIPSIS: char = '…';

/// Placeholder some sources emit for a missing author string.
const MISSING_SENTINEL: &str = "n/a";

static AND_SEPARATOR: OnceLock<Regex> = OnceLock::new();
static INITIALS_TOKEN: OnceLock<Regex> = OnceLock::new();
static COMPACT_INITIALS: OnceLock<Regex> = OnceLock::new();

/// Matches `", and "`, `" and "` and `" & "` as whole words, plus a
/// leading `"and "` at the start of the string.
fn and_separator() -> &'static Regex {
    AND_SEPARATOR.get_or_init(|| {
        Regex::new(r"(?i)(?:^|,?\s+)(?:and|&)\s+").expect("and-separator pattern is valid")
    })
}

/// A lone letter, or letters each followed by a period (`J.`, `A.B.`, `J.-P.`).
fn initials_token() -> &'static Regex {
    INITIALS_TOKEN.get_or_init(|| {
        Regex::new(r"^(?:\p{L}|(?:\p{L}\.-?)+)$").expect("initials pattern is valid")
    })
}

/// Two or three capitals without periods (`JA`, `ABC`).
fn compact_initials() -> &'static Regex {
    COMPACT_INITIALS
        .get_or_init(|| Regex::new(r"^\p{Lu}{2,3}$").expect("compact initials pattern is valid"))
}

fn is_footnote_marker(c: char) -> bool {
    c == '*' || c == '.' || c.is_ascii_digit() || c.is_whitespace()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize one author name into a `lastname,firstmiddle` token.
///
/// Returns `None` for empty input, truncation markers and anything that
/// leaves no surname once footnote markers are trimmed.
///
/// ```rust
/// use scholar_selfcite::attribution::normalize_author;
///
/// assert_eq!(normalize_author("Smith, J.A.").unwrap().as_str(), "smith,ja");
/// assert_eq!(normalize_author("John Smith").unwrap().as_str(), "smith,john");
/// assert_eq!(normalize_author("Smith").unwrap().as_str(), "smith,");
/// assert!(normalize_author("...").is_none());
/// ```
pub fn normalize_author(raw: &str) -> Option<NormalizedAuthor> {
    let lowered = raw.to_lowercase();
    let mut cleaned = lowered.trim().trim_end_matches(is_footnote_marker);

    // "A Doe…": the ellipsis is glued to the last visible name
    if cleaned.ends_with(UNICODE_ELLIPSIS) {
        cleaned = cleaned
            .trim_end_matches(UNICODE_ELLIPSIS)
            .trim_end_matches(is_footnote_marker);
    }

    if cleaned.is_empty() || cleaned == ELLIPSIS {
        return None;
    }

    let (last, first_middle) = match cleaned.split_once(',') {
        Some((last, rest)) if !last.trim().is_empty() => {
            (collapse_whitespace(last), collapse_whitespace(&rest.replace('.', "")))
        }
        Some((_, rest)) => split_bare_name(rest)?,
        None => split_bare_name(cleaned)?,
    };

    if last.is_empty() {
        return None;
    }

    Some(NormalizedAuthor::from_parts(&last, &first_middle))
}

/// "First Middle Last" without a comma: the final word is the surname.
fn split_bare_name(name: &str) -> Option<(String, String)> {
    let mut words: Vec<&str> = name.split_whitespace().collect();
    let last = words.pop()?;

    let first_middle = words
        .iter()
        .map(|word| word.replace('.', ""))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Some((last.to_string(), first_middle))
}

fn all_tokens(piece: &str, accept: impl Fn(&str) -> bool) -> bool {
    let mut tokens = piece.split_whitespace().peekable();
    tokens.peek().is_some() && tokens.all(accept)
}

/// Dotted or lone-letter initials only.
fn is_dotted_initials(piece: &str) -> bool {
    all_tokens(piece, |token| initials_token().is_match(token))
}

/// Also accepts period-less capitals, so the check must see the original case.
fn is_initials(piece: &str) -> bool {
    all_tokens(piece, |token| {
        initials_token().is_match(token) || compact_initials().is_match(token)
    })
}

fn is_missing(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(MISSING_SENTINEL)
}

fn is_single_word(piece: &str) -> bool {
    piece.split_whitespace().count() == 1
}

/// Split a full author string into per-name segments.
///
/// "and"/"&" separators are first rewritten to commas, then the string is
/// split on every comma. A comma cannot tell "Last, First" apart from a list
/// separator, so a piece made only of initials is re-attached to a preceding
/// one-word piece (`"Smith", "J."` becomes `"Smith, J."`). Initials may be
/// dotted (`J.A.`) or two or three bare capitals (`JA`). Given names written
/// out in full after a comma are not recovered.
///
/// `"N/A"` and blank strings give no segments.
pub fn segment_authors(raw: &str) -> Vec<String> {
    if is_missing(raw) {
        return Vec::new();
    }

    let unified = and_separator().replace_all(raw, ", ");

    let mut segments: Vec<String> = Vec::new();
    let mut paired: Vec<bool> = Vec::new();

    for piece in unified.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if is_initials(piece) {
            if let (Some(prev), Some(prev_paired)) = (segments.last_mut(), paired.last_mut()) {
                if !*prev_paired && is_single_word(prev) && !is_dotted_initials(prev) {
                    prev.push_str(", ");
                    prev.push_str(piece);
                    *prev_paired = true;
                    continue;
                }
            }
        }
        segments.push(piece.to_string());
        paired.push(false);
    }

    segments
}

/// Normalize every name in a full author string, keeping source order.
///
/// `"N/A"` and blank strings give an empty list. Segments that do not
/// normalize are dropped, not replaced.
///
/// ```rust
/// use scholar_selfcite::attribution::get_normalized_authors;
///
/// let authors = get_normalized_authors("Smith, J., and Doe, A.");
/// assert_eq!(authors.tokens(), vec!["smith,j", "doe,a"]);
/// assert!(get_normalized_authors("N/A").is_empty());
/// ```
pub fn get_normalized_authors(raw: &str) -> AuthorList {
    if is_missing(raw) {
        return AuthorList::default();
    }

    segment_authors(raw.trim())
        .iter()
        .filter_map(|segment| {
            let normalized = normalize_author(segment);
            if normalized.is_none() {
                tracing::debug!(segment = %segment, "Dropping unparseable author segment");
            }
            normalized
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(raw: &str) -> Option<String> {
        normalize_author(raw).map(|a| a.as_str().to_string())
    }

    fn tokens(raw: &str) -> Vec<String> {
        get_normalized_authors(raw)
            .iter()
            .map(|a| a.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_last_comma_first_with_initials() {
        assert_eq!(token("Smith, J.A."), Some("smith,ja".to_string()));
        assert_eq!(token("Smith, J. A."), Some("smith,j a".to_string()));
        assert_eq!(token("  SMITH ,   John   Paul "), Some("smith,john paul".to_string()));
    }

    #[test]
    fn test_first_last_without_comma() {
        assert_eq!(token("John Smith"), Some("smith,john".to_string()));
        assert_eq!(token("J. A. Smith"), Some("smith,j a".to_string()));
        assert_eq!(token("JA Smith"), Some("smith,ja".to_string()));
    }

    #[test]
    fn test_surname_only_keeps_trailing_comma() {
        assert_eq!(token("Smith"), Some("smith,".to_string()));
        assert_eq!(token("Smith,"), Some("smith,".to_string()));
    }

    #[test]
    fn test_leading_comma_treated_as_bare_name() {
        assert_eq!(token(", John Smith"), Some("smith,john".to_string()));
        assert_eq!(token(", Smith"), Some("smith,".to_string()));
        assert_eq!(token(","), None);
    }

    #[test]
    fn test_footnote_markers_trimmed() {
        assert_eq!(token("John Smith*"), Some("smith,john".to_string()));
        assert_eq!(token("John Smith 12"), Some("smith,john".to_string()));
        assert_eq!(token("Doe, A.1*"), Some("doe,a".to_string()));
    }

    #[test]
    fn test_unparseable_segments_are_absent() {
        assert_eq!(token("..."), None);
        assert_eq!(token("*"), None);
        assert_eq!(token("123"), None);
        assert_eq!(token(""), None);
        assert_eq!(token("   "), None);
        assert_eq!(token("…"), None);
    }

    #[test]
    fn test_glued_unicode_ellipsis() {
        assert_eq!(token("A Doe…"), Some("doe,a".to_string()));
    }

    #[test]
    fn test_segment_authors_pairs_initials() {
        assert_eq!(
            segment_authors("Smith, J., and Doe, A."),
            vec!["Smith, J.".to_string(), "Doe, A.".to_string()]
        );
        assert_eq!(
            segment_authors("Martin, J.-P. & Doe, A.B."),
            vec!["Martin, J.-P.".to_string(), "Doe, A.B.".to_string()]
        );
    }

    #[test]
    fn test_segment_authors_does_not_split_inside_words() {
        assert_eq!(
            segment_authors("K Anderson and R Sandoval"),
            vec!["K Anderson".to_string(), "R Sandoval".to_string()]
        );
    }

    #[test]
    fn test_segment_authors_full_given_names_stay_split() {
        // Accepted approximation: a spelled-out given name after a comma reads as its own author
        assert_eq!(
            tokens("Smith, John, Doe, Jane"),
            vec!["smith,", "john,", "doe,", "jane,"]
        );
    }

    #[test]
    fn test_segment_authors_pairs_initials_without_periods() {
        assert_eq!(
            segment_authors("Smith, JA, and Doe, AB"),
            vec!["Smith, JA".to_string(), "Doe, AB".to_string()]
        );
        assert_eq!(tokens("Smith, JA, and Doe, AB"), vec!["smith,ja", "doe,ab"]);
        assert_eq!(tokens("LEE, K, Smith, J"), vec!["lee,k", "smith,j"]);
    }

    #[test]
    fn test_leading_and_is_a_separator() {
        assert_eq!(segment_authors("and K Lee"), vec!["K Lee".to_string()]);
        assert_eq!(tokens("and K Lee"), vec!["lee,k"]);
        assert_eq!(tokens("& K Lee, S Patel"), vec!["lee,k", "patel,s"]);
        assert_eq!(tokens("Anderson, K"), vec!["anderson,k"]);
    }

    #[test]
    fn test_segment_authors_missing_string() {
        assert!(segment_authors("N/A").is_empty());
        assert!(segment_authors(" n/a ").is_empty());
        assert!(segment_authors("").is_empty());
    }

    #[test]
    fn test_get_normalized_authors_order_preserved() {
        assert_eq!(tokens("Smith, J., and Doe, A."), vec!["smith,j", "doe,a"]);
        assert_eq!(
            tokens("K Lee, S Patel and T Nguyen"),
            vec!["lee,k", "patel,s", "nguyen,t"]
        );
    }

    #[test]
    fn test_get_normalized_authors_drops_truncation() {
        assert_eq!(tokens("J Smith, A Doe, ..."), vec!["smith,j", "doe,a"]);
        assert_eq!(tokens("J Smith, A Doe…"), vec!["smith,j", "doe,a"]);
        assert_eq!(tokens("J Smith, *, 3"), vec!["smith,j"]);
    }

    #[test]
    fn test_get_normalized_authors_keeps_duplicates() {
        assert_eq!(tokens("J Smith, J Smith"), vec!["smith,j", "smith,j"]);
    }

    #[test]
    fn test_missing_author_string() {
        assert!(get_normalized_authors("N/A").is_empty());
        assert!(get_normalized_authors("n/a").is_empty());
        assert!(get_normalized_authors("").is_empty());
        assert!(get_normalized_authors("  ,  , ").is_empty());
    }

    #[test]
    fn test_never_panics_on_odd_input() {
        for raw in ["&", "and", ", and ,", "…, …", "ß, ü", "\u{0}", ",,,", "a,b,c,d"] {
            let _ = get_normalized_authors(raw);
            let _ = normalize_author(raw);
        }
    }
}
