//! Path template matching.
//!
//! # Design Decisions
//! - Exact templates compare the whole path
//! - Id templates capture exactly one trailing segment of ASCII digits
//! - A single trailing slash after the id is tolerated

use thiserror::Error;

/// Why a path was rejected by an id template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParamError {
    /// Nothing follows the template prefix.
    #[error("id segment is missing")]
    Missing,

    /// The tail is not a single run of digits, or does not fit in a u64.
    #[error("id segment is not numeric")]
    NotNumeric,

    /// More than one numeric segment could be the id.
    #[error("more than one id segment")]
    Ambiguous,
}

/// Outcome of matching a path against a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateMatch {
    /// Path does not belong to this template.
    NoMatch,
    /// Path matched; carries the captured id for id templates.
    Matched(Option<u64>),
    /// Path reached the id capture but the id is unusable.
    Rejected(ParamError),
}

/// A registered path shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathTemplate {
    /// Matches one literal path.
    Exact(String),
    /// Matches `prefix` followed by one numeric id segment.
    TrailingId { prefix: String },
}

impl PathTemplate {
    /// Template matching one literal path.
    pub fn exact(path: impl Into<String>) -> Self {
        Self::Exact(path.into())
    }

    /// Template matching `prefix` plus a trailing `{id}` segment.
    ///
    /// The prefix is normalized to end with `/`.
    pub fn trailing_id(prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self::TrailingId { prefix }
    }

    /// Whether this template captures an id.
    pub fn captures_id(&self) -> bool {
        matches!(self, Self::TrailingId { .. })
    }

    /// Match a request path.
    pub fn match_path(&self, path: &str) -> TemplateMatch {
        match self {
            Self::Exact(expected) => {
                if path == expected {
                    TemplateMatch::Matched(None)
                } else {
                    TemplateMatch::NoMatch
                }
            }
            Self::TrailingId { prefix } => match path.strip_prefix(prefix.as_str()) {
                Some(tail) => match capture_id(tail) {
                    Ok(id) => TemplateMatch::Matched(Some(id)),
                    Err(e) => TemplateMatch::Rejected(e),
                },
                // "/items" against prefix "/items/" still names the template
                None if format!("{path}/") == *prefix => {
                    TemplateMatch::Rejected(ParamError::Missing)
                }
                None => TemplateMatch::NoMatch,
            },
        }
    }
}

impl std::fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact(path) => write!(f, "{}", path),
            Self::TrailingId { prefix } => write!(f, "{}{{id}}", prefix),
        }
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn capture_id(tail: &str) -> Result<u64, ParamError> {
    let tail = tail.strip_suffix('/').unwrap_or(tail);
    if tail.is_empty() {
        return Err(ParamError::Missing);
    }

    let segments: Vec<&str> = tail.split('/').collect();
    if segments.iter().filter(|s| is_digits(s)).count() > 1 {
        return Err(ParamError::Ambiguous);
    }

    match segments.as_slice() {
        [id] if is_digits(id) => id.parse().map_err(|_| ParamError::NotNumeric),
        _ => Err(ParamError::NotNumeric),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_template() {
        let t = PathTemplate::exact("/");
        assert_eq!(t.match_path("/"), TemplateMatch::Matched(None));
        assert_eq!(t.match_path("/1"), TemplateMatch::NoMatch);
        assert_eq!(t.match_path(""), TemplateMatch::NoMatch);
    }

    #[test]
    fn id_template_captures_digits() {
        let t = PathTemplate::trailing_id("/");
        assert_eq!(t.match_path("/12"), TemplateMatch::Matched(Some(12)));
        assert_eq!(t.match_path("/007"), TemplateMatch::Matched(Some(7)));
        assert_eq!(t.match_path("/12/"), TemplateMatch::Matched(Some(12)));
    }

    #[test]
    fn id_template_rejects_bad_ids() {
        let t = PathTemplate::trailing_id("/");
        assert_eq!(t.match_path("/"), TemplateMatch::Rejected(ParamError::Missing));
        assert_eq!(t.match_path("/abc"), TemplateMatch::Rejected(ParamError::NotNumeric));
        assert_eq!(t.match_path("/12abc"), TemplateMatch::Rejected(ParamError::NotNumeric));
        assert_eq!(t.match_path("/-1"), TemplateMatch::Rejected(ParamError::NotNumeric));
        assert_eq!(t.match_path("/12/abc"), TemplateMatch::Rejected(ParamError::NotNumeric));
        assert_eq!(t.match_path("/1/2"), TemplateMatch::Rejected(ParamError::Ambiguous));
        assert_eq!(
            t.match_path("/99999999999999999999999"),
            TemplateMatch::Rejected(ParamError::NotNumeric)
        );
    }

    #[test]
    fn id_template_with_nested_prefix() {
        let t = PathTemplate::trailing_id("/products");
        assert_eq!(t.to_string(), "/products/{id}");
        assert_eq!(t.match_path("/products/3"), TemplateMatch::Matched(Some(3)));
        assert_eq!(t.match_path("/products"), TemplateMatch::Rejected(ParamError::Missing));
        assert_eq!(t.match_path("/orders/3"), TemplateMatch::NoMatch);
    }
}
