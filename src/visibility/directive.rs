//! Visibility directives
//!
//! One entry of a blacklist or override list: a dot-path, optionally
//! prefixed with `-` meaning "remove this exact path from the working
//! blacklist". Numeric array-index segments are stripped on parse;
//! `pets.0.age` and `pets.age` are the same visibility decision.

use crate::paths;

/// A parsed visibility directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Normalized dot-path (no indices, no marker)
    pub path: String,
    /// Whether this entry whitelists (removes) instead of excluding
    pub negated: bool,
}

impl Directive {
    /// Parse a raw directive string.
    pub fn parse(raw: &str) -> Self {
        let (negated, body) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        Self {
            path: paths::strip_indices(body),
            negated,
        }
    }

    /// Parse a list of raw directives, keeping order.
    pub fn parse_list<I, S>(raw: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter()
            .map(|entry| Self::parse(entry.as_ref()))
            .filter(|d| !d.path.is_empty())
            .collect()
    }

    /// Render back to directive syntax (used when re-prefixing a
    /// referenced model's entries under a field path).
    pub fn render(&self) -> String {
        if self.negated {
            format!("-{}", self.path)
        } else {
            self.path.clone()
        }
    }

    /// The same directive with its path nested under `prefix`.
    pub fn prefixed(&self, prefix: &str) -> Self {
        Self {
            path: paths::join(prefix, &self.path),
            negated: self.negated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_negated() {
        assert_eq!(
            Directive::parse("dog"),
            Directive { path: "dog".into(), negated: false }
        );
        assert_eq!(
            Directive::parse("-dog"),
            Directive { path: "dog".into(), negated: true }
        );
    }

    #[test]
    fn test_parse_strips_indices() {
        assert_eq!(Directive::parse("pets.0.age").path, "pets.age");
        assert_eq!(Directive::parse("-pets.3.name").path, "pets.name");
    }

    #[test]
    fn test_prefixed() {
        let d = Directive::parse("-password");
        let nested = d.prefixed("author");
        assert_eq!(nested.render(), "-author.password");
    }

    #[test]
    fn test_parse_list_drops_empty_entries() {
        let parsed = Directive::parse_list(["a", "", "-b"]);
        assert_eq!(parsed.len(), 2);
    }
}
