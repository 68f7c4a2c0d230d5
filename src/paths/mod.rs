//! Dot-path utilities
//!
//! Field positions are addressed as dot-separated paths (`pets.0.age`).
//! Visibility decisions ignore array indices, so `pets.0.age` and
//! `pets.age` name the same field for blacklist purposes. The helpers
//! here are shared by validation, visibility, and population.

/// Joins a path prefix and a field name with a dot.
pub fn join(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else if field.is_empty() {
        prefix.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// Removes numeric array-index segments from a path.
///
/// `pets.0.age` becomes `pets.age`; paths without indices pass through.
pub fn strip_indices(path: &str) -> String {
    let segments: Vec<&str> = path
        .split('.')
        .filter(|s| !s.is_empty() && !s.bytes().all(|b| b.is_ascii_digit()))
        .collect();
    segments.join(".")
}

/// Returns every strict ancestor of a path, shortest first.
///
/// `a.b.c` yields `["a", "a.b"]`; a single-segment path yields nothing.
pub fn ancestors(path: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            break;
        }
        if !current.is_empty() {
            current.push('.');
        }
        current.push_str(part);
        out.push(current.clone());
    }
    out
}

/// Whether `ancestor` is a strict ancestor of `path`.
pub fn is_ancestor(ancestor: &str, path: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'.'
}

/// Whether a path equals `other` or has `other` as a strict ancestor.
pub fn is_self_or_descendant(path: &str, other: &str) -> bool {
    path == other || is_ancestor(other, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join() {
        assert_eq!(join("", "name"), "name");
        assert_eq!(join("pets", "age"), "pets.age");
        assert_eq!(join("pets", ""), "pets");
    }

    #[test]
    fn test_strip_indices() {
        assert_eq!(strip_indices("pets.0.age"), "pets.age");
        assert_eq!(strip_indices("pets.12.toys.3.name"), "pets.toys.name");
        assert_eq!(strip_indices("animals.cat"), "animals.cat");
        assert_eq!(strip_indices("0"), "");
    }

    #[test]
    fn test_ancestors() {
        assert_eq!(ancestors("a.b.c"), vec!["a".to_string(), "a.b".to_string()]);
        assert!(ancestors("a").is_empty());
    }

    #[test]
    fn test_is_ancestor() {
        assert!(is_ancestor("a", "a.b"));
        assert!(is_ancestor("a.b", "a.b.c"));
        assert!(!is_ancestor("a.b", "a.b"));
        // Prefix of a longer segment name is not an ancestor.
        assert!(!is_ancestor("a", "ab.c"));
    }

    #[test]
    fn test_is_self_or_descendant() {
        assert!(is_self_or_descendant("dog", "dog"));
        assert!(is_self_or_descendant("dog.name", "dog"));
        assert!(!is_self_or_descendant("dog", "dog.name"));
    }
}
