//! Flavor-agnostic helpers shared by the `relpath`, `dirent`, and `uri`
//! modules. Each path flavor has its own notion of "root" and "absolute",
//! but once a caller supplies those, ancestor/skip/longest-ancestor all
//! reduce to the same byte-level algorithm. Keeping that algorithm in one
//! place means the three flavors can't silently drift apart on an edge
//! case like `is_ancestor("/", "/foo")`.

/// True if `child` is `parent` or lies strictly below it, given both are
/// already in canonical form for their flavor. Works for any flavor because
/// canonical roots (`""`, `"/"`, `"C:"`, `"//host/share"`, `"scheme://host"`)
/// all happen to satisfy: either they end in `/` (so a following segment
/// needs no extra separator) or they don't (so a following segment needs
/// one). Callers are responsible for the flavor-specific rule that an empty
/// parent is never an ancestor of an absolute child.
pub(crate) fn is_ancestor_str(parent: &str, child: &str) -> bool {
    if parent == child {
        return true;
    }
    if !child.starts_with(parent) {
        return false;
    }
    let rest = &child[parent.len()..];
    if parent.ends_with('/') {
        !rest.is_empty()
    } else {
        rest.starts_with('/')
    }
}

/// If `parent` is an ancestor of `child`, the suffix with the separator
/// removed; otherwise `None`. Shares the same root-agnostic reasoning as
/// [`is_ancestor_str`].
pub(crate) fn skip_ancestor_str<'a>(parent: &str, child: &'a str) -> Option<&'a str> {
    if parent == child {
        return Some("");
    }
    if !child.starts_with(parent) {
        return None;
    }
    let rest = &child[parent.len()..];
    if parent.ends_with('/') {
        if rest.is_empty() {
            None
        } else {
            Some(rest)
        }
    } else if let Some(stripped) = rest.strip_prefix('/') {
        Some(stripped)
    } else {
        None
    }
}

/// Walks `a` up through `dirname` until it becomes an ancestor of `b`
/// (every string is trivially its own ancestor, and `dirname` is idempotent
/// at the root, so this always terminates). Returns `""` if no non-trivial
/// common ancestor exists and `a` itself isn't one either.
pub(crate) fn longest_ancestor_str<'a>(
    a: &'a str,
    b: &'a str,
    dirname: impl Fn(&'a str) -> &'a str,
    is_ancestor: impl Fn(&str, &str) -> bool,
) -> &'a str {
    let mut candidate = a;
    loop {
        if is_ancestor(candidate, b) {
            return candidate;
        }
        let parent = dirname(candidate);
        if parent == candidate {
            return "";
        }
        candidate = parent;
    }
}

/// Shared `dirname`/`basename` given the length of a flavor's root prefix
/// (`0` for a non-rooted path; e.g. `1` for POSIX `"/foo"`, `2` for DOS
/// drive-relative `"C:foo"`, `3` for DOS drive-rooted `"C:/foo"`, or the
/// full length of a bare UNC root for `"//host/share/foo"`). Works the same
/// way across flavors: everything past the root prefix is ordinary
/// `/`-separated segments.
pub(crate) fn dirname_with_root_len(s: &str, root_len: usize) -> &str {
    let remainder = &s[root_len..];
    match remainder.rfind('/') {
        None => &s[..root_len],
        Some(i) => &s[..root_len + i],
    }
}

pub(crate) fn basename_with_root_len(s: &str, root_len: usize) -> &str {
    let remainder = &s[root_len..];
    match remainder.rfind('/') {
        None => remainder,
        Some(i) => &remainder[i + 1..],
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ancestor_root() {
        assert!(is_ancestor_str("/", "/foo"));
        assert!(is_ancestor_str("/", "/"));
        assert!(!is_ancestor_str("/", "foo"));
    }

    #[test]
    fn ancestor_non_root() {
        assert!(is_ancestor_str("/foo", "/foo/bar"));
        assert!(!is_ancestor_str("/foo", "/foobar"));
        assert!(is_ancestor_str("/foo", "/foo"));
    }

    #[test]
    fn skip_ancestor_cases() {
        assert_eq!(skip_ancestor_str("/foo", "/foo/bar"), Some("bar"));
        assert_eq!(skip_ancestor_str("/", "/foo"), Some("foo"));
        assert_eq!(skip_ancestor_str("/foo", "/foo"), Some(""));
        assert_eq!(skip_ancestor_str("/foo", "/foobar"), None);
    }
}
