//! Repository-relative paths: slash-separated, no root, platform-invariant.
//!
//! Canonical form (spec §3): no leading `/`, no trailing `/`, no empty
//! segments, no `.` segments, non-empty unless the whole path is `""`.
//! Unlike a general-purpose path normalizer, `..` segments are **not**
//! collapsed — they're just ordinary segments as far as canonicalization
//! is concerned (spec §8 scenario 2 is explicit about this for dirents,
//! and relpath uses the same single-pass algorithm). This is the one place
//! this crate deliberately does *not* follow the teacher's `path.rs`: the
//! teacher's `PathBuf::try_join` resolves `..` against its base because
//! psilo-vfs paths are meant to be used directly as filesystem lookups;
//! repository-relative paths are symbolic names, and a repository can
//! legitimately contain a literal path component spelled `..`.
use std::{
    borrow::{Borrow, Cow},
    fmt::{Debug, Display, Formatter},
    ops::Deref,
    str,
};

use crate::util::{is_ancestor_str, longest_ancestor_str, skip_ancestor_str};

/// A borrowed, canonical-or-not repository-relative path.
#[repr(transparent)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Relpath {
    inner: str,
}

impl Relpath {
    #[doc(hidden)]
    pub const fn from_str_preverified(s: &str) -> &Relpath {
        // Sound: `Relpath` is a transparent wrapper around `str`.
        unsafe { std::mem::transmute(s) }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// `canonicalize(input) -> canonical`: total, idempotent. Never
    /// rejects input; a non-canonical `&Relpath` simply returns a new,
    /// canonical [`RelpathBuf`] unless it was already canonical, in which
    /// case the borrow is preserved.
    pub fn canonicalize(s: &str) -> Cow<'_, Relpath> {
        if Relpath::is_canonical_str(s) {
            return Cow::Borrowed(Relpath::from_str_preverified(s));
        }
        let mut out = String::with_capacity(s.len());
        for segment in s.split('/') {
            if segment.is_empty() || segment == "." {
                continue;
            }
            if !out.is_empty() {
                out.push('/');
            }
            out.push_str(segment);
        }
        Cow::Owned(RelpathBuf { inner: out })
    }

    /// `canonicalize_safe(input) -> (canonical, was_already_canonical)`.
    /// Never fails; a thin wrapper over [`Relpath::canonicalize`] that also
    /// reports whether the input needed any rewriting.
    pub fn canonicalize_safe(s: &str) -> (Cow<'_, Relpath>, bool) {
        let canonical = Relpath::canonicalize(s);
        let was_canonical = matches!(canonical, Cow::Borrowed(_));
        (canonical, was_canonical)
    }

    fn is_canonical_str(s: &str) -> bool {
        if s.is_empty() {
            return true;
        }
        if s.starts_with('/') || s.ends_with('/') {
            return false;
        }
        s.split('/').all(|seg| !seg.is_empty() && seg != ".")
    }

    pub fn is_canonical(&self) -> bool {
        Relpath::is_canonical_str(&self.inner)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn components(&self) -> RelpathComponents<'_> {
        if self.inner.is_empty() {
            RelpathComponents { inner: None }
        } else {
            RelpathComponents {
                inner: Some(self.inner.split('/')),
            }
        }
    }

    /// `dirname(path) -> path`
    pub fn dirname(&self) -> &Relpath {
        match self.inner.rfind('/') {
            Some(i) => Relpath::from_str_preverified(&self.inner[..i]),
            None => Relpath::from_str_preverified(""),
        }
    }

    /// `basename(path) -> segment`
    pub fn basename(&self) -> &Relpath {
        match self.inner.rfind('/') {
            Some(i) => Relpath::from_str_preverified(&self.inner[i + 1..]),
            None => self,
        }
    }

    /// `split(path) -> (dirname, basename)`
    pub fn split(&self) -> (&Relpath, &Relpath) {
        (self.dirname(), self.basename())
    }

    /// `join(base, component) -> path`: empty operand returns the other,
    /// otherwise `base + "/" + component`.
    pub fn join(&self, component: &Relpath) -> RelpathBuf {
        debug_assert!(self.is_canonical() && component.is_canonical());
        if self.inner.is_empty() {
            return component.to_owned();
        }
        if component.inner.is_empty() {
            return self.to_owned();
        }
        let mut out = String::with_capacity(self.inner.len() + 1 + component.inner.len());
        out.push_str(&self.inner);
        out.push('/');
        out.push_str(&component.inner);
        RelpathBuf { inner: out }
    }

    /// `join_many(base, variadic...) -> path`. Relpaths have no notion of
    /// "rooted", so this is just repeated `join`.
    pub fn join_many<'a>(&self, components: impl IntoIterator<Item = &'a Relpath>) -> RelpathBuf {
        let mut acc = self.to_owned();
        for c in components {
            acc = acc.join(c);
        }
        acc
    }

    /// `is_ancestor(parent, child) -> bool`. The empty relpath is an
    /// ancestor of every relpath (there is no "absolute" relpath to
    /// exclude).
    pub fn is_ancestor(&self, child: &Relpath) -> bool {
        debug_assert!(self.is_canonical() && child.is_canonical());
        is_ancestor_str(&self.inner, &child.inner)
    }

    /// `is_child(parent, child) -> Option<suffix>`. Identity yields `None`
    /// (a path is not strictly below itself).
    pub fn is_child<'a>(&self, child: &'a Relpath) -> Option<&'a Relpath> {
        debug_assert!(self.is_canonical() && child.is_canonical());
        if self.inner == child.inner {
            return None;
        }
        skip_ancestor_str(&self.inner, &child.inner).map(Relpath::from_str_preverified)
    }

    /// `skip_ancestor(parent, child) -> suffix`. Returns `child` unchanged
    /// if `self` is not an ancestor.
    pub fn skip_ancestor<'a>(&self, child: &'a Relpath) -> &'a Relpath {
        debug_assert!(self.is_canonical() && child.is_canonical());
        skip_ancestor_str(&self.inner, &child.inner)
            .map(Relpath::from_str_preverified)
            .unwrap_or(child)
    }

    /// `longest_ancestor(a, b) -> path`
    pub fn longest_ancestor<'a>(a: &'a Relpath, b: &'a Relpath) -> &'a Relpath {
        debug_assert!(a.is_canonical() && b.is_canonical());
        Relpath::from_str_preverified(longest_ancestor_str(
            &a.inner,
            &b.inner,
            |s| Relpath::from_str_preverified(s).dirname().as_str(),
            is_ancestor_str,
        ))
    }
}

impl Display for Relpath {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, fmt)
    }
}

impl Debug for Relpath {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{:?}", &self.inner)
    }
}

impl AsRef<str> for Relpath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl ToOwned for Relpath {
    type Owned = RelpathBuf;
    fn to_owned(&self) -> RelpathBuf {
        RelpathBuf {
            inner: self.inner.to_string(),
        }
    }
}

impl Deref for Relpath {
    type Target = str;
    fn deref(&self) -> &str {
        &self.inner
    }
}

impl PartialEq<str> for Relpath {
    fn eq(&self, other: &str) -> bool {
        &self.inner == other
    }
}

pub struct RelpathComponents<'a> {
    inner: Option<str::Split<'a, char>>,
}

impl<'a> Iterator for RelpathComponents<'a> {
    type Item = &'a Relpath;
    fn next(&mut self) -> Option<&'a Relpath> {
        self.inner.as_mut()?.next().map(Relpath::from_str_preverified)
    }
}

impl<'a> DoubleEndedIterator for RelpathComponents<'a> {
    fn next_back(&mut self) -> Option<&'a Relpath> {
        self.inner
            .as_mut()?
            .next_back()
            .map(Relpath::from_str_preverified)
    }
}

/// An owned, canonical-or-not repository-relative path.
#[repr(transparent)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct RelpathBuf {
    inner: String,
}

impl RelpathBuf {
    pub fn new() -> RelpathBuf {
        RelpathBuf {
            inner: String::new(),
        }
    }

    pub fn from_str(s: &str) -> RelpathBuf {
        Relpath::canonicalize(s).into_owned()
    }

    pub fn as_relpath(&self) -> &Relpath {
        self.as_ref()
    }
}

impl Default for RelpathBuf {
    fn default() -> Self {
        RelpathBuf::new()
    }
}

impl Borrow<Relpath> for RelpathBuf {
    fn borrow(&self) -> &Relpath {
        Relpath::from_str_preverified(self.inner.as_str())
    }
}

impl AsRef<Relpath> for RelpathBuf {
    fn as_ref(&self) -> &Relpath {
        self.borrow()
    }
}

impl Deref for RelpathBuf {
    type Target = Relpath;
    fn deref(&self) -> &Relpath {
        self.as_ref()
    }
}

impl Display for RelpathBuf {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.as_relpath(), fmt)
    }
}

impl Debug for RelpathBuf {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self.as_relpath(), fmt)
    }
}

impl From<&str> for RelpathBuf {
    fn from(s: &str) -> RelpathBuf {
        RelpathBuf::from_str(s)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn canonicalize_dotdot_not_collapsed() {
        assert_eq!(RelpathBuf::from_str("foo/../bar").as_str(), "foo/../bar");
    }

    #[test]
    fn canonicalize_strips_dot_and_empty_segments() {
        assert_eq!(RelpathBuf::from_str("foo//./bar/").as_str(), "foo/bar");
        assert_eq!(RelpathBuf::from_str("./").as_str(), "");
    }

    #[test]
    fn idempotent() {
        const CASES: &[&str] = &["", "a", "a/b/c", "a/../b", "./a//b/."];
        for c in CASES {
            let once = RelpathBuf::from_str(c);
            let twice = RelpathBuf::from_str(once.as_str());
            assert_eq!(once.as_str(), twice.as_str());
        }
    }

    #[test]
    fn join_split_roundtrip() {
        let p = RelpathBuf::from_str("a/b/c");
        let (dir, base) = p.split();
        assert_eq!(dir.join(base), p);
    }

    #[test]
    fn join_empty_operand() {
        let empty = RelpathBuf::new();
        let foo = RelpathBuf::from_str("foo/bar");
        assert_eq!(empty.join(&foo), foo);
        assert_eq!(foo.join(&empty), foo);
    }

    #[test]
    fn ancestor_and_skip() {
        let a = RelpathBuf::from_str("a/b");
        let b = RelpathBuf::from_str("a/b/c");
        assert!(a.is_ancestor(&b));
        assert_eq!(a.skip_ancestor(&b).as_str(), "c");
        assert_eq!(a.is_child(&b).unwrap().as_str(), "c");
        assert!(!b.is_ancestor(&a));
        assert_eq!(b.skip_ancestor(&a).as_str(), "a/b");
        assert!(a.is_child(&a).is_none());
    }

    #[test]
    fn empty_is_ancestor_of_everything() {
        let empty = RelpathBuf::new();
        let foo = RelpathBuf::from_str("foo/bar");
        assert!(empty.is_ancestor(&foo));
        assert!(empty.is_ancestor(&empty));
    }

    #[test]
    fn longest_ancestor() {
        let a = RelpathBuf::from_str("a/b/c");
        let b = RelpathBuf::from_str("a/b/d");
        assert_eq!(Relpath::longest_ancestor(&a, &b).as_str(), "a/b");
        let unrelated = RelpathBuf::from_str("x/y");
        assert_eq!(Relpath::longest_ancestor(&a, &unrelated).as_str(), "");
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_]{1,8}".prop_filter("not a dot segment", |s| s != ".")
    }

    fn relpath_string() -> impl Strategy<Value = String> {
        proptest::collection::vec(segment(), 0..6).prop_map(|segs| segs.join("/"))
    }

    proptest! {
        #[test]
        fn canonicalize_is_idempotent(s in relpath_string()) {
            let once = RelpathBuf::from_str(&s);
            let twice = RelpathBuf::from_str(once.as_str());
            prop_assert_eq!(once.as_str(), twice.as_str());
        }

        #[test]
        fn join_split_roundtrip_generated(s in relpath_string()) {
            let p = RelpathBuf::from_str(&s);
            if !p.is_empty() {
                let (dir, base) = p.split();
                prop_assert_eq!(dir.join(base).as_str(), p.as_str());
            }
        }

        #[test]
        fn ancestor_is_reflexive(s in relpath_string()) {
            let p = RelpathBuf::from_str(&s);
            prop_assert!(p.is_ancestor(&p));
        }

        #[test]
        fn ancestor_is_transitive(a in relpath_string(), tail1 in segment(), tail2 in segment()) {
            let a = RelpathBuf::from_str(&a);
            let b = a.join(Relpath::from_str_preverified(&tail1));
            let c = b.join(Relpath::from_str_preverified(&tail2));
            prop_assert!(a.is_ancestor(&b));
            prop_assert!(b.is_ancestor(&c));
            prop_assert!(a.is_ancestor(&c));
        }
    }
}
