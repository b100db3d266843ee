//! Repository URLs: `scheme://[userinfo@]host[:port]/percent-encoded/path`.
//!
//! Canonical form (spec §3): lowercase scheme, lowercase host, percent
//! escapes normalized to uppercase hex, no trailing slash unless the path
//! is empty (a bare authority reference keeps exactly one). Userinfo and
//! port are preserved byte-for-byte — case and encoding rules there are a
//! server-side concern this crate doesn't second-guess.
use std::{
    borrow::{Borrow, Cow},
    fmt::{Debug, Display, Formatter},
    ops::Deref,
};

use crate::path::relpath::Relpath;
use crate::util::{
    basename_with_root_len, dirname_with_root_len, is_ancestor_str, longest_ancestor_str,
    skip_ancestor_str,
};

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Normalizes percent-escapes in a URI path to uppercase hex, and decodes
/// any escape of an unreserved byte back to its literal form (spec §3's
/// "percent-encoding is normalized, not merely validated").
fn canonicalize_path_escapes(path: &str) -> Cow<'_, str> {
    let bytes = path.as_bytes();
    let mut i = 0;
    let mut needs_change = false;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match (bytes.get(i + 1).copied(), bytes.get(i + 2).copied()) {
                (Some(h), Some(l)) if hex_val(h).is_some() && hex_val(l).is_some() => {
                    let decoded = (hex_val(h).unwrap() << 4) | hex_val(l).unwrap();
                    if is_unreserved(decoded) || !h.is_ascii_uppercase() || !l.is_ascii_uppercase()
                    {
                        needs_change = true;
                    }
                    i += 3;
                    continue;
                }
                _ => {
                    // `%` not followed by two hex digits isn't a valid
                    // escape; spec §3 says it becomes literal `%25`.
                    needs_change = true;
                }
            }
        }
        i += 1;
    }
    if !needs_change {
        return Cow::Borrowed(path);
    }
    let mut out = String::with_capacity(path.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let (Some(h), Some(l)) = (bytes.get(i + 1).copied(), bytes.get(i + 2).copied()) {
                if let (Some(hv), Some(lv)) = (hex_val(h), hex_val(l)) {
                    let decoded = (hv << 4) | lv;
                    if is_unreserved(decoded) {
                        out.push(decoded as char);
                    } else {
                        out.push_str(&format!("%{:02X}", decoded));
                    }
                    i += 3;
                    continue;
                }
            }
            // Invalid escape: the `%` itself becomes literal `%25`; the
            // bytes that follow it are left for the next iterations to
            // handle as ordinary characters.
            out.push_str("%25");
            i += 1;
            continue;
        }
        out.push(bytes[i] as char);
        i += 1;
    }
    Cow::Owned(out)
}

fn percent_encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for b in segment.bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

struct Parsed<'a> {
    scheme: &'a str,
    authority: &'a str,
    path: &'a str,
}

fn parse(s: &str) -> Option<Parsed<'_>> {
    let scheme_end = s.find("://")?;
    let scheme = &s[..scheme_end];
    if scheme.is_empty() || !scheme.chars().next()?.is_ascii_alphabetic() {
        return None;
    }
    if !scheme
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
    {
        return None;
    }
    let rest = &s[scheme_end + 3..];
    let (authority, path) = match rest.find('/') {
        Some(i) => (&rest[..i], &rest[i..]),
        None => (rest, ""),
    };
    Some(Parsed {
        scheme,
        authority,
        path,
    })
}

fn lowercase_authority(authority: &str) -> String {
    match authority.rfind('@') {
        Some(i) => format!("{}@{}", &authority[..i], authority[i + 1..].to_ascii_lowercase()),
        None => authority.to_ascii_lowercase(),
    }
}

fn canonicalize_str(s: &str) -> String {
    let Some(parsed) = parse(s) else {
        return s.to_string();
    };
    let scheme = parsed.scheme.to_ascii_lowercase();
    let authority = lowercase_authority(parsed.authority);
    let path_body = parsed.path.strip_prefix('/').unwrap_or(parsed.path);
    let segments: Vec<Cow<'_, str>> = path_body
        .split('/')
        .filter(|seg| !seg.is_empty())
        .map(canonicalize_path_escapes)
        .collect();
    if segments.is_empty() {
        format!("{}://{}/", scheme, authority)
    } else {
        format!(
            "{}://{}/{}",
            scheme,
            authority,
            segments.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join("/")
        )
    }
}

/// `urlpath_canonicalize(input) -> canonical`: accepts either a full URL
/// (`scheme://...`) or a server-relative filesystem path (`/some/path`,
/// no scheme). A full URL is canonicalized exactly like [`Uri::canonicalize`].
/// A bare path is left structurally alone — no segment collapsing, no
/// scheme/authority to lowercase — and only has its percent-escapes
/// normalized by a decode-then-encode round trip, segment by segment.
pub fn urlpath_canonicalize(s: &str) -> Cow<'_, str> {
    if parse(s).is_some() {
        return Cow::Owned(canonicalize_str(s));
    }
    let leading_slash = s.starts_with('/');
    let body = if leading_slash { &s[1..] } else { s };
    let trailing_slash = !body.is_empty() && body.ends_with('/');
    let trimmed = if trailing_slash {
        &body[..body.len() - 1]
    } else {
        body
    };
    let segments: Vec<Cow<'_, str>> = trimmed.split('/').map(canonicalize_path_escapes).collect();
    if !segments.iter().any(|s| matches!(s, Cow::Owned(_))) {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    if leading_slash {
        out.push('/');
    }
    out.push_str(&segments.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join("/"));
    if trailing_slash {
        out.push('/');
    }
    Cow::Owned(out)
}

/// A borrowed, canonical-or-not URI.
#[repr(transparent)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Uri {
    inner: str,
}

impl Uri {
    #[doc(hidden)]
    pub const fn from_str_preverified(s: &str) -> &Uri {
        // Sound: `Uri` is a transparent wrapper around `str`.
        unsafe { std::mem::transmute(s) }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// `canonicalize(input) -> canonical`: total. Inputs with no
    /// recognizable `scheme://` are passed through unchanged — this mirrors
    /// `Dirent`/`Relpath`'s total canonicalize but means callers who need to
    /// *validate* a URI should check [`Uri::is_canonical`] afterwards.
    pub fn canonicalize(s: &str) -> Cow<'_, Uri> {
        let canon = canonicalize_str(s);
        if canon == s {
            Cow::Borrowed(Uri::from_str_preverified(s))
        } else {
            Cow::Owned(UriBuf { inner: canon })
        }
    }

    pub fn is_canonical(&self) -> bool {
        canonicalize_str(&self.inner) == self.inner
    }

    /// `canonicalize_safe(input) -> (canonical, was_already_canonical)`.
    /// Never fails; a thin wrapper over [`Uri::canonicalize`] that also
    /// reports whether the input needed any rewriting.
    pub fn canonicalize_safe(s: &str) -> (Cow<'_, Uri>, bool) {
        let canonical = Uri::canonicalize(s);
        let was_canonical = matches!(canonical, Cow::Borrowed(_));
        (canonical, was_canonical)
    }

    fn parsed(&self) -> Option<Parsed<'_>> {
        parse(&self.inner)
    }

    pub fn scheme(&self) -> Option<&str> {
        self.parsed().map(|p| p.scheme)
    }

    pub fn authority(&self) -> Option<&str> {
        self.parsed().map(|p| p.authority)
    }

    /// Length of `scheme://authority/`, i.e. everything up to and
    /// including the path's leading slash. Mirrors the POSIX dirent
    /// convention of folding the root separator into `root_len` so
    /// `dirname_with_root_len`/`basename_with_root_len` need no URI-specific
    /// logic. Assumes `self` is in canonical form (path always present and
    /// slash-led); non-canonical input should be canonicalized first.
    fn root_len(&self) -> usize {
        match self.parsed() {
            Some(p) if !p.path.is_empty() => self.inner.len() - p.path.len() + 1,
            Some(p) => self.inner.len() - p.path.len(),
            None => 0,
        }
    }

    /// `is_root(path) -> bool`: true for a bare `scheme://authority` with
    /// no path component (or only the root slash).
    pub fn is_root(&self) -> bool {
        match self.parsed() {
            Some(p) => p.path.is_empty() || p.path == "/",
            None => false,
        }
    }

    /// `dirname(path) -> path`
    pub fn dirname(&self) -> &Uri {
        Uri::from_str_preverified(dirname_with_root_len(&self.inner, self.root_len()))
    }

    /// `basename(path) -> segment`
    pub fn basename(&self) -> &str {
        basename_with_root_len(&self.inner, self.root_len())
    }

    /// `split(path) -> (dirname, basename)`
    pub fn split(&self) -> (&Uri, &str) {
        (self.dirname(), self.basename())
    }

    /// `join(base, relpath) -> uri`: appends a repository-relative path
    /// to a URI's path component, percent-encoding each new segment.
    pub fn join(&self, component: &Relpath) -> UriBuf {
        debug_assert!(self.is_canonical() && component.is_canonical());
        if component.is_empty() {
            return self.to_owned();
        }
        let need_sep = !self.inner.ends_with('/');
        let mut out = String::with_capacity(self.inner.len() + component.as_str().len() + 8);
        out.push_str(&self.inner);
        if need_sep {
            out.push('/');
        }
        let encoded: Vec<String> = component
            .as_str()
            .split('/')
            .map(percent_encode_segment)
            .collect();
        out.push_str(&encoded.join("/"));
        UriBuf { inner: out }
    }

    /// `join_many(base, relpaths) -> uri`: folds [`Uri::join`] over each
    /// component in turn.
    pub fn join_many<'a>(&self, components: impl IntoIterator<Item = &'a Relpath>) -> UriBuf {
        let mut out = self.to_owned();
        for component in components {
            out = out.join(component);
        }
        out
    }

    /// `is_ancestor(parent, child) -> bool`
    pub fn is_ancestor(&self, child: &Uri) -> bool {
        debug_assert!(self.is_canonical() && child.is_canonical());
        is_ancestor_str(&self.inner, &child.inner)
    }

    /// `is_child(parent, child) -> Option<suffix>`
    pub fn is_child<'a>(&self, child: &'a Uri) -> Option<&'a str> {
        debug_assert!(self.is_canonical() && child.is_canonical());
        if self.inner == child.inner {
            return None;
        }
        skip_ancestor_str(&self.inner, &child.inner)
    }

    /// `skip_ancestor(parent, child) -> suffix`
    pub fn skip_ancestor<'a>(&self, child: &'a Uri) -> &'a str {
        debug_assert!(self.is_canonical() && child.is_canonical());
        skip_ancestor_str(&self.inner, &child.inner).unwrap_or(&child.inner)
    }

    /// `longest_ancestor(a, b) -> path`
    pub fn longest_ancestor<'a>(a: &'a Uri, b: &'a Uri) -> &'a Uri {
        debug_assert!(a.is_canonical() && b.is_canonical());
        Uri::from_str_preverified(longest_ancestor_str(
            &a.inner,
            &b.inner,
            |s| Uri::from_str_preverified(s).dirname().as_str(),
            is_ancestor_str,
        ))
    }
}

impl Display for Uri {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, fmt)
    }
}

impl Debug for Uri {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{:?}", &self.inner)
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl ToOwned for Uri {
    type Owned = UriBuf;
    fn to_owned(&self) -> UriBuf {
        UriBuf {
            inner: self.inner.to_string(),
        }
    }
}

impl Deref for Uri {
    type Target = str;
    fn deref(&self) -> &str {
        &self.inner
    }
}

/// An owned, canonical-or-not URI.
#[repr(transparent)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct UriBuf {
    inner: String,
}

impl UriBuf {
    pub fn from_str(s: &str) -> UriBuf {
        Uri::canonicalize(s).into_owned()
    }

    pub fn as_uri(&self) -> &Uri {
        self.as_ref()
    }
}

impl Borrow<Uri> for UriBuf {
    fn borrow(&self) -> &Uri {
        Uri::from_str_preverified(self.inner.as_str())
    }
}

impl AsRef<Uri> for UriBuf {
    fn as_ref(&self) -> &Uri {
        self.borrow()
    }
}

impl Deref for UriBuf {
    type Target = Uri;
    fn deref(&self) -> &Uri {
        self.as_ref()
    }
}

impl Display for UriBuf {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.as_uri(), fmt)
    }
}

impl Debug for UriBuf {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self.as_uri(), fmt)
    }
}

impl From<&str> for UriBuf {
    fn from(s: &str) -> UriBuf {
        UriBuf::from_str(s)
    }
}
