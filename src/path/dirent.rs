//! Local filesystem directory-entry paths: platform-aware, with a POSIX
//! matrix and a DOS (drive letter / UNC / backslash-local) matrix.
//!
//! Per spec §9's design note, the platform fork is *not* a compile-time
//! `cfg` the way the teacher's single-flavor `path.rs` hard-codes its
//! rules: it's a runtime [`Platform`] parameter threaded through every
//! operation, so both matrices can be exercised from the same test binary.
//! [`Platform::native`] gives callers who just want "this machine's rules"
//! a `cfg`-selected default without forcing it on everyone else.
use std::{
    borrow::{Borrow, Cow},
    env,
    fmt::{Debug, Display, Formatter},
    ops::Deref,
};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CoreError;
use crate::util::{
    basename_with_root_len, dirname_with_root_len, is_ancestor_str, longest_ancestor_str,
    skip_ancestor_str,
};

/// Which local-filesystem path dialect a [`Dirent`] operation should use.
/// Relpath and Uri are platform-invariant (spec §3); only Dirent forks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Posix,
    Dos,
}

impl Platform {
    /// The dialect of the machine this code is compiled for.
    pub const fn native() -> Platform {
        #[cfg(windows)]
        {
            Platform::Dos
        }
        #[cfg(not(windows))]
        {
            Platform::Posix
        }
    }
}

static DOS_DRIVE_ROOT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]:/?$").unwrap());
static UNC_ROOT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^//[^/]+/[^/]+$").unwrap());

fn normalize_seps(s: &str) -> Cow<'_, str> {
    if s.contains('\\') {
        Cow::Owned(s.replace('\\', "/"))
    } else {
        Cow::Borrowed(s)
    }
}

fn split_drive(s: &str) -> Option<(char, &str)> {
    let mut chars = s.char_indices();
    let (_, c) = chars.next()?;
    if !c.is_ascii_alphabetic() {
        return None;
    }
    let (i, sep) = chars.next()?;
    if sep != ':' {
        return None;
    }
    Some((c, &s[i + 1..]))
}

/// Length of the recognized root prefix of an already-`/`-separated DOS
/// dirent: `0` for none, `2` for a bare drive marker (`"C:"`), `3` for a
/// drive-rooted marker (`"C:/"`), or the length of the bare UNC root
/// (`"//host/share"`, no trailing slash) otherwise.
fn dos_root_prefix_len(s: &str) -> usize {
    if let Some(rest) = s.strip_prefix("//") {
        let trimmed = rest.trim_start_matches('/');
        let consumed = rest.len() - trimmed.len();
        let mut it = trimmed.splitn(3, '/');
        let host = it.next().unwrap_or("");
        let share = it.next().unwrap_or("");
        if host.is_empty() || share.is_empty() {
            return 2 + consumed + host.len();
        }
        return 2 + consumed + host.len() + 1 + share.len();
    }
    if let Some((_, rest)) = split_drive(s) {
        return if rest.starts_with('/') { 3 } else { 2 };
    }
    // Drive-relative marker (spec §4.1 join rule 3): a bare leading `/`
    // with no drive letter and no second slash (that would be UNC).
    usize::from(s.starts_with('/'))
}

fn canonicalize_dos_str(s: &str) -> String {
    let normalized = normalize_seps(s);
    let t: &str = &normalized;

    if let Some(rest) = t.strip_prefix("//") {
        let rest = rest.trim_start_matches('/');
        let mut it = rest.split('/');
        let host = it.next().unwrap_or("");
        let share = it.next().unwrap_or("");
        let mut out = String::with_capacity(t.len());
        out.push_str("//");
        out.push_str(&host.to_ascii_lowercase());
        if !share.is_empty() {
            out.push('/');
            out.push_str(share);
        }
        for seg in it.filter(|seg| !seg.is_empty() && *seg != ".") {
            out.push('/');
            out.push_str(seg);
        }
        return out;
    }

    if let Some((drive, rest)) = split_drive(t) {
        let mut out = String::with_capacity(t.len());
        out.push(drive.to_ascii_uppercase());
        out.push(':');
        if let Some(path) = rest.strip_prefix('/') {
            out.push('/');
            let segments: Vec<&str> = path.split('/').filter(|seg| !seg.is_empty() && *seg != ".").collect();
            out.push_str(&segments.join("/"));
        } else {
            let segments: Vec<&str> = rest.split('/').filter(|seg| !seg.is_empty() && *seg != ".").collect();
            out.push_str(&segments.join("/"));
        }
        return out;
    }

    // A bare leading `/` with no drive letter is the DOS drive-relative
    // marker (spec §4.1 join rule 3) — rooted at "whichever drive is
    // current," distinct from an ordinary relative path. Preserved rather
    // than stripped so it survives a canonicalize round trip.
    let rooted = t.starts_with('/');
    let body = if rooted { &t[1..] } else { t };
    let segments: Vec<&str> = body.split('/').filter(|seg| !seg.is_empty() && *seg != ".").collect();
    if rooted {
        format!("/{}", segments.join("/"))
    } else {
        segments.join("/")
    }
}

fn canonicalize_posix_str(s: &str) -> String {
    let rooted = s.starts_with('/');
    let body = s.strip_prefix('/').unwrap_or(s);
    let segments: Vec<&str> = body
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect();
    if rooted {
        format!("/{}", segments.join("/"))
    } else {
        segments.join("/")
    }
}

/// A borrowed, canonical-or-not local directory-entry path.
#[repr(transparent)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dirent {
    inner: str,
}

impl Dirent {
    #[doc(hidden)]
    pub const fn from_str_preverified(s: &str) -> &Dirent {
        // Sound: `Dirent` is a transparent wrapper around `str`.
        unsafe { std::mem::transmute(s) }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// `canonicalize(input) -> canonical`: total, idempotent.
    pub fn canonicalize(s: &str, platform: Platform) -> Cow<'_, Dirent> {
        let canon = match platform {
            Platform::Posix => canonicalize_posix_str(s),
            Platform::Dos => canonicalize_dos_str(s),
        };
        if canon == s {
            Cow::Borrowed(Dirent::from_str_preverified(s))
        } else {
            Cow::Owned(DirentBuf { inner: canon })
        }
    }

    pub fn is_canonical(&self, platform: Platform) -> bool {
        match platform {
            Platform::Posix => canonicalize_posix_str(&self.inner) == self.inner,
            Platform::Dos => canonicalize_dos_str(&self.inner) == self.inner,
        }
    }

    /// `canonicalize_safe(input) -> (canonical, was_already_canonical)`.
    /// Never fails; a thin wrapper over [`Dirent::canonicalize`] that also
    /// reports whether the input needed any rewriting.
    pub fn canonicalize_safe(s: &str, platform: Platform) -> (Cow<'_, Dirent>, bool) {
        let canonical = Dirent::canonicalize(s, platform);
        let was_canonical = matches!(canonical, Cow::Borrowed(_));
        (canonical, was_canonical)
    }

    /// `is_absolute(dirent) -> bool`
    pub fn is_absolute(&self, platform: Platform) -> bool {
        match platform {
            Platform::Posix => self.inner.starts_with('/'),
            Platform::Dos => {
                self.inner.starts_with("//")
                    || matches!(split_drive(&self.inner), Some((_, rest)) if rest.starts_with('/'))
            }
        }
    }

    /// `is_root(path, len) -> bool`
    pub fn is_root(&self, platform: Platform) -> bool {
        match platform {
            Platform::Posix => self.inner == "/",
            Platform::Dos => {
                DOS_DRIVE_ROOT_PATTERN.is_match(&self.inner) || UNC_ROOT_PATTERN.is_match(&self.inner)
            }
        }
    }

    fn root_len(&self, platform: Platform) -> usize {
        match platform {
            Platform::Posix => usize::from(self.inner.starts_with('/')),
            Platform::Dos => dos_root_prefix_len(&self.inner),
        }
    }

    /// `dirname(path) -> path`
    pub fn dirname(&self, platform: Platform) -> &Dirent {
        Dirent::from_str_preverified(dirname_with_root_len(&self.inner, self.root_len(platform)))
    }

    /// `basename(path) -> segment`
    pub fn basename(&self, platform: Platform) -> &Dirent {
        Dirent::from_str_preverified(basename_with_root_len(&self.inner, self.root_len(platform)))
    }

    /// `split(path) -> (dirname, basename)`
    pub fn split(&self, platform: Platform) -> (&Dirent, &Dirent) {
        (self.dirname(platform), self.basename(platform))
    }

    fn dos_marker(&self) -> Option<&str> {
        if self.inner.starts_with("//") {
            let len = dos_root_prefix_len(&self.inner);
            return Some(&self.inner[..len]);
        }
        if split_drive(&self.inner).is_some() {
            return Some(&self.inner[..2]);
        }
        None
    }

    /// `join(base, component) -> path`, per the four numbered rules in
    /// spec §4.1.
    pub fn join(&self, component: &Dirent, platform: Platform) -> DirentBuf {
        debug_assert!(self.is_canonical(platform) && component.is_canonical(platform));
        if component.is_absolute(platform) {
            return component.to_owned();
        }
        if self.inner.is_empty() {
            return component.to_owned();
        }
        if component.inner.is_empty() {
            return self.to_owned();
        }
        if platform == Platform::Dos && component.inner.starts_with('/') {
            return if self.is_absolute(platform) {
                let marker = self.dos_marker().unwrap_or("");
                DirentBuf {
                    inner: format!("{}{}", marker, component.inner),
                }
            } else {
                component.to_owned()
            };
        }
        let need_sep =
            !(self.inner.ends_with('/') || (platform == Platform::Dos && self.inner.ends_with(':')));
        let mut out = String::with_capacity(self.inner.len() + 1 + component.inner.len());
        out.push_str(&self.inner);
        if need_sep {
            out.push('/');
        }
        out.push_str(&component.inner);
        DirentBuf { inner: out }
    }

    /// `join_many(base, variadic...) -> path`
    pub fn join_many<'a>(
        &self,
        components: impl IntoIterator<Item = &'a Dirent>,
        platform: Platform,
    ) -> DirentBuf {
        let mut acc = self.to_owned();
        for c in components {
            acc = acc.join(c, platform);
        }
        acc
    }

    fn is_drive_relative_marker(&self, platform: Platform) -> bool {
        platform == Platform::Dos && self.inner.ends_with(':') && split_drive(&self.inner).is_some()
    }

    /// `is_ancestor(parent, child) -> bool`
    pub fn is_ancestor(&self, child: &Dirent, platform: Platform) -> bool {
        debug_assert!(self.is_canonical(platform) && child.is_canonical(platform));
        if self.inner.is_empty() {
            return !child.is_absolute(platform);
        }
        if self.is_drive_relative_marker(platform) {
            return child.inner.starts_with(self.inner.as_str());
        }
        is_ancestor_str(&self.inner, &child.inner)
    }

    /// `is_child(parent, child) -> Option<suffix>`
    pub fn is_child<'a>(&self, child: &'a Dirent, platform: Platform) -> Option<&'a Dirent> {
        debug_assert!(self.is_canonical(platform) && child.is_canonical(platform));
        if self.inner == child.inner {
            return None;
        }
        if self.is_drive_relative_marker(platform) {
            return child
                .inner
                .strip_prefix(self.inner.as_str())
                .map(Dirent::from_str_preverified);
        }
        skip_ancestor_str(&self.inner, &child.inner).map(Dirent::from_str_preverified)
    }

    /// `skip_ancestor(parent, child) -> suffix`
    pub fn skip_ancestor<'a>(&self, child: &'a Dirent, platform: Platform) -> &'a Dirent {
        debug_assert!(self.is_canonical(platform) && child.is_canonical(platform));
        if self.is_drive_relative_marker(platform) {
            if let Some(suffix) = child.inner.strip_prefix(self.inner.as_str()) {
                return Dirent::from_str_preverified(suffix);
            }
            return child;
        }
        skip_ancestor_str(&self.inner, &child.inner)
            .map(Dirent::from_str_preverified)
            .unwrap_or(child)
    }

    /// `longest_ancestor(a, b) -> path`
    pub fn longest_ancestor<'a>(a: &'a Dirent, b: &'a Dirent, platform: Platform) -> &'a Dirent {
        debug_assert!(a.is_canonical(platform) && b.is_canonical(platform));
        Dirent::from_str_preverified(longest_ancestor_str(
            &a.inner,
            &b.inner,
            |s| Dirent::from_str_preverified(s).dirname(platform).as_str(),
            |p, c| {
                Dirent::from_str_preverified(p).is_ancestor(Dirent::from_str_preverified(c), platform)
            },
        ))
    }

    /// Presentation-only: swap `/` for the platform's local separator, and
    /// map the empty path to `.` (spec §6 "Path separators").
    pub fn to_local_style(&self, platform: Platform) -> String {
        if self.inner.is_empty() {
            return ".".to_string();
        }
        match platform {
            Platform::Posix => self.inner.to_string(),
            Platform::Dos => self.inner.replace('/', "\\"),
        }
    }

    /// Inverse of [`Dirent::to_local_style`]: accepts a platform-local path
    /// (or `.`) and canonicalizes it.
    pub fn from_local_style(s: &str, platform: Platform) -> DirentBuf {
        if s == "." {
            return DirentBuf::new();
        }
        Dirent::canonicalize(s, platform).into_owned()
    }

    /// Resolves `self` to an absolute dirent using the process's current
    /// working directory if it isn't already absolute. Fails only if the
    /// platform can't report a current directory (spec §4.1 failure
    /// semantics).
    pub fn get_absolute(&self, platform: Platform) -> Result<DirentBuf, CoreError> {
        if self.is_absolute(platform) {
            return Ok(self.to_owned());
        }
        let cwd = env::current_dir().map_err(|e| CoreError::BadFilename {
            path: self.inner.to_string(),
            reason: match e.kind() {
                std::io::ErrorKind::NotFound => "current directory no longer exists",
                std::io::ErrorKind::PermissionDenied => "permission denied resolving current directory",
                _ => "could not resolve current directory",
            },
        })?;
        let cwd_str = cwd.to_string_lossy();
        let cwd_dirent = Dirent::canonicalize(&cwd_str, platform);
        Ok(cwd_dirent.join(self, platform))
    }
}

impl Display for Dirent {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, fmt)
    }
}

impl Debug for Dirent {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        write!(fmt, "{:?}", &self.inner)
    }
}

impl AsRef<str> for Dirent {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl ToOwned for Dirent {
    type Owned = DirentBuf;
    fn to_owned(&self) -> DirentBuf {
        DirentBuf {
            inner: self.inner.to_string(),
        }
    }
}

impl Deref for Dirent {
    type Target = str;
    fn deref(&self) -> &str {
        &self.inner
    }
}

impl PartialEq<str> for Dirent {
    fn eq(&self, other: &str) -> bool {
        &self.inner == other
    }
}

/// An owned, canonical-or-not local directory-entry path.
#[repr(transparent)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct DirentBuf {
    inner: String,
}

impl DirentBuf {
    pub fn new() -> DirentBuf {
        DirentBuf {
            inner: String::new(),
        }
    }

    pub fn from_str(s: &str, platform: Platform) -> DirentBuf {
        Dirent::canonicalize(s, platform).into_owned()
    }

    pub fn as_dirent(&self) -> &Dirent {
        self.as_ref()
    }
}

impl Default for DirentBuf {
    fn default() -> Self {
        DirentBuf::new()
    }
}

impl Borrow<Dirent> for DirentBuf {
    fn borrow(&self) -> &Dirent {
        Dirent::from_str_preverified(self.inner.as_str())
    }
}

impl AsRef<Dirent> for DirentBuf {
    fn as_ref(&self) -> &Dirent {
        self.borrow()
    }
}

impl Deref for DirentBuf {
    type Target = Dirent;
    fn deref(&self) -> &Dirent {
        self.as_ref()
    }
}

impl Display for DirentBuf {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.as_dirent(), fmt)
    }
}

impl Debug for DirentBuf {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self.as_dirent(), fmt)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn posix_canonicalize() {
        assert_eq!(DirentBuf::from_str("/foo/./bar/", Platform::Posix).as_str(), "/foo/bar");
        assert_eq!(DirentBuf::from_str("//foo//bar", Platform::Posix).as_str(), "/foo/bar");
        assert_eq!(DirentBuf::from_str("/", Platform::Posix).as_str(), "/");
        assert_eq!(DirentBuf::from_str("foo/../bar", Platform::Posix).as_str(), "foo/../bar");
    }

    #[test]
    fn dos_drive_rooted_keeps_dotdot() {
        // Scenario 2 from spec §8: no ".." elimination.
        assert_eq!(
            DirentBuf::from_str("C:\\Foo\\..\\Bar", Platform::Dos).as_str(),
            "C:/Foo/../Bar"
        );
    }

    #[test]
    fn dos_drive_root_forms() {
        assert_eq!(DirentBuf::from_str("c:/", Platform::Dos).as_str(), "C:/");
        assert_eq!(DirentBuf::from_str("c:", Platform::Dos).as_str(), "C:");
        assert!(Dirent::from_str_preverified("C:/").is_root(Platform::Dos));
        assert!(Dirent::from_str_preverified("C:").is_root(Platform::Dos));
        assert!(!Dirent::from_str_preverified("C:/foo").is_root(Platform::Dos));
    }

    #[test]
    fn dos_unc() {
        assert_eq!(
            DirentBuf::from_str("//HOST/Share/sub", Platform::Dos).as_str(),
            "//host/Share/sub"
        );
        assert!(Dirent::from_str_preverified("//host/share").is_root(Platform::Dos));
        assert!(!Dirent::from_str_preverified("//host/share/x").is_root(Platform::Dos));
    }

    #[test]
    fn is_absolute_matrix() {
        assert!(Dirent::from_str_preverified("/foo").is_absolute(Platform::Posix));
        assert!(!Dirent::from_str_preverified("foo").is_absolute(Platform::Posix));
        assert!(Dirent::from_str_preverified("C:/foo").is_absolute(Platform::Dos));
        assert!(!Dirent::from_str_preverified("C:foo").is_absolute(Platform::Dos));
        assert!(Dirent::from_str_preverified("//host/share").is_absolute(Platform::Dos));
    }

    #[test]
    fn join_rules() {
        let base = DirentBuf::from_str("/a", Platform::Posix);
        let comp = DirentBuf::from_str("b", Platform::Posix);
        assert_eq!(base.join(&comp, Platform::Posix).as_str(), "/a/b");

        let abs_comp = DirentBuf::from_str("/c", Platform::Posix);
        assert_eq!(base.join(&abs_comp, Platform::Posix).as_str(), "/c");

        // join_many: rooted component resets earlier components (scenario 3).
        let start = DirentBuf::from_str("/a", Platform::Posix);
        let parts = [
            DirentBuf::from_str("b", Platform::Posix),
            DirentBuf::from_str("/c", Platform::Posix),
            DirentBuf::from_str("d", Platform::Posix),
        ];
        let joined = start.join_many(parts.iter().map(|p| p.as_dirent()), Platform::Posix);
        assert_eq!(joined.as_str(), "/c/d");
    }

    #[test]
    fn join_dos_drive_relative_component() {
        let base = DirentBuf::from_str("C:/foo/bar", Platform::Dos);
        let comp = DirentBuf::from_str("/baz", Platform::Dos);
        assert_eq!(base.join(&comp, Platform::Dos).as_str(), "C:/baz");
    }

    #[test]
    fn dirname_basename_split() {
        let p = DirentBuf::from_str("/foo/bar", Platform::Posix);
        assert_eq!(p.dirname(Platform::Posix).as_str(), "/foo");
        assert_eq!(p.basename(Platform::Posix).as_str(), "bar");

        let root = DirentBuf::from_str("/", Platform::Posix);
        assert_eq!(root.dirname(Platform::Posix).as_str(), "/");

        let dos = DirentBuf::from_str("C:/foo/bar", Platform::Dos);
        assert_eq!(dos.dirname(Platform::Dos).as_str(), "C:/foo");
        let dos_root_level = DirentBuf::from_str("C:/foo", Platform::Dos);
        assert_eq!(dos_root_level.dirname(Platform::Dos).as_str(), "C:/");

        let unc = DirentBuf::from_str("//host/share/foo/bar", Platform::Dos);
        assert_eq!(unc.dirname(Platform::Dos).as_str(), "//host/share/foo");
        let unc_root_level = DirentBuf::from_str("//host/share/foo", Platform::Dos);
        assert_eq!(unc_root_level.dirname(Platform::Dos).as_str(), "//host/share");
    }

    #[test]
    fn ancestor_posix() {
        let root = DirentBuf::from_str("/", Platform::Posix);
        let foo = DirentBuf::from_str("/foo", Platform::Posix);
        assert!(root.is_ancestor(&foo, Platform::Posix));
        assert_eq!(root.skip_ancestor(&foo, Platform::Posix).as_str(), "foo");
    }

    #[test]
    fn longest_ancestor_scenario_5() {
        let a = DirentBuf::from_str("/a/b/c", Platform::Posix);
        let b = DirentBuf::from_str("/a/b/d", Platform::Posix);
        assert_eq!(Dirent::longest_ancestor(&a, &b, Platform::Posix).as_str(), "/a/b");
    }

    #[test]
    fn local_style_roundtrip() {
        let empty = DirentBuf::new();
        assert_eq!(empty.to_local_style(Platform::Dos), ".");
        let dos = DirentBuf::from_str("C:/foo/bar", Platform::Dos);
        assert_eq!(dos.to_local_style(Platform::Dos), "C:\\foo\\bar");
    }

    fn segment() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9_]{1,8}".prop_filter("not a dot segment", |s| s != ".")
    }

    fn posix_path_string() -> impl Strategy<Value = String> {
        proptest::collection::vec(segment(), 1..6).prop_map(|segs| format!("/{}", segs.join("/")))
    }

    proptest! {
        #[test]
        fn posix_canonicalize_is_idempotent(s in posix_path_string()) {
            let once = DirentBuf::from_str(&s, Platform::Posix);
            let twice = DirentBuf::from_str(once.as_str(), Platform::Posix);
            prop_assert_eq!(once.as_str(), twice.as_str());
        }

        #[test]
        fn posix_join_split_roundtrip(s in posix_path_string()) {
            let p = DirentBuf::from_str(&s, Platform::Posix);
            let (dir, base) = p.split(Platform::Posix);
            prop_assert_eq!(dir.join(base, Platform::Posix).as_str(), p.as_str());
        }

        #[test]
        fn posix_ancestor_is_reflexive(s in posix_path_string()) {
            let p = DirentBuf::from_str(&s, Platform::Posix);
            prop_assert!(p.is_ancestor(&p, Platform::Posix));
        }

        #[test]
        fn posix_skip_child_agree(s in posix_path_string(), tail in segment()) {
            let parent = DirentBuf::from_str(&s, Platform::Posix);
            let child = parent.join(Dirent::from_str_preverified(&tail), Platform::Posix);
            prop_assert!(parent.is_ancestor(&child, Platform::Posix));
            prop_assert_eq!(parent.skip_ancestor(&child, Platform::Posix).as_str(), tail.as_str());
        }
    }
}
