//! Path algebra: canonicalization, composition, decomposition, ancestor
//! tests, and relative-path computation over three disjoint path flavors.
//!
//! Every public operation here is pure and reentrant (spec §5): no flavor
//! touches the filesystem or any other shared state, and mixing flavors in
//! a single call (handing a [`relpath::Relpath`] where a
//! [`dirent::Dirent`] is expected, say) simply isn't possible — the type
//! system enforces the "programming error" the spec calls out, rather than
//! deferring it to a runtime assertion.
//!
//! `canonicalize` is a total function for every flavor: it never rejects
//! its input, it just normalizes whatever it's given. The few operations
//! that can genuinely fail (`is_under_root`'s escaped-root case,
//! `get_absolute`, the `file://` conversions) say so in their return types
//! and are documented on the relevant `impl`.

pub mod condense;
pub mod dirent;
pub mod fileuri;
pub mod relpath;
pub mod uri;

/// Spec §3's `PathFlavor`. Not used as a runtime discriminant anywhere in
/// this crate (the type system already separates [`relpath::Relpath`],
/// [`dirent::Dirent`], and [`uri::Uri`]) — kept for callers and tests that
/// want to talk about "which flavor" a raw string is meant to be without
/// reaching for a type parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathFlavor {
    Dirent,
    Relpath,
    Uri,
}

/// The canonical empty path, shared by relpath and (non-rooted) dirent.
/// Named here per SPEC_FULL.md's "global sentinel strings" note: a
/// process-wide constant, not a lazily-initialized singleton.
pub const EMPTY: &str = "";
