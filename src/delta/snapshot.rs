//! `NodeSnapshot`: an opaque handle onto an immutable directory or file at
//! some revision (spec §3). The core only ever asks a snapshot to list
//! itself, look up a child, and hand back properties/content — it never
//! mutates one.
use crate::error::CoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Dir,
}

/// One child of a directory snapshot, as returned by
/// [`NodeSnapshot::entries`]. `identity` is opaque to the core; it's
/// compared only via [`NodeSnapshot::identity_distance`].
#[derive(Debug, Clone)]
pub struct DirEntry<Identity> {
    pub name: String,
    pub kind: NodeKind,
    pub identity: Identity,
    /// Properties attached to the entry itself (in the parent's listing),
    /// distinct from the child node's own properties — e.g. a lock token
    /// or copy annotation. Sorted by name. Diffed via `change_dirent_prop`
    /// whenever an entry survives by name across source and target,
    /// independent of whether the node's own identity changed.
    pub dirent_properties: Vec<(String, Vec<u8>)>,
}

/// A directory or file at a fixed revision. `entries` must return children
/// sorted by name — the merge-walk in [`crate::delta::diff`] depends on it.
pub trait NodeSnapshot: Sized {
    type Identity: Clone + PartialEq;

    fn kind(&self) -> NodeKind;

    /// The revision this snapshot is pinned to; used as the `ancestor_rev`
    /// passed to `replace_file`/`replace_directory`.
    fn revision(&self) -> u64;

    fn identity(&self) -> Self::Identity;

    /// Sorted by property name (spec §4.2's property-list diff).
    fn properties(&self) -> CoreResult<Vec<(String, Vec<u8>)>>;

    /// Sorted by entry name.
    fn entries(&self) -> CoreResult<Vec<DirEntry<Self::Identity>>>;

    fn child(&self, name: &str) -> CoreResult<Self>;

    fn content(&self) -> CoreResult<Vec<u8>>;

    /// A non-negative distance used as a heuristic proxy for delta size
    /// between two nodes of matching kind, or `None` ("unrelated") if `a`
    /// and `b` share no meaningful history.
    fn identity_distance(a: &Self::Identity, b: &Self::Identity) -> Option<u32>;
}
