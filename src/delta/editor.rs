//! `EditorContract` (spec §4.3): the sink state machine `diff` drives.
//!
//! Modeled with associated types rather than a trait object, since the
//! "baton" the spec describes is exactly an opaque per-node handle threaded
//! back into later calls — an associated type lets each implementation
//! pick its own handle representation (an index into a node-graph arena,
//! a wire-protocol frame id, a working-copy path) without the core caring.
use crate::error::CoreResult;
use crate::path::relpath::Relpath;

/// Ancestor info passed to a `replace_*` call: the source-tree path chosen
/// as the base, and the revision it was resolved at.
pub type Ancestor<'a> = Option<(&'a Relpath, u64)>;

/// Handler for the windows of a single file's text delta (spec §4.2:
/// "deliver windows in order and close with a null terminator"). This
/// core never generates a real binary delta (byte-level text-diff
/// generation is explicitly out of scope, spec §1) — `diff` always calls
/// [`TextDeltaHandler::window`] exactly once with the target's full
/// content, then [`TextDeltaHandler::close`].
pub trait TextDeltaHandler {
    fn window(&mut self, data: &[u8]) -> CoreResult<()>;
    fn close(&mut self) -> CoreResult<()>;
}

pub trait Editor {
    type DirBaton;
    type FileBaton;

    fn replace_root(&mut self) -> CoreResult<Self::DirBaton>;

    fn replace_directory(
        &mut self,
        name: &str,
        parent: &Self::DirBaton,
        ancestor: Ancestor<'_>,
    ) -> CoreResult<Self::DirBaton>;

    fn add_directory(&mut self, name: &str, parent: &Self::DirBaton) -> CoreResult<Self::DirBaton>;

    fn replace_file(
        &mut self,
        name: &str,
        parent: &Self::DirBaton,
        ancestor: Ancestor<'_>,
    ) -> CoreResult<Self::FileBaton>;

    fn add_file(&mut self, name: &str, parent: &Self::DirBaton) -> CoreResult<Self::FileBaton>;

    fn delete(&mut self, name: &str, parent: &Self::DirBaton) -> CoreResult<()>;

    fn change_dir_prop(&mut self, dir: &Self::DirBaton, name: &str, value: Option<&[u8]>) -> CoreResult<()>;

    fn change_dirent_prop(
        &mut self,
        parent: &Self::DirBaton,
        entry_name: &str,
        name: &str,
        value: Option<&[u8]>,
    ) -> CoreResult<()>;

    fn change_file_prop(&mut self, file: &Self::FileBaton, name: &str, value: Option<&[u8]>) -> CoreResult<()>;

    fn apply_textdelta(
        &mut self,
        file: &Self::FileBaton,
        ancestor_content: &[u8],
    ) -> CoreResult<Box<dyn TextDeltaHandler + '_>>;

    fn close_file(&mut self, file: Self::FileBaton) -> CoreResult<()>;

    fn close_directory(&mut self, dir: Self::DirBaton) -> CoreResult<()>;
}
