//! Structural tree diff (spec §4.2): given two directory snapshots, drive
//! an [`Editor`] through the minimal sequence of calls that transforms one
//! into the other.
//!
//! This module is the one place in the crate with actual control flow and
//! I/O (snapshot property/content fetches); `path` stays pure throughout.
pub mod arena;
pub mod editor;
#[cfg(feature = "memtree")]
pub mod memtree;
pub mod snapshot;

use std::cmp::Ordering;

use crate::cancel::{self, CancelCheck};
use crate::error::CoreResult;
use crate::path::relpath::RelpathBuf;

use arena::ScratchArena;
use editor::{Ancestor, Editor};
use snapshot::{DirEntry, NodeKind, NodeSnapshot};

/// Entry point: diffs `source` against `target`, driving `editor` with the
/// resulting edit stream. `cancel` is polled at every directory boundary
/// and before every content-delta window (spec §5).
///
/// On success every frame this function opened has been closed. On error,
/// per spec §7's propagation policy, frames already opened are left for the
/// caller to tear down.
pub fn diff<S, E>(source: &S, target: &S, editor: &mut E, cancel: &mut dyn CancelCheck) -> CoreResult<()>
where
    S: NodeSnapshot,
    E: Editor,
{
    cancel::check(cancel)?;
    let mut arena = ScratchArena::new();
    let root = editor.replace_root()?;
    delta_dirs(Some(source), target, "", &root, editor, cancel, &mut arena)?;
    editor.close_directory(root)
}

/// Diffs properties sorted by name, both lists pre-sorted per
/// [`NodeSnapshot::properties`]'s contract. Present-only-in-source emits a
/// deletion (`None`); present-only-in-target or changed-value emits the new
/// value.
fn diff_properties<'a>(
    source: &'a [(String, Vec<u8>)],
    target: &'a [(String, Vec<u8>)],
) -> Vec<(&'a str, Option<&'a [u8]>)> {
    let mut changes = Vec::new();
    let (mut si, mut ti) = (0, 0);
    while si < source.len() || ti < target.len() {
        match (source.get(si), target.get(ti)) {
            (Some((sn, _)), Some((tn, tv))) => match sn.as_str().cmp(tn.as_str()) {
                Ordering::Less => {
                    changes.push((sn.as_str(), None));
                    si += 1;
                }
                Ordering::Greater => {
                    changes.push((tn.as_str(), Some(tv.as_slice())));
                    ti += 1;
                }
                Ordering::Equal => {
                    let (_, sv) = &source[si];
                    if sv != tv {
                        changes.push((tn.as_str(), Some(tv.as_slice())));
                    }
                    si += 1;
                    ti += 1;
                }
            },
            (Some((sn, _)), None) => {
                changes.push((sn.as_str(), None));
                si += 1;
            }
            (None, Some((tn, tv))) => {
                changes.push((tn.as_str(), Some(tv.as_slice())));
                ti += 1;
            }
            (None, None) => unreachable!(),
        }
    }
    changes
}

/// Among `candidates` of the same kind as `target_entry`, the index of the
/// one minimizing [`NodeSnapshot::identity_distance`], ignoring "unrelated"
/// (`None`-distance) candidates. Ties resolve to the lowest index — this is
/// a local, source-directory-only search (spec §9's open question: not
/// globally optimal, but the ancestor selection a correct implementation
/// must reproduce byte-for-byte).
fn find_ancestor<S: NodeSnapshot>(
    candidates: &[DirEntry<S::Identity>],
    target_entry: &DirEntry<S::Identity>,
) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (i, cand) in candidates.iter().enumerate() {
        if cand.kind != target_entry.kind {
            continue;
        }
        if let Some(dist) = S::identity_distance(&cand.identity, &target_entry.identity) {
            if best.map_or(true, |(_, best_dist)| dist < best_dist) {
                best = Some((i, dist));
            }
        }
    }
    best.map(|(i, _)| i)
}

/// Recursive worker behind [`diff`]. `source: None` means "diff against
/// the empty tree" (an add-from-scratch subtree, spec §4.2 "Add").
fn delta_dirs<S, E>(
    source: Option<&S>,
    target: &S,
    source_path: &str,
    parent: &E::DirBaton,
    editor: &mut E,
    cancel: &mut dyn CancelCheck,
    arena: &mut ScratchArena,
) -> CoreResult<()>
where
    S: NodeSnapshot,
    E: Editor,
{
    log::trace!("entering directory {:?}", source_path);

    let source_props = match source {
        Some(s) => s.properties()?,
        None => Vec::new(),
    };
    let target_props = target.properties()?;
    for (name, value) in diff_properties(&source_props, &target_props) {
        editor.change_dir_prop(parent, name, value)?;
    }

    let source_entries = match source {
        Some(s) => s.entries()?,
        None => Vec::new(),
    };
    let target_entries = target.entries()?;

    let (mut si, mut ti) = (0, 0);
    while si < source_entries.len() || ti < target_entries.len() {
        cancel::check(cancel)?;
        match (source_entries.get(si), target_entries.get(ti)) {
            (Some(se), Some(te)) if se.name == te.name => {
                for (name, value) in diff_properties(&se.dirent_properties, &te.dirent_properties) {
                    editor.change_dirent_prop(parent, &te.name, name, value)?;
                }
                if se.identity != te.identity {
                    replace(
                        source.expect("source entry present implies source snapshot present"),
                        target,
                        source_path,
                        &source_entries,
                        se,
                        te,
                        parent,
                        editor,
                        cancel,
                        arena,
                    )?;
                }
                si += 1;
                ti += 1;
            }
            (Some(se), Some(te)) if se.name < te.name => {
                editor.delete(&se.name, parent)?;
                si += 1;
                let _ = te;
            }
            (Some(se), Some(_)) => {
                // se.name > te.name: target-only, fall through to add below.
                let _ = se;
                add(target, &target_entries[ti], parent, editor, cancel, arena)?;
                ti += 1;
            }
            (Some(se), None) => {
                editor.delete(&se.name, parent)?;
                si += 1;
            }
            (None, Some(te)) => {
                add(target, te, parent, editor, cancel, arena)?;
                ti += 1;
            }
            (None, None) => unreachable!(),
        }
    }

    log::trace!("leaving directory {:?}", source_path);
    Ok(())
}

fn add<S, E>(
    target: &S,
    entry: &DirEntry<S::Identity>,
    parent: &E::DirBaton,
    editor: &mut E,
    cancel: &mut dyn CancelCheck,
    arena: &mut ScratchArena,
) -> CoreResult<()>
where
    S: NodeSnapshot,
    E: Editor,
{
    let child = target.child(&entry.name)?;
    match entry.kind {
        NodeKind::File => {
            let file_baton = editor.add_file(&entry.name, parent)?;
            emit_file_body(None, &child, &file_baton, editor, cancel)?;
            editor.close_file(file_baton)
        }
        NodeKind::Dir => {
            let dir_baton = editor.add_directory(&entry.name, parent)?;
            delta_dirs(None, &child, "", &dir_baton, editor, cancel, arena)?;
            editor.close_directory(dir_baton)
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn replace<S, E>(
    source: &S,
    target: &S,
    source_path: &str,
    source_entries: &[DirEntry<S::Identity>],
    matched_source_entry: &DirEntry<S::Identity>,
    target_entry: &DirEntry<S::Identity>,
    parent: &E::DirBaton,
    editor: &mut E,
    cancel: &mut dyn CancelCheck,
    arena: &mut ScratchArena,
) -> CoreResult<()>
where
    S: NodeSnapshot,
    E: Editor,
{
    let _ = matched_source_entry;
    let ancestor_idx = find_ancestor::<S>(source_entries, target_entry);
    let ancestor = ancestor_idx.map(|i| &source_entries[i]);
    let target_child = target.child(&target_entry.name)?;

    match target_entry.kind {
        NodeKind::File => {
            let (ancestor_path, ancestor_child) = match ancestor {
                Some(a) => {
                    let path = RelpathBuf::from_str(arena.join_path(source_path, &a.name));
                    (Some(path), Some(source.child(&a.name)?))
                }
                None => (None, None),
            };
            let ancestor_arg: Ancestor<'_> = ancestor_path
                .as_ref()
                .map(|p| (p.as_relpath(), source.revision()));
            let file_baton = editor.replace_file(&target_entry.name, parent, ancestor_arg)?;
            emit_file_body(ancestor_child.as_ref(), &target_child, &file_baton, editor, cancel)?;
            editor.close_file(file_baton)
        }
        NodeKind::Dir => {
            let (ancestor_path, ancestor_child) = match ancestor {
                Some(a) => {
                    let path = RelpathBuf::from_str(arena.join_path(source_path, &a.name));
                    (Some(path), Some(source.child(&a.name)?))
                }
                None => (None, None),
            };
            let ancestor_arg: Ancestor<'_> = ancestor_path
                .as_ref()
                .map(|p| (p.as_relpath(), source.revision()));
            let dir_baton = editor.replace_directory(&target_entry.name, parent, ancestor_arg)?;
            let next_source_path = ancestor_path.as_deref().map(|p| p.as_str()).unwrap_or("");
            delta_dirs(
                ancestor_child.as_ref(),
                &target_child,
                next_source_path,
                &dir_baton,
                editor,
                cancel,
                arena,
            )?;
            editor.close_directory(dir_baton)
        }
    }
}

/// Shared by `add` and `replace`: diffs a file's own properties, then
/// (only if content actually differs) delivers a single text-delta window
/// with the target's full content.
fn emit_file_body<S, E>(
    ancestor: Option<&S>,
    target_child: &S,
    file_baton: &E::FileBaton,
    editor: &mut E,
    cancel: &mut dyn CancelCheck,
) -> CoreResult<()>
where
    S: NodeSnapshot,
    E: Editor,
{
    let ancestor_props = match ancestor {
        Some(a) => a.properties()?,
        None => Vec::new(),
    };
    let target_props = target_child.properties()?;
    for (name, value) in diff_properties(&ancestor_props, &target_props) {
        editor.change_file_prop(file_baton, name, value)?;
    }

    let ancestor_content = match ancestor {
        Some(a) => a.content()?,
        None => Vec::new(),
    };
    let target_content = target_child.content()?;
    if ancestor_content != target_content {
        cancel::check(cancel)?;
        let mut handler = editor.apply_textdelta(file_baton, &ancestor_content)?;
        handler.window(&target_content)?;
        handler.close()?;
    }
    Ok(())
}
