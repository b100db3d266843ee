//! In-memory `NodeSnapshot` and `Editor` fixtures (feature `memtree`,
//! default-on), so `diff` is testable end-to-end without a real repository
//! backend.
//!
//! Grounded on the teacher's `rom::Source`: a flat listing builds a
//! `Node::{File,Dir}` tree via sorted insertion
//! (`subnodes.binary_search_by`), walked by name at lookup time. These are
//! test fixtures, not a storage format or wire protocol — the spec's
//! non-goals (persistent storage, network transport) still hold.
use std::rc::Rc;

use crate::error::{CoreError, CoreResult};

use super::editor::{Ancestor, Editor, TextDeltaHandler};
use super::snapshot::{DirEntry, NodeKind, NodeSnapshot};

/// Opaque node identity for the in-memory fixture: `lineage` is stable
/// across edits to the same historical node (renames, property/content
/// changes), `touch` bumps on every edit. Two identities compare equal iff
/// both fields match; `identity_distance` treats different lineages as
/// wholly unrelated (spec's "unrelated" sentinel), same lineage as a
/// distance proportional to how many edits apart they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemIdentity {
    pub lineage: u64,
    pub touch: u64,
}

impl MemIdentity {
    pub const fn new(lineage: u64, touch: u64) -> MemIdentity {
        MemIdentity { lineage, touch }
    }
}

#[derive(Clone)]
enum MemNode {
    File {
        content: Rc<Vec<u8>>,
        properties: Rc<Vec<(String, Vec<u8>)>>,
        identity: MemIdentity,
    },
    Dir {
        children: Rc<Vec<(String, MemNode)>>,
        properties: Rc<Vec<(String, Vec<u8>)>>,
        identity: MemIdentity,
    },
}

impl MemNode {
    fn kind(&self) -> NodeKind {
        match self {
            MemNode::File { .. } => NodeKind::File,
            MemNode::Dir { .. } => NodeKind::Dir,
        }
    }

    fn identity(&self) -> MemIdentity {
        match self {
            MemNode::File { identity, .. } | MemNode::Dir { identity, .. } => *identity,
        }
    }
}

/// An immutable in-memory tree plus the revision it represents, pinned at
/// construction time — every [`MemSnapshot`] derived from it reports that
/// same revision.
#[derive(Clone)]
pub struct MemTree {
    root: MemNode,
    revision: u64,
}

/// One listing entry: an absolute-from-root relpath string, file content
/// (empty for directories — directories are inferred from intermediate
/// path components, matching the teacher's listing convention), and the
/// node's identity.
pub struct MemListingEntry<'a> {
    pub path: &'a str,
    pub content: &'a [u8],
    pub identity: MemIdentity,
}

impl MemTree {
    /// Builds a tree from a flat listing, mirroring `rom::Source::new`'s
    /// sorted-insertion walk. Panics on a malformed listing (duplicate
    /// path, a file nested under another file) — these are caller bugs,
    /// not data this fixture is meant to validate.
    pub fn from_listing(listing: &[MemListingEntry<'_>], revision: u64) -> MemTree {
        #[derive(Clone)]
        enum Building {
            File(Rc<Vec<u8>>, MemIdentity),
            Dir(Vec<(String, Building)>, MemIdentity),
        }

        fn dir_identity() -> MemIdentity {
            MemIdentity::new(0, 0)
        }

        let mut root: Vec<(String, Building)> = Vec::new();
        for entry in listing {
            let segments: Vec<&str> = entry.path.split('/').filter(|s| !s.is_empty()).collect();
            assert!(
                !segments.is_empty(),
                "BUG: memtree listing contained an empty/root path"
            );
            let mut level = &mut root;
            for seg in &segments[..segments.len() - 1] {
                let idx = match level.iter().position(|(n, _)| n == seg) {
                    Some(i) => i,
                    None => {
                        level.push((seg.to_string(), Building::Dir(Vec::new(), dir_identity())));
                        level.len() - 1
                    }
                };
                match &mut level[idx].1 {
                    Building::Dir(children, _) => level = children,
                    Building::File(..) => panic!(
                        "BUG: memtree listing placed {:?} under a file",
                        entry.path
                    ),
                }
            }
            let last = segments[segments.len() - 1];
            assert!(
                !level.iter().any(|(n, _)| n == last),
                "BUG: memtree listing contained duplicate path {:?}",
                entry.path
            );
            level.push((
                last.to_string(),
                Building::File(Rc::new(entry.content.to_vec()), entry.identity),
            ));
        }

        fn finish(mut children: Vec<(String, Building)>) -> Vec<(String, MemNode)> {
            children.sort_by(|a, b| a.0.cmp(&b.0));
            children
                .into_iter()
                .map(|(name, node)| {
                    let node = match node {
                        Building::File(content, identity) => MemNode::File {
                            content,
                            properties: Rc::new(Vec::new()),
                            identity,
                        },
                        Building::Dir(children, identity) => MemNode::Dir {
                            children: Rc::new(finish(children)),
                            properties: Rc::new(Vec::new()),
                            identity,
                        },
                    };
                    (name, node)
                })
                .collect()
        }

        MemTree {
            root: MemNode::Dir {
                children: Rc::new(finish(root)),
                properties: Rc::new(Vec::new()),
                identity: dir_identity(),
            },
            revision,
        }
    }

    pub fn root_snapshot(&self) -> MemSnapshot {
        MemSnapshot {
            node: self.root.clone(),
            revision: self.revision,
        }
    }
}

#[derive(Clone)]
pub struct MemSnapshot {
    node: MemNode,
    revision: u64,
}

impl NodeSnapshot for MemSnapshot {
    type Identity = MemIdentity;

    fn kind(&self) -> NodeKind {
        self.node.kind()
    }

    fn revision(&self) -> u64 {
        self.revision
    }

    fn identity(&self) -> MemIdentity {
        self.node.identity()
    }

    fn properties(&self) -> CoreResult<Vec<(String, Vec<u8>)>> {
        match &self.node {
            MemNode::File { properties, .. } | MemNode::Dir { properties, .. } => {
                Ok((**properties).clone())
            }
        }
    }

    fn entries(&self) -> CoreResult<Vec<DirEntry<MemIdentity>>> {
        match &self.node {
            MemNode::Dir { children, .. } => Ok(children
                .iter()
                .map(|(name, node)| DirEntry {
                    name: name.clone(),
                    kind: node.kind(),
                    identity: node.identity(),
                    dirent_properties: Vec::new(),
                })
                .collect()),
            MemNode::File { .. } => Ok(Vec::new()),
        }
    }

    fn child(&self, name: &str) -> CoreResult<MemSnapshot> {
        match &self.node {
            MemNode::Dir { children, .. } => children
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, node)| MemSnapshot {
                    node: node.clone(),
                    revision: self.revision,
                })
                .ok_or_else(|| CoreError::BadFilename {
                    path: name.to_string(),
                    reason: "no such child in memtree snapshot",
                }),
            MemNode::File { .. } => Err(CoreError::BadFilename {
                path: name.to_string(),
                reason: "cannot look up a child of a file",
            }),
        }
    }

    fn content(&self) -> CoreResult<Vec<u8>> {
        match &self.node {
            MemNode::File { content, .. } => Ok((**content).clone()),
            MemNode::Dir { .. } => Ok(Vec::new()),
        }
    }

    fn identity_distance(a: &MemIdentity, b: &MemIdentity) -> Option<u32> {
        if a.lineage != b.lineage {
            return None;
        }
        Some(a.touch.abs_diff(b.touch) as u32)
    }
}

/// A node in the tree [`GraphEditor`] builds up from an edit stream.
/// Parent-owned children, no back-references — the design note in spec §9
/// steering clear of reference-cycle-prone shared ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub kind: NodeKind,
    pub properties: Vec<(String, Vec<u8>)>,
    pub content: Vec<u8>,
    pub children: Vec<(String, GraphNode)>,
}

impl GraphNode {
    fn new_dir() -> GraphNode {
        GraphNode {
            kind: NodeKind::Dir,
            properties: Vec::new(),
            content: Vec::new(),
            children: Vec::new(),
        }
    }

    fn new_file() -> GraphNode {
        GraphNode {
            kind: NodeKind::File,
            properties: Vec::new(),
            content: Vec::new(),
            children: Vec::new(),
        }
    }
}

fn set_property(props: &mut Vec<(String, Vec<u8>)>, name: &str, value: Option<&[u8]>) {
    match props.binary_search_by(|(n, _)| n.as_str().cmp(name)) {
        Ok(i) => match value {
            Some(v) => props[i].1 = v.to_vec(),
            None => {
                props.remove(i);
            }
        },
        Err(i) => {
            if let Some(v) = value {
                props.insert(i, (name.to_string(), v.to_vec()));
            }
        }
    }
}

/// Builds an in-memory [`GraphNode`] tree from an `Editor` call stream.
/// Batons are root-relative path stacks rather than raw pointers or
/// indices, per spec §9's baton guidance.
pub struct GraphEditor {
    root: GraphNode,
}

impl GraphEditor {
    pub fn new() -> GraphEditor {
        GraphEditor {
            root: GraphNode::new_dir(),
        }
    }

    pub fn into_root(self) -> GraphNode {
        self.root
    }

    fn node_mut(&mut self, path: &[String]) -> &mut GraphNode {
        let mut node = &mut self.root;
        for seg in path {
            node = &mut node
                .children
                .iter_mut()
                .find(|(n, _)| n == seg)
                .unwrap_or_else(|| panic!("BUG: editor baton references missing path {:?}", path))
                .1;
        }
        node
    }

    fn upsert_child(&mut self, parent: &[String], name: &str, new_node: GraphNode) -> Vec<String> {
        let dir = self.node_mut(parent);
        match dir.children.iter().position(|(n, _)| n == name) {
            Some(i) => dir.children[i].1 = new_node,
            None => dir.children.push((name.to_string(), new_node)),
        }
        let mut path = parent.to_vec();
        path.push(name.to_string());
        path
    }
}

impl Default for GraphEditor {
    fn default() -> Self {
        GraphEditor::new()
    }
}

struct WindowHandler<'a> {
    node: &'a mut GraphNode,
}

impl<'a> TextDeltaHandler for WindowHandler<'a> {
    fn window(&mut self, data: &[u8]) -> CoreResult<()> {
        self.node.content = data.to_vec();
        Ok(())
    }

    fn close(&mut self) -> CoreResult<()> {
        Ok(())
    }
}

impl Editor for GraphEditor {
    type DirBaton = Vec<String>;
    type FileBaton = Vec<String>;

    fn replace_root(&mut self) -> CoreResult<Vec<String>> {
        self.root = GraphNode::new_dir();
        Ok(Vec::new())
    }

    fn replace_directory(
        &mut self,
        name: &str,
        parent: &Vec<String>,
        _ancestor: Ancestor<'_>,
    ) -> CoreResult<Vec<String>> {
        Ok(self.upsert_child(parent, name, GraphNode::new_dir()))
    }

    fn add_directory(&mut self, name: &str, parent: &Vec<String>) -> CoreResult<Vec<String>> {
        Ok(self.upsert_child(parent, name, GraphNode::new_dir()))
    }

    fn replace_file(
        &mut self,
        name: &str,
        parent: &Vec<String>,
        _ancestor: Ancestor<'_>,
    ) -> CoreResult<Vec<String>> {
        Ok(self.upsert_child(parent, name, GraphNode::new_file()))
    }

    fn add_file(&mut self, name: &str, parent: &Vec<String>) -> CoreResult<Vec<String>> {
        Ok(self.upsert_child(parent, name, GraphNode::new_file()))
    }

    fn delete(&mut self, name: &str, parent: &Vec<String>) -> CoreResult<()> {
        let dir = self.node_mut(parent);
        dir.children.retain(|(n, _)| n != name);
        Ok(())
    }

    fn change_dir_prop(&mut self, dir: &Vec<String>, name: &str, value: Option<&[u8]>) -> CoreResult<()> {
        set_property(&mut self.node_mut(dir).properties, name, value);
        Ok(())
    }

    fn change_dirent_prop(
        &mut self,
        _parent: &Vec<String>,
        entry_name: &str,
        name: &str,
        _value: Option<&[u8]>,
    ) -> CoreResult<()> {
        log::debug!(
            "change_dirent_prop({:?}, {:?}) not modeled by the in-memory graph fixture",
            entry_name,
            name
        );
        Ok(())
    }

    fn change_file_prop(&mut self, file: &Vec<String>, name: &str, value: Option<&[u8]>) -> CoreResult<()> {
        set_property(&mut self.node_mut(file).properties, name, value);
        Ok(())
    }

    fn apply_textdelta(
        &mut self,
        file: &Vec<String>,
        _ancestor_content: &[u8],
    ) -> CoreResult<Box<dyn TextDeltaHandler + '_>> {
        Ok(Box::new(WindowHandler {
            node: self.node_mut(file),
        }))
    }

    fn close_file(&mut self, _file: Vec<String>) -> CoreResult<()> {
        Ok(())
    }

    fn close_directory(&mut self, _dir: Vec<String>) -> CoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::delta::diff;
    use crate::cancel::NeverCancel;

    fn id(lineage: u64, touch: u64) -> MemIdentity {
        MemIdentity::new(lineage, touch)
    }

    #[test]
    fn null_diff_emits_nothing_but_root() {
        let tree = MemTree::from_listing(
            &[MemListingEntry {
                path: "a",
                content: b"hi",
                identity: id(1, 1),
            }],
            1,
        );
        let source = tree.root_snapshot();
        let target = tree.root_snapshot();
        let mut editor = GraphEditor::new();
        diff(&source, &target, &mut editor, &mut NeverCancel).unwrap();
        let root = editor.into_root();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].1.content, b"hi");
    }

    #[test]
    fn add_only() {
        let source = MemTree::from_listing(&[], 1).root_snapshot();
        let target = MemTree::from_listing(
            &[
                MemListingEntry {
                    path: "a",
                    content: b"A",
                    identity: id(1, 1),
                },
                MemListingEntry {
                    path: "b",
                    content: b"B",
                    identity: id(2, 1),
                },
            ],
            1,
        )
        .root_snapshot();
        let mut editor = GraphEditor::new();
        diff(&source, &target, &mut editor, &mut NeverCancel).unwrap();
        let root = editor.into_root();
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].0, "a");
        assert_eq!(root.children[1].0, "b");
    }

    #[test]
    fn delete_only() {
        let source = MemTree::from_listing(
            &[MemListingEntry {
                path: "a",
                content: b"A",
                identity: id(1, 1),
            }],
            1,
        )
        .root_snapshot();
        let target = MemTree::from_listing(&[], 1).root_snapshot();
        let mut editor = GraphEditor::new();
        diff(&source, &target, &mut editor, &mut NeverCancel).unwrap();
        let root = editor.into_root();
        assert!(root.children.is_empty());
    }

    #[test]
    fn replace_file_with_related_ancestor_emits_textdelta() {
        let source = MemTree::from_listing(
            &[MemListingEntry {
                path: "a",
                content: b"old content",
                identity: id(1, 1),
            }],
            5,
        )
        .root_snapshot();
        let target = MemTree::from_listing(
            &[MemListingEntry {
                path: "a",
                content: b"new content",
                identity: id(1, 2),
            }],
            6,
        )
        .root_snapshot();
        let mut editor = GraphEditor::new();
        diff(&source, &target, &mut editor, &mut NeverCancel).unwrap();
        let root = editor.into_root();
        assert_eq!(root.children[0].1.content, b"new content");
    }

    #[test]
    fn cancel_aborts_before_second_sibling_is_emitted() {
        let source = MemTree::from_listing(&[], 1).root_snapshot();
        let target = MemTree::from_listing(
            &[
                MemListingEntry {
                    path: "a",
                    content: b"A",
                    identity: id(1, 1),
                },
                MemListingEntry {
                    path: "b",
                    content: b"B",
                    identity: id(2, 1),
                },
            ],
            1,
        )
        .root_snapshot();
        let mut editor = GraphEditor::new();
        let mut calls = 0;
        let mut cancel = move || {
            calls += 1;
            calls > 2
        };
        let err = diff(&source, &target, &mut editor, &mut cancel).unwrap_err();
        assert!(matches!(err, CoreError::Cancelled));
        let root = editor.into_root();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].0, "a");
    }

    #[test]
    fn property_only_change_skips_textdelta() {
        let mut source_tree = MemTree::from_listing(
            &[MemListingEntry {
                path: "a",
                content: b"same",
                identity: id(1, 1),
            }],
            1,
        );
        if let MemNode::Dir { children, .. } = &mut source_tree.root {
            let children = Rc::make_mut(children);
            if let MemNode::File { properties, .. } = &mut children[0].1 {
                *properties = Rc::new(vec![("svn:mime-type".to_string(), b"text/plain".to_vec())]);
            }
        }
        let source = source_tree.root_snapshot();

        let mut target_tree = MemTree::from_listing(
            &[MemListingEntry {
                path: "a",
                content: b"same",
                identity: id(1, 2),
            }],
            2,
        );
        if let MemNode::Dir { children, .. } = &mut target_tree.root {
            let children = Rc::make_mut(children);
            if let MemNode::File { properties, .. } = &mut children[0].1 {
                *properties = Rc::new(vec![("svn:mime-type".to_string(), b"text/html".to_vec())]);
            }
        }
        let target = target_tree.root_snapshot();

        let mut editor = GraphEditor::new();
        diff(&source, &target, &mut editor, &mut NeverCancel).unwrap();
        let root = editor.into_root();
        assert_eq!(root.children[0].1.content, b"same");
        assert_eq!(
            root.children[0].1.properties,
            vec![("svn:mime-type".to_string(), b"text/html".to_vec())]
        );
    }
}
