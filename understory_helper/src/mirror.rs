// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Live shadow trees of the scene and the accessibility tree.
//!
//! A [`TreeMirror`] keeps one [`MirrorNode`] per materialized source node.
//! Children are materialized when a node is first expanded, and kept while
//! it is collapsed. Structure is never rebuilt wholesale: [`TreeMirror::sync`]
//! polls the source's per-node children revisions and reconciles only the
//! child lists that moved, reusing the [`MirrorNode`] (and its [`MirrorId`])
//! of every child that survives.
//!
//! Any tree can be mirrored by implementing [`MirrorSource`]. Two sources are
//! provided: [`SceneMirrorSource`] for the visual scene, and
//! [`AccessMirrorSource`] for the accessibility tree.

use core::fmt::{self, Write as _};
use core::hash::Hash;

use hashbrown::HashMap;
use understory_scene::{AccessId, AccessTree, NodeId, Scene};

use crate::path::ScenePath;

/// A tree that can be mirrored.
pub trait MirrorSource {
    /// Identifier of a source node.
    type Key: Copy + Eq + Hash + fmt::Debug;

    /// The current root, if any.
    fn root(&self) -> Option<Self::Key>;

    /// Ordered children of `key`. Empty for dead keys.
    fn children(&self, key: Self::Key) -> &[Self::Key];

    /// A counter that changes whenever the child list of `key` changes.
    fn children_revision(&self, key: Self::Key) -> u64;

    /// Whether the source node is currently shown.
    fn is_visible(&self, key: Self::Key) -> bool;

    /// Append the row label of `key` to `out`.
    fn write_label(&self, key: Self::Key, out: &mut String);

    /// The scene path identifying `key`, which is child `index` of the node
    /// whose path is `parent` (empty for the root).
    fn path_of(&self, key: Self::Key, parent: &ScenePath, index: usize) -> ScenePath;
}

/// Stable identity of a [`MirrorNode`] for as long as it is materialized.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MirrorId(u64);

/// Row highlight state. Ordered by precedence.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Highlight {
    /// Not highlighted.
    #[default]
    None,
    /// Under the pointer.
    Hovered,
    /// Selected; takes precedence over hover.
    Selected,
}

/// Options for a [`TreeMirror`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MirrorOptions {
    /// Newly built nodes whose source is visible start expanded.
    /// Invisible sources always start collapsed.
    pub expand_visible: bool,
}

impl Default for MirrorOptions {
    fn default() -> Self {
        Self {
            expand_visible: true,
        }
    }
}

/// One materialized node of a [`TreeMirror`].
#[derive(Clone, Debug)]
pub struct MirrorNode<K> {
    id: MirrorId,
    key: K,
    path: ScenePath,
    index: usize,
    expanded: bool,
    materialized: bool,
    children: Vec<MirrorId>,
    children_revision: u64,
    label: String,
    visible: bool,
    highlight: Highlight,
}

impl<K: Copy> MirrorNode<K> {
    /// This node's id.
    #[must_use]
    pub fn id(&self) -> MirrorId {
        self.id
    }

    /// The mirrored source key.
    #[must_use]
    pub fn key(&self) -> K {
        self.key
    }

    /// The scene path this row stands for.
    #[must_use]
    pub fn path(&self) -> &ScenePath {
        &self.path
    }

    /// Position among the source parent's children.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether children are shown.
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Whether children have been built.
    #[must_use]
    pub fn is_materialized(&self) -> bool {
        self.materialized
    }

    /// Materialized children, in source order.
    #[must_use]
    pub fn children(&self) -> &[MirrorId] {
        &self.children
    }

    /// Row label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the source was visible at the last sync.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Current highlight.
    #[must_use]
    pub fn highlight(&self) -> Highlight {
        self.highlight
    }
}

/// A lazily materialized, incrementally synchronized shadow of a tree.
#[derive(Clone, Debug)]
pub struct TreeMirror<K> {
    nodes: HashMap<MirrorId, MirrorNode<K>>,
    root: Option<MirrorId>,
    next_id: u64,
    options: MirrorOptions,
    selected: ScenePath,
    hovered: ScenePath,
}

/// Mirror of the visual scene.
pub type SceneMirror = TreeMirror<NodeId>;

/// Mirror of the accessibility tree.
pub type AccessMirror = TreeMirror<AccessId>;

impl<K> Default for TreeMirror<K> {
    fn default() -> Self {
        Self::new(MirrorOptions::default())
    }
}

impl<K> TreeMirror<K> {
    /// An empty mirror. Call [`sync`](Self::sync) to build it.
    #[must_use]
    pub fn new(options: MirrorOptions) -> Self {
        Self {
            nodes: HashMap::new(),
            root: None,
            next_id: 0,
            options,
            selected: ScenePath::new(),
            hovered: ScenePath::new(),
        }
    }

    /// Drop every node and the remembered highlights.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.selected = ScenePath::new();
        self.hovered = ScenePath::new();
    }

    /// Number of materialized nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` before the first sync or after [`clear`](Self::clear).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root node's id.
    #[must_use]
    pub fn root(&self) -> Option<MirrorId> {
        self.root
    }

    /// Look a node up by id.
    #[must_use]
    pub fn get(&self, id: MirrorId) -> Option<&MirrorNode<K>> {
        self.nodes.get(&id)
    }

    /// Collapse a node. Its children stay materialized.
    pub fn collapse(&mut self, id: MirrorId) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) if node.expanded => {
                node.expanded = false;
                true
            }
            _ => false,
        }
    }

    /// Collapse a node and every materialized descendant.
    pub fn collapse_recursively(&mut self, id: MirrorId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.expanded = false;
                stack.extend_from_slice(&node.children);
            }
        }
    }

    /// Set highlights: the node whose path equals `selected` is
    /// [`Highlight::Selected`], the one equal to `hovered` is
    /// [`Highlight::Hovered`], every other node is cleared.
    ///
    /// The paths are remembered and re-applied after structural changes.
    pub fn update_highlights(&mut self, selected: &ScenePath, hovered: &ScenePath) {
        self.selected = selected.clone();
        self.hovered = hovered.clone();
        self.apply_highlights();
    }

    /// The node whose path equals `path`, descending through materialized
    /// children whose paths are prefixes of it.
    #[must_use]
    pub fn find(&self, path: &ScenePath) -> Option<&MirrorNode<K>> {
        if path.is_empty() {
            return None;
        }
        let mut current = self.nodes.get(&self.root?)?;
        if !path.is_extension_of(&current.path, true) {
            return None;
        }
        loop {
            if current.path == *path {
                return Some(current);
            }
            current = self.next_toward(current, path)?;
        }
    }

    /// Depth-first rows of the expanded frontier, as `(depth, node)`.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<(usize, &MirrorNode<K>)> {
        let mut rows = Vec::new();
        let Some(root) = self.root else {
            return rows;
        };
        let mut stack = vec![(0_usize, root)];
        while let Some((depth, id)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            rows.push((depth, node));
            if node.expanded {
                stack.extend(node.children.iter().rev().map(|&c| (depth + 1, c)));
            }
        }
        rows
    }

    fn next_toward(&self, node: &MirrorNode<K>, path: &ScenePath) -> Option<&MirrorNode<K>> {
        node.children
            .iter()
            .filter_map(|c| self.nodes.get(c))
            .find(|child| !child.path.is_empty() && path.is_extension_of(&child.path, true))
    }

    fn apply_highlights(&mut self) {
        for node in self.nodes.values_mut() {
            node.highlight = if !self.selected.is_empty() && node.path == self.selected {
                Highlight::Selected
            } else if !self.hovered.is_empty() && node.path == self.hovered {
                Highlight::Hovered
            } else {
                Highlight::None
            };
        }
    }

    fn alloc_id(&mut self) -> MirrorId {
        self.next_id += 1;
        MirrorId(self.next_id)
    }

    fn free_subtree(&mut self, id: MirrorId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.remove(&id) {
                stack.extend(node.children);
            }
        }
    }
}

impl<K: Copy + Eq + Hash + fmt::Debug> TreeMirror<K> {
    /// Bring the mirror up to date with `source`.
    ///
    /// Builds the mirror if it is empty or the source root changed. Otherwise
    /// reconciles every materialized node whose children revision moved, and
    /// refreshes labels and visibility. Returns `true` if anything changed.
    pub fn sync<S: MirrorSource<Key = K>>(&mut self, source: &S) -> bool {
        let Some(root_key) = source.root() else {
            let had_nodes = !self.nodes.is_empty();
            self.nodes.clear();
            self.root = None;
            return had_nodes;
        };
        let current = self.root;
        let root = match current {
            Some(root) if self.nodes.get(&root).is_some_and(|n| n.key == root_key) => root,
            _ => {
                self.nodes.clear();
                let path = source.path_of(root_key, &ScenePath::new(), 0);
                let root = self.build(source, root_key, path, 0);
                self.root = Some(root);
                self.apply_highlights();
                return true;
            }
        };

        let mut changed = false;
        let mut label = String::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            let key = node.key;
            label.clear();
            source.write_label(key, &mut label);
            if node.label != label {
                node.label.clone_from(&label);
                changed = true;
            }
            let visible = source.is_visible(key);
            if node.visible != visible {
                node.visible = visible;
                changed = true;
            }
            if node.materialized && node.children_revision != source.children_revision(key) {
                self.reconcile(source, id);
                changed = true;
            }
            if let Some(node) = self.nodes.get(&id) {
                stack.extend_from_slice(&node.children);
            }
        }
        if changed {
            self.apply_highlights();
        }
        changed
    }

    /// Rebuild the child lists of every node mirroring `key`.
    ///
    /// Children that are still present keep their [`MirrorNode`]; new ones
    /// are built and removed ones are dropped with their subtrees.
    pub fn children_changed<S: MirrorSource<Key = K>>(&mut self, source: &S, key: K) {
        let ids: Vec<MirrorId> = self
            .nodes
            .values()
            .filter(|n| n.key == key)
            .map(|n| n.id)
            .collect();
        for id in ids {
            self.reconcile(source, id);
        }
        self.apply_highlights();
    }

    /// Expand a node, materializing its children if needed.
    pub fn expand<S: MirrorSource<Key = K>>(&mut self, source: &S, id: MirrorId) -> bool {
        let Some(node) = self.nodes.get_mut(&id) else {
            return false;
        };
        if node.expanded {
            return false;
        }
        node.expanded = true;
        let materialized = node.materialized;
        let stale = node.children_revision != source.children_revision(node.key);
        if !materialized {
            self.materialize(source, id);
        } else if stale {
            self.reconcile(source, id);
        }
        self.apply_highlights();
        true
    }

    /// Expand a node and every descendant.
    pub fn expand_recursively<S: MirrorSource<Key = K>>(&mut self, source: &S, id: MirrorId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            self.expand(source, id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend_from_slice(&node.children);
            }
        }
    }

    /// Expand the chain of nodes leading to the selected path.
    ///
    /// Returns the deepest node whose path is a prefix of the selection
    /// (the selected node itself when it is reachable).
    pub fn focus_selected<S: MirrorSource<Key = K>>(&mut self, source: &S) -> Option<MirrorId> {
        if self.selected.is_empty() {
            return None;
        }
        let selected = self.selected.clone();
        let mut current = self.root?;
        if !selected.is_extension_of(&self.nodes.get(&current)?.path, true) {
            return None;
        }
        loop {
            let node = self.nodes.get(&current)?;
            if node.path == selected {
                return Some(current);
            }
            self.expand(source, current);
            let node = self.nodes.get(&current)?;
            match self.next_toward(node, &selected) {
                Some(next) => current = next.id,
                None => return Some(current),
            }
        }
    }

    fn build<S: MirrorSource<Key = K>>(
        &mut self,
        source: &S,
        key: K,
        path: ScenePath,
        index: usize,
    ) -> MirrorId {
        let id = self.alloc_id();
        let visible = source.is_visible(key);
        let expanded = visible && self.options.expand_visible;
        let mut label = String::new();
        source.write_label(key, &mut label);
        self.nodes.insert(
            id,
            MirrorNode {
                id,
                key,
                path,
                index,
                expanded,
                materialized: false,
                children: Vec::new(),
                children_revision: 0,
                label,
                visible,
                highlight: Highlight::None,
            },
        );
        if expanded {
            self.materialize(source, id);
        }
        id
    }

    fn materialize<S: MirrorSource<Key = K>>(&mut self, source: &S, id: MirrorId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if node.materialized {
            return;
        }
        let key = node.key;
        let path = node.path.clone();
        let mut children = Vec::new();
        for (index, &child) in source.children(key).iter().enumerate() {
            let child_path = source.path_of(child, &path, index);
            children.push(self.build(source, child, child_path, index));
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = children;
            node.materialized = true;
            node.children_revision = source.children_revision(key);
        }
    }

    fn reconcile<S: MirrorSource<Key = K>>(&mut self, source: &S, id: MirrorId) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if !node.materialized {
            return;
        }
        let key = node.key;
        let path = node.path.clone();
        let mut previous: HashMap<K, MirrorId> = node
            .children
            .iter()
            .filter_map(|c| self.nodes.get(c).map(|child| (child.key, *c)))
            .collect();

        let mut children = Vec::new();
        for (index, &child) in source.children(key).iter().enumerate() {
            let child_path = source.path_of(child, &path, index);
            match previous.remove(&child) {
                Some(existing) => {
                    self.repath(source, existing, child_path, index);
                    children.push(existing);
                }
                None => children.push(self.build(source, child, child_path, index)),
            }
        }
        for (_, stale) in previous {
            self.free_subtree(stale);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.children = children;
            node.children_revision = source.children_revision(key);
        }
    }

    fn repath<S: MirrorSource<Key = K>>(
        &mut self,
        source: &S,
        id: MirrorId,
        path: ScenePath,
        index: usize,
    ) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.index = index;
        if same_indices(&node.path, &path) {
            return;
        }
        node.path = path.clone();
        if node.materialized && node.children_revision != source.children_revision(node.key) {
            // Stale child indices; rebuild the list against the new path.
            self.reconcile(source, id);
            return;
        }
        let children = node.children.clone();
        for child in children {
            let Some(child_node) = self.nodes.get(&child) else {
                continue;
            };
            let child_path = source.path_of(child_node.key, &path, child_node.index);
            let child_index = child_node.index;
            self.repath(source, child, child_path, child_index);
        }
    }
}

fn same_indices(a: &ScenePath, b: &ScenePath) -> bool {
    a == b && (0..a.len()).all(|i| a.index_in_parent(i) == b.index_in_parent(i))
}

/// Mirrors a scene subtree. Keys are [`NodeId`]s.
#[derive(Clone, Copy, Debug)]
pub struct SceneMirrorSource<'a> {
    /// The scene.
    pub scene: &'a Scene,
    /// The mirrored root.
    pub root: NodeId,
}

impl MirrorSource for SceneMirrorSource<'_> {
    type Key = NodeId;

    fn root(&self) -> Option<NodeId> {
        self.scene.is_alive(self.root).then_some(self.root)
    }

    fn children(&self, key: NodeId) -> &[NodeId] {
        self.scene.children_of(key)
    }

    fn children_revision(&self, key: NodeId) -> u64 {
        self.scene.children_revision(key)
    }

    fn is_visible(&self, key: NodeId) -> bool {
        self.scene.node(key).is_some_and(|n| n.is_visible())
    }

    fn write_label(&self, key: NodeId, out: &mut String) {
        let _ = match self.scene.node(key) {
            Some(node) => match &node.name {
                Some(name) => write!(out, "{name} {key}"),
                None => write!(out, "{} {key}", node.content.kind_name()),
            },
            None => write!(out, "{key}"),
        };
    }

    fn path_of(&self, key: NodeId, parent: &ScenePath, index: usize) -> ScenePath {
        debug_assert!(
            parent
                .terminal()
                .is_none_or(|p| self.scene.children_of(p).get(index) == Some(&key)),
            "{key} is not child {index} of the parent path's terminal"
        );
        parent.with_descendant(key, index)
    }
}

/// Mirrors the accessibility tree. Paths come from each instance's trail.
#[derive(Clone, Copy, Debug)]
pub struct AccessMirrorSource<'a> {
    /// The accessibility tree.
    pub tree: &'a AccessTree,
    /// The scene the trails point into.
    pub scene: &'a Scene,
}

impl MirrorSource for AccessMirrorSource<'_> {
    type Key = AccessId;

    fn root(&self) -> Option<AccessId> {
        self.tree.root()
    }

    fn children(&self, key: AccessId) -> &[AccessId] {
        self.tree.children_of(key)
    }

    fn children_revision(&self, key: AccessId) -> u64 {
        self.tree.children_revision(key)
    }

    fn is_visible(&self, key: AccessId) -> bool {
        self.tree
            .node(key)
            .and_then(|n| ScenePath::from_nodes(self.scene, &n.trail))
            .is_some_and(|path| path.is_visible(self.scene))
    }

    fn write_label(&self, key: AccessId, out: &mut String) {
        let Some(node) = self.tree.node(key) else {
            return;
        };
        out.push_str(&node.tag_name);
        if let Some(name) = node.label.as_ref().or(node.content.as_ref()) {
            let _ = write!(out, " \"{name}\"");
        }
    }

    fn path_of(&self, key: AccessId, _parent: &ScenePath, _index: usize) -> ScenePath {
        self.tree
            .node(key)
            .and_then(|n| ScenePath::from_nodes(self.scene, &n.trail))
            .unwrap_or_default()
    }
}
