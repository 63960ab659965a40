// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scene arena, node data, and host picking.

use alloc::vec::Vec;

use hashbrown::HashSet;
use kurbo::{Affine, Point, Rect};
use understory_region::Region;

use crate::content::Content;
use crate::types::{InputListener, NodeFlags, NodeId, PointerAreas, SceneError};

/// Per-node data.
///
/// Children are owned by the [`Scene`], not by the node, so that structural
/// edits go through the scene and bump [`Scene::children_revision`].
#[derive(Clone, Debug)]
pub struct Node {
    /// Optional name shown by inspection tools.
    pub name: Option<alloc::string::String>,
    /// Transform from this node's local space to its parent's space.
    pub transform: Affine,
    /// Optional clip in local coordinates. Applies to self content and children.
    pub clip: Option<Region>,
    /// Visibility and picking flags.
    pub flags: NodeFlags,
    /// Opacity multiplier in `0.0..=1.0`.
    pub opacity: f64,
    /// What the node paints itself.
    pub content: Content,
    /// Declared fine-pointer (mouse) hit area, in local coordinates.
    pub mouse_area: Option<Region>,
    /// Declared coarse-pointer (touch) hit area, in local coordinates.
    pub touch_area: Option<Region>,
    /// Attached interaction listeners.
    pub listeners: Vec<InputListener>,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            name: None,
            transform: Affine::IDENTITY,
            clip: None,
            flags: NodeFlags::default(),
            opacity: 1.0,
            content: Content::None,
            mouse_area: None,
            touch_area: None,
            listeners: Vec::new(),
        }
    }
}

impl Node {
    /// Returns `true` if the node is visible.
    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE)
    }

    /// Returns `true` unless the node is explicitly non-interactive.
    #[inline]
    #[must_use]
    pub fn is_pickable(&self) -> bool {
        self.flags.contains(NodeFlags::PICKABLE)
    }

    /// Local self bounds, if the node paints anything.
    #[inline]
    #[must_use]
    pub fn self_bounds(&self) -> Option<Rect> {
        self.content.bounds()
    }

    /// Returns `true` if `pt` (local coordinates) passes the clip.
    #[inline]
    #[must_use]
    pub fn clip_contains(&self, pt: Point) -> bool {
        self.clip.as_ref().is_none_or(|clip| clip.contains(pt))
    }

    /// The declared area for the requested pointer kinds, mouse first.
    #[must_use]
    pub fn pointer_area(&self, areas: PointerAreas) -> Option<&Region> {
        if areas.contains(PointerAreas::MOUSE)
            && let Some(area) = &self.mouse_area
        {
            return Some(area);
        }
        if areas.contains(PointerAreas::TOUCH)
            && let Some(area) = &self.touch_area
        {
            return Some(area);
        }
        None
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Clone, Debug)]
struct Entry {
    node: Node,
    children: Vec<NodeId>,
    children_revision: u64,
}

/// Options for [`Scene::pick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PickOptions {
    /// Declared pointer areas to honor. Empty means geometry only.
    pub areas: PointerAreas,
}

/// A retained scene of nodes.
///
/// The scene is a DAG: a node may be attached under several parents, and is
/// identified on screen by the root-to-node sequence that reaches it rather
/// than by its [`NodeId`] alone. Edits that would create a cycle are rejected.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
}

impl Scene {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a detached node and return its id.
    pub fn insert(&mut self, node: Node) -> NodeId {
        let entry = Entry {
            node,
            children: Vec::new(),
            children_revision: 0,
        };
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.entry = Some(entry);
            NodeId::new(idx, slot.generation)
        } else {
            let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Slot {
                generation: 1,
                entry: Some(entry),
            });
            NodeId::new(idx, 1)
        }
    }

    /// Remove a node, detaching it from every parent.
    ///
    /// Its children are detached from it but stay alive.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.entry(id)?;
        for slot in &mut self.slots {
            if let Some(entry) = &mut slot.entry
                && let Some(pos) = entry.children.iter().position(|&c| c == id)
            {
                entry.children.remove(pos);
                entry.children_revision += 1;
            }
        }
        let slot = &mut self.slots[id.idx()];
        let entry = slot.entry.take()?;
        self.free_list.push(id.0);
        Some(entry.node)
    }

    /// Returns `true` if `id` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.entry(id).is_some()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    /// Returns `true` if the scene has no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Node data for `id`.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.entry(id).map(|e| &e.node)
    }

    /// Mutable node data for `id`.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.entry_mut(id).map(|e| &mut e.node)
    }

    /// Ordered children of `id` (paint order; last is frontmost).
    ///
    /// Empty for stale ids.
    #[must_use]
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.entry(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// A counter bumped whenever the child list of `id` changes.
    #[must_use]
    pub fn children_revision(&self, id: NodeId) -> u64 {
        self.entry(id).map_or(0, |e| e.children_revision)
    }

    /// Position of `child` within the children of `parent`.
    #[must_use]
    pub fn index_of_child(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.children_of(parent).iter().position(|&c| c == child)
    }

    /// Append `child` to the children of `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let len = self.children_of(parent).len();
        self.insert_child(parent, len, child)
    }

    /// Insert `child` at `index` in the children of `parent`.
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        index: usize,
        child: NodeId,
    ) -> Result<(), SceneError> {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return Err(SceneError::StaleId);
        }
        if self.index_of_child(parent, child).is_some() {
            return Err(SceneError::AlreadyChild);
        }
        if self.is_descendant_or_self(child, parent) {
            return Err(SceneError::Cycle);
        }
        let entry = self.entry_mut(parent).ok_or(SceneError::StaleId)?;
        if index > entry.children.len() {
            return Err(SceneError::IndexOutOfBounds {
                index,
                len: entry.children.len(),
            });
        }
        entry.children.insert(index, child);
        entry.children_revision += 1;
        Ok(())
    }

    /// Detach `child` from `parent`. The child stays alive.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let entry = self.entry_mut(parent).ok_or(SceneError::StaleId)?;
        let pos = entry
            .children
            .iter()
            .position(|&c| c == child)
            .ok_or(SceneError::NotAChild)?;
        entry.children.remove(pos);
        entry.children_revision += 1;
        Ok(())
    }

    /// Returns `true` if `candidate` is `root` or reachable from it.
    #[must_use]
    pub fn is_descendant_or_self(&self, root: NodeId, candidate: NodeId) -> bool {
        if root == candidate {
            return true;
        }
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut stack: Vec<NodeId> = Vec::new();
        stack.push(root);
        while let Some(id) = stack.pop() {
            for &child in self.children_of(id) {
                if child == candidate {
                    return true;
                }
                if seen.insert(child) {
                    stack.push(child);
                }
            }
        }
        false
    }

    /// Host picking: the topmost node under `pt` (in `root`'s parent space).
    ///
    /// Returns the root-to-hit node sequence.
    ///
    /// - Invisible and non-pickable nodes prune their whole subtree.
    /// - Clips reject points outside them, for self content and children.
    /// - Children are tested frontmost first.
    /// - A declared pointer area selected by `options` replaces the self test.
    /// - Otherwise self content is tested geometrically, regardless of paint.
    #[must_use]
    pub fn pick(&self, root: NodeId, pt: Point, options: PickOptions) -> Option<Vec<NodeId>> {
        let mut out = Vec::new();
        if self.pick_recursive(root, pt, options, &mut out) {
            out.reverse();
            Some(out)
        } else {
            None
        }
    }

    /// Pushes the hit path leaf-first into `out`.
    fn pick_recursive(
        &self,
        id: NodeId,
        pt: Point,
        options: PickOptions,
        out: &mut Vec<NodeId>,
    ) -> bool {
        let Some(entry) = self.entry(id) else {
            return false;
        };
        let node = &entry.node;
        if !node.is_visible() || !node.is_pickable() {
            return false;
        }
        let Some(local) = to_local(node.transform, pt) else {
            return false;
        };
        if !node.clip_contains(local) {
            return false;
        }
        for &child in entry.children.iter().rev() {
            if self.pick_recursive(child, local, options, out) {
                out.push(id);
                return true;
            }
        }
        let hit = match node.pointer_area(options.areas) {
            Some(area) => area.contains(local),
            None => {
                node.self_bounds().is_some_and(|b| contains_inclusive(b, local))
                    && node.content.contains_geometry(local)
            }
        };
        if hit {
            out.push(id);
        }
        hit
    }

    fn entry(&self, id: NodeId) -> Option<&Entry> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, id: NodeId) -> Option<&mut Entry> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.entry.as_mut()
    }
}

/// Map a parent-space point into the local space of a node with `transform`.
///
/// `None` when the transform is not invertible.
#[must_use]
pub fn to_local(transform: Affine, pt: Point) -> Option<Point> {
    let det = transform.determinant();
    if !det.is_finite() || det == 0.0 {
        return None;
    }
    let local = transform.inverse() * pt;
    (local.x.is_finite() && local.y.is_finite()).then_some(local)
}

/// Inclusive rectangle containment, used for bounds pre-checks.
#[must_use]
pub fn contains_inclusive(rect: Rect, pt: Point) -> bool {
    pt.x >= rect.x0 && pt.x <= rect.x1 && pt.y >= rect.y0 && pt.y <= rect.y1
}
