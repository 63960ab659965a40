// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`ScenePath`]: the identity of a node occurrence on screen.

use core::hash::{Hash, Hasher};

use kurbo::{Affine, Point, Rect};
use smallvec::SmallVec;
use understory_scene::{NodeId, Scene, to_local};

/// An ordered root-to-node sequence of scene nodes.
///
/// Because a node may be attached under several parents, a [`NodeId`] alone
/// does not say *which* occurrence is meant. A path does, and it is the join
/// key between hit testing, region computation, and the tree mirrors.
///
/// Alongside each node the path stores that node's index within its parent.
/// Indices are derived data: equality and hashing consider nodes only.
/// The empty path means "nothing selected".
#[derive(Clone, Debug, Default)]
pub struct ScenePath {
    nodes: SmallVec<[NodeId; 8]>,
    // Parallel to `nodes`; the root's entry is 0.
    indices: SmallVec<[usize; 8]>,
}

impl PartialEq for ScenePath {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Eq for ScenePath {}

impl Hash for ScenePath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.nodes.hash(state);
    }
}

impl ScenePath {
    /// The empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A single-node path rooted at `root`.
    #[must_use]
    pub fn from_root(root: NodeId) -> Self {
        let mut path = Self::new();
        path.nodes.push(root);
        path.indices.push(0);
        path
    }

    /// Build a path from a root-to-node list, recovering child indices.
    ///
    /// Returns `None` if some node is not a current child of its predecessor.
    #[must_use]
    pub fn from_nodes(scene: &Scene, nodes: &[NodeId]) -> Option<Self> {
        let (&root, rest) = nodes.split_first()?;
        if !scene.is_alive(root) {
            return None;
        }
        let mut path = Self::from_root(root);
        for &node in rest {
            let parent = path.terminal()?;
            let index = scene.index_of_child(parent, node)?;
            path.nodes.push(node);
            path.indices.push(index);
        }
        Some(path)
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` for the empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The nodes, root first.
    #[must_use]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// The first node.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// The last node.
    #[must_use]
    pub fn terminal(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Index of the `i`th node within its parent. The root reports 0.
    #[must_use]
    pub fn index_in_parent(&self, i: usize) -> Option<usize> {
        self.indices.get(i).copied()
    }

    /// Returns `true` if `node` occurs anywhere along the path.
    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// Returns `true` if `other` is a prefix of `self`.
    ///
    /// With `allow_equal == false`, `self` must be strictly longer.
    #[must_use]
    pub fn is_extension_of(&self, other: &Self, allow_equal: bool) -> bool {
        let longer = if allow_equal {
            self.len() >= other.len()
        } else {
            self.len() > other.len()
        };
        longer && self.nodes[..other.len()] == other.nodes[..]
    }

    /// A copy extended by `node`, which sits at `index` in the current terminal.
    #[must_use]
    pub fn with_descendant(&self, node: NodeId, index: usize) -> Self {
        let mut path = self.clone();
        path.nodes.push(node);
        path.indices.push(if self.is_empty() { 0 } else { index });
        path
    }

    /// A copy with the terminal removed. The empty path stays empty.
    #[must_use]
    pub fn without_descendant(&self) -> Self {
        let mut path = self.clone();
        path.nodes.pop();
        path.indices.pop();
        path
    }

    /// The prefix ending at the first occurrence of `node`, if it occurs.
    #[must_use]
    pub fn subpath_to(&self, node: NodeId) -> Option<Self> {
        let end = self.nodes.iter().position(|&n| n == node)? + 1;
        Some(Self {
            nodes: self.nodes[..end].iter().copied().collect(),
            indices: self.indices[..end].iter().copied().collect(),
        })
    }

    /// Returns `true` if every consecutive pair is a live parent/child link
    /// at the recorded index.
    #[must_use]
    pub fn is_valid(&self, scene: &Scene) -> bool {
        if let Some(root) = self.root()
            && !scene.is_alive(root)
        {
            return false;
        }
        self.nodes.windows(2).zip(self.indices.iter().skip(1)).all(|(pair, &index)| {
            scene.children_of(pair[0]).get(index) == Some(&pair[1])
        })
    }

    /// The product of local transforms, root first: maps terminal-local
    /// coordinates to the root's parent space.
    ///
    /// Nodes that are no longer alive contribute the identity.
    #[must_use]
    pub fn composed_transform(&self, scene: &Scene) -> Affine {
        self.nodes.iter().fold(Affine::IDENTITY, |acc, &id| {
            acc * scene.node(id).map_or(Affine::IDENTITY, |n| n.transform)
        })
    }

    /// Conjunction of visibility along the path. The empty path is visible.
    #[must_use]
    pub fn is_visible(&self, scene: &Scene) -> bool {
        self.nodes
            .iter()
            .all(|&id| scene.node(id).is_some_and(|n| n.is_visible()))
    }

    /// Product of opacities along the path.
    #[must_use]
    pub fn opacity(&self, scene: &Scene) -> f64 {
        self.nodes
            .iter()
            .map(|&id| scene.node(id).map_or(1.0, |n| n.opacity))
            .product()
    }

    /// Map a terminal-local point to root coordinates.
    #[must_use]
    pub fn local_to_global_point(&self, scene: &Scene, pt: Point) -> Point {
        self.composed_transform(scene) * pt
    }

    /// Map a root-coordinate point into the terminal's local space.
    ///
    /// `None` when the composed transform is singular.
    #[must_use]
    pub fn global_to_local_point(&self, scene: &Scene, pt: Point) -> Option<Point> {
        to_local(self.composed_transform(scene), pt)
    }

    /// The terminal's self bounds mapped to root coordinates.
    #[must_use]
    pub fn global_bounds(&self, scene: &Scene) -> Option<Rect> {
        let bounds = scene.node(self.terminal()?)?.self_bounds()?;
        Some(self.composed_transform(scene).transform_rect_bbox(bounds))
    }
}
