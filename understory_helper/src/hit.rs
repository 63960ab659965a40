// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer hit testing against a scene.
//!
//! Two strategies are offered, selected by [`PickingMode`]:
//!
//! - **Interaction**: ask the scene's own picking what would receive input,
//!   then optionally walk up to the nearest node with listeners and follow
//!   listener targets.
//! - **Visual**: find the frontmost node that actually paints something
//!   non-transparent under the point, regardless of interactivity.

use kurbo::Point;
use understory_scene::{NodeId, PickOptions, PointerAreas, Scene, contains_inclusive, to_local};

use crate::path::ScenePath;

/// How the helper decides what is under the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickingMode {
    /// Frontmost painted content; listeners and pickability are ignored.
    Visual,
    /// What the scene's own picking would deliver input to.
    Interaction {
        /// Declared pointer areas to honor. Empty means geometry only.
        areas: PointerAreas,
        /// Walk up from the hit to the nearest node with listeners.
        prefer_listeners: bool,
    },
}

impl Default for PickingMode {
    fn default() -> Self {
        Self::Interaction {
            areas: PointerAreas::MOUSE,
            prefer_listeners: true,
        }
    }
}

impl PickingMode {
    /// The pointer areas this mode uses for region computation.
    #[must_use]
    pub fn areas(self) -> PointerAreas {
        match self {
            Self::Visual => PointerAreas::empty(),
            Self::Interaction { areas, .. } => areas,
        }
    }
}

/// Hit test `pt` (root parent coordinates) under `root` using `mode`.
#[must_use]
pub fn hit_test(scene: &Scene, root: NodeId, pt: Point, mode: PickingMode) -> Option<ScenePath> {
    match mode {
        PickingMode::Visual => visual_hit_test(scene, root, pt),
        PickingMode::Interaction {
            areas,
            prefer_listeners,
        } => interaction_hit_test(scene, root, pt, areas, prefer_listeners),
    }
}

/// Interaction-based hit test.
///
/// Delegates to [`Scene::pick`]. With `prefer_listeners`, trailing nodes that
/// have no listeners are dropped; if none remain the result is `None`. When
/// the surviving terminal's first listener targets an ancestor on the same
/// path, the path is truncated to that ancestor.
#[must_use]
pub fn interaction_hit_test(
    scene: &Scene,
    root: NodeId,
    pt: Point,
    areas: PointerAreas,
    prefer_listeners: bool,
) -> Option<ScenePath> {
    let trail = scene.pick(root, pt, PickOptions { areas })?;
    let mut path = ScenePath::from_nodes(scene, &trail)?;
    if !prefer_listeners {
        return Some(path);
    }
    loop {
        let terminal = path.terminal()?;
        let node = scene.node(terminal)?;
        if let Some(listener) = node.listeners.first() {
            if let Some(target) = listener.target
                && target != terminal
                && let Some(redirected) = path.subpath_to(target)
            {
                path = redirected;
            }
            return Some(path);
        }
        path = path.without_descendant();
    }
}

/// Visual hit test: the frontmost node painting non-transparent content at `pt`.
///
/// Pickability, listeners and pointer areas are ignored. Invisible subtrees and
/// clips still exclude. A node's self test is a bounds pre-check followed by
/// exact painted containment; the bounds check alone never counts as a hit.
#[must_use]
pub fn visual_hit_test(scene: &Scene, root: NodeId, pt: Point) -> Option<ScenePath> {
    let mut trail: Vec<(NodeId, usize)> = Vec::new();
    if !visual_recursive(scene, root, 0, pt, &mut trail) {
        return None;
    }
    let mut path = ScenePath::new();
    for &(id, index) in trail.iter().rev() {
        path = path.with_descendant(id, index);
    }
    debug_assert!(path.is_valid(scene), "visual hit path is not parent-child linked");
    Some(path)
}

/// Pushes `(node, index_in_parent)` leaf first.
fn visual_recursive(
    scene: &Scene,
    id: NodeId,
    index: usize,
    pt: Point,
    out: &mut Vec<(NodeId, usize)>,
) -> bool {
    let Some(node) = scene.node(id) else {
        return false;
    };
    if !node.is_visible() {
        return false;
    }
    let Some(local) = to_local(node.transform, pt) else {
        return false;
    };
    if !node.clip_contains(local) {
        return false;
    }
    let children = scene.children_of(id);
    for (i, &child) in children.iter().enumerate().rev() {
        if visual_recursive(scene, child, i, local, out) {
            out.push((id, index));
            return true;
        }
    }
    let hit = node
        .self_bounds()
        .is_some_and(|bounds| contains_inclusive(bounds, local))
        && node.content.contains_painted(local);
    if hit {
        out.push((id, index));
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Rect, Shape};
    use peniko::Color;
    use understory_scene::{Content, InputListener, Node, NodeFlags, PaintedPath};

    fn filled(rect: Rect, color: Color) -> Node {
        Node {
            content: Content::Path(PaintedPath::new(rect.to_path(0.1)).with_fill(color)),
            ..Node::default()
        }
    }

    #[test]
    fn visual_ignores_pickability_but_not_visibility() {
        let mut scene = Scene::new();
        let root = scene.insert(Node::default());
        let child = scene.insert(Node {
            flags: NodeFlags::VISIBLE,
            ..filled(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK)
        });
        scene.add_child(root, child).unwrap();
        let pt = Point::new(5.0, 5.0);
        assert_eq!(
            visual_hit_test(&scene, root, pt).and_then(|p| p.terminal()),
            Some(child)
        );
        assert!(interaction_hit_test(&scene, root, pt, PointerAreas::empty(), false).is_none());

        scene.node_mut(child).unwrap().flags = NodeFlags::empty();
        assert!(visual_hit_test(&scene, root, pt).is_none());
    }

    #[test]
    fn visual_records_child_indices() {
        let mut scene = Scene::new();
        let root = scene.insert(Node::default());
        let back = scene.insert(filled(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK));
        let front = scene.insert(filled(Rect::new(20.0, 0.0, 30.0, 10.0), Color::BLACK));
        scene.add_child(root, back).unwrap();
        scene.add_child(root, front).unwrap();
        let path = visual_hit_test(&scene, root, Point::new(25.0, 5.0)).unwrap();
        assert_eq!(path.nodes(), &[root, front]);
        assert_eq!(path.index_in_parent(1), Some(1));
        assert!(path.is_valid(&scene));
    }

    #[test]
    fn prefer_listeners_walks_up() {
        let mut scene = Scene::new();
        let root = scene.insert(Node::default());
        let button = scene.insert(Node {
            listeners: vec![InputListener::new()],
            ..Node::default()
        });
        let label = scene.insert(filled(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK));
        scene.add_child(root, button).unwrap();
        scene.add_child(button, label).unwrap();

        let pt = Point::new(5.0, 5.0);
        let raw = interaction_hit_test(&scene, root, pt, PointerAreas::empty(), false).unwrap();
        assert_eq!(raw.terminal(), Some(label));
        let preferred = interaction_hit_test(&scene, root, pt, PointerAreas::empty(), true).unwrap();
        assert_eq!(preferred.nodes(), &[root, button]);

        scene.node_mut(button).unwrap().listeners.clear();
        assert!(interaction_hit_test(&scene, root, pt, PointerAreas::empty(), true).is_none());
    }

    #[test]
    fn listener_target_redirects_to_ancestor() {
        let mut scene = Scene::new();
        let root = scene.insert(Node::default());
        let window = scene.insert(Node::default());
        let handle = scene.insert(filled(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK));
        scene.node_mut(handle).unwrap().listeners = vec![InputListener::targeting(window)];
        scene.add_child(root, window).unwrap();
        scene.add_child(window, handle).unwrap();

        let path = hit_test(&scene, root, Point::new(5.0, 5.0), PickingMode::default()).unwrap();
        assert_eq!(path.nodes(), &[root, window]);
    }

    #[test]
    fn listener_target_off_path_is_ignored() {
        let mut scene = Scene::new();
        let root = scene.insert(Node::default());
        let elsewhere = scene.insert(Node::default());
        let handle = scene.insert(filled(Rect::new(0.0, 0.0, 10.0, 10.0), Color::BLACK));
        scene.node_mut(handle).unwrap().listeners = vec![InputListener::targeting(elsewhere)];
        scene.add_child(root, handle).unwrap();

        let path = hit_test(&scene, root, Point::new(5.0, 5.0), PickingMode::default()).unwrap();
        assert_eq!(path.terminal(), Some(handle));
    }
}
