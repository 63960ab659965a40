// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interactive and visual regions of nodes and paths.

use kurbo::Rect;
use understory_region::Region;
use understory_scene::{NodeId, PointerAreas, Scene};

use crate::path::ScenePath;

/// The area of `id` and its pickable subtree, in `id`'s local coordinates.
///
/// The union of:
/// - the declared touch area, when `areas` contains [`PointerAreas::TOUCH`];
/// - the declared mouse area, when `areas` contains [`PointerAreas::MOUSE`];
/// - the node's self shape;
/// - for each visible, pickable child, its own region mapped by the child's
///   transform.
///
/// When the node has a clip the union is intersected with it. Parts whose
/// bounds miss the clip bounds are left out before their regions are built,
/// and clipped children lying outside are not visited at all.
#[must_use]
pub fn region_of_node(scene: &Scene, id: NodeId, areas: PointerAreas) -> Region {
    region_within(scene, id, areas, None)
}

// `cull` is a conservative bound, in `id`'s local space, of what the enclosing
// clips let through. `None` means unbounded.
fn region_within(scene: &Scene, id: NodeId, areas: PointerAreas, cull: Option<Rect>) -> Region {
    let Some(node) = scene.node(id) else {
        return Region::EMPTY;
    };
    let cull = match &node.clip {
        Some(clip) => match clip.bounds() {
            Some(clip_bounds) => Some(cull.map_or(clip_bounds, |c| c.intersect(clip_bounds))),
            None => return Region::EMPTY,
        },
        None => cull,
    };
    let keep =
        |bounds: Option<Rect>| bounds.is_some_and(|b| cull.is_none_or(|c| overlaps(b, c)));
    let mut parts: Vec<Region> = Vec::new();

    if areas.contains(PointerAreas::TOUCH)
        && let Some(area) = &node.touch_area
        && keep(area.bounds())
    {
        parts.push(area.clone());
    }
    if areas.contains(PointerAreas::MOUSE)
        && let Some(area) = &node.mouse_area
        && keep(area.bounds())
    {
        parts.push(area.clone());
    }
    if keep(node.content.bounds()) {
        parts.push(node.content.self_region());
    }

    for &child_id in scene.children_of(id) {
        let Some(child) = scene.node(child_id) else {
            continue;
        };
        if !child.is_visible() || !child.is_pickable() {
            continue;
        }
        let child_cull = match cull {
            Some(c) => {
                let mapped = child.transform.inverse().transform_rect_bbox(c);
                // A singular transform collapses the child's region anyway.
                if !mapped.is_finite() {
                    continue;
                }
                if child
                    .clip
                    .as_ref()
                    .is_some_and(|clip| !clip.bounds().is_some_and(|b| overlaps(b, mapped)))
                {
                    continue;
                }
                Some(mapped)
            }
            None => None,
        };
        let region = region_within(scene, child_id, areas, child_cull).transform(child.transform);
        if keep(region.bounds()) {
            parts.push(region);
        }
    }

    let union = Region::union_all(parts);
    match &node.clip {
        Some(clip) => union.intersect(clip),
        None => union,
    }
}

/// The region of the terminal of `path`, in the root's parent coordinates.
///
/// Walks from the terminal to the root, applying each node's clip and then
/// its transform.
#[must_use]
pub fn region_of_path(scene: &Scene, path: &ScenePath, areas: PointerAreas) -> Region {
    let Some(terminal) = path.terminal() else {
        return Region::EMPTY;
    };
    let mut region = region_of_node(scene, terminal, areas);
    for &id in path.nodes().iter().rev() {
        let Some(node) = scene.node(id) else {
            return Region::EMPTY;
        };
        if let Some(clip) = &node.clip {
            region = region.intersect(clip);
        }
        region = region.transform(node.transform);
    }
    region
}

fn overlaps(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}
