// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node readouts for the inspection panel.

use kurbo::{Affine, Rect};
use understory_scene::{NodeId, Scene};

use crate::path::ScenePath;

/// A summary of the node at the end of a path, for display in an
/// inspection panel.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeReport {
    /// The terminal node.
    pub node: NodeId,
    /// Its debug name, if any.
    pub name: Option<String>,
    /// Content kind, such as `"Path"` or a drawable's name.
    pub kind: String,
    /// Number of ancestors on the path.
    pub depth: usize,
    /// Composed transform from the terminal's local space to root coordinates.
    pub transform: Affine,
    /// Whether every node on the path is visible.
    pub visible: bool,
    /// Product of opacities along the path.
    pub opacity: f64,
    /// Number of attached listeners.
    pub listeners: usize,
    /// Whether the terminal declares a clip.
    pub has_clip: bool,
    /// Self bounds in root coordinates.
    pub global_bounds: Option<Rect>,
}

impl NodeReport {
    /// Report on the terminal of `path`. `None` for the empty path or a dead
    /// terminal.
    #[must_use]
    pub fn for_path(scene: &Scene, path: &ScenePath) -> Option<Self> {
        let id = path.terminal()?;
        let node = scene.node(id)?;
        Some(Self {
            node: id,
            name: node.name.clone(),
            kind: node.content.kind_name().to_owned(),
            depth: path.len() - 1,
            transform: path.composed_transform(scene),
            visible: path.is_visible(scene),
            opacity: path.opacity(scene),
            listeners: node.listeners.len(),
            has_clip: node.clip.is_some(),
            global_bounds: path.global_bounds(scene),
        })
    }
}
