// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_scene --heading-base-level=0

//! Understory Scene: a retained scene of painted, transformed, clipped nodes.
//!
//! This crate is the host side of scene inspection. It owns the node data that
//! renderers paint and that inspection tools read:
//!
//! - [`Scene`]: a generational arena of [`Node`]s with ordered child lists.
//!   The scene is a DAG; a node may appear under several parents.
//! - [`Node`]: local transform, optional clip [`Region`](understory_region::Region),
//!   [`NodeFlags`], opacity, self [`Content`], declared mouse/touch pointer
//!   areas, and attached [`InputListener`]s.
//! - [`Content`]: nothing, a [`PaintedPath`] (fill and stroke paints from
//!   `peniko`), or a host [`Drawable`] capability with its own containment.
//! - [`Scene::pick`]: the host's own picking, honoring pickability, clips and
//!   the requested [`PointerAreas`].
//! - [`AccessTree`]: the accessibility tree, whose instances carry the scene
//!   trail that produced them.
//!
//! Structural edits (`add_child`, `insert_child`, `remove_child`, `remove`)
//! bump a per-node [`Scene::children_revision`] so that observers can
//! resynchronize only the child lists that actually changed.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Rect, Shape};
//! use peniko::Color;
//! use understory_scene::{Content, Node, PaintedPath, PickOptions, Scene};
//!
//! let mut scene = Scene::new();
//! let root = scene.insert(Node::default());
//! let square = scene.insert(Node {
//!     content: Content::Path(
//!         PaintedPath::new(Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1)).with_fill(Color::BLACK),
//!     ),
//!     ..Node::default()
//! });
//! scene.add_child(root, square).unwrap();
//!
//! let hit = scene.pick(root, Point::new(5.0, 5.0), PickOptions::default());
//! assert_eq!(hit, Some(vec![root, square]));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod access;
mod content;
mod scene;
mod types;

pub use access::{AccessId, AccessNode, AccessTree};
pub use content::{Content, Drawable, PaintedPath, StrokePaint, brush_is_transparent};
pub use scene::{Node, PickOptions, Scene, contains_inclusive, to_local};
pub use types::{InputListener, NodeFlags, NodeId, PointerAreas, SceneError};
