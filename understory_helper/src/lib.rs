// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_helper --heading-base-level=0

//! Understory Helper: an inspection overlay engine for retained scenes.
//!
//! The helper answers "what is under the pointer, and what exactly is its
//! shape?" for an [`understory_scene::Scene`], and keeps outline views of the
//! scene and its accessibility tree in sync without rebuilding them.
//!
//! - [`ScenePath`]: root-to-node identity. Scenes are DAGs, so a path (not a
//!   node id) names what the user hovers, selects and sees highlighted.
//! - [`hit_test`]: interaction picking (the scene's own picking with listener
//!   preference and redirection) or visual picking (frontmost
//!   non-transparent paint), chosen by [`PickingMode`].
//! - [`region_of_node`] and [`region_of_path`]: the exact interactive area of
//!   a node and its subtree as a [`Region`](understory_region::Region), under
//!   composed transforms and clips.
//! - [`TreeMirror`]: a lazily materialized shadow tree over any
//!   [`MirrorSource`], with expand/collapse, lookup by path, and hover and
//!   selection highlights.
//! - [`HelperSession`]: the overlay lifecycle. It pauses the host through
//!   [`HelperHost`], runs the per-frame loop, and samples pixel colors from a
//!   decoded snapshot.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Point, Rect, Shape};
//! use peniko::Color;
//! use understory_helper::{PickingMode, hit_test, region_of_path};
//! use understory_scene::{Content, Node, PaintedPath, Scene};
//!
//! let mut scene = Scene::new();
//! let root = scene.insert(Node::default());
//! let square = scene.insert(Node {
//!     content: Content::Path(
//!         PaintedPath::new(Rect::new(0.0, 0.0, 100.0, 100.0).to_path(0.1)).with_fill(Color::WHITE),
//!     ),
//!     ..Node::default()
//! });
//! scene.add_child(root, square).unwrap();
//!
//! let path = hit_test(&scene, root, Point::new(50.0, 50.0), PickingMode::Visual).unwrap();
//! assert_eq!(path.terminal(), Some(square));
//!
//! let region = region_of_path(&scene, &path, PickingMode::Visual.areas());
//! assert!(region.contains(Point::new(99.0, 1.0)));
//! assert!(!region.contains(Point::new(101.0, 1.0)));
//! ```
//!
//! This crate uses `std`; logging goes through the [`log`] facade and no
//! logger is installed.

mod hit;
mod mirror;
mod path;
mod region;
mod report;
mod session;
mod snapshot;

pub use hit::{PickingMode, hit_test, interaction_hit_test, visual_hit_test};
pub use mirror::{
    AccessMirror, AccessMirrorSource, Highlight, MirrorId, MirrorNode, MirrorOptions,
    MirrorSource, SceneMirror, SceneMirrorSource, TreeMirror,
};
pub use path::ScenePath;
pub use region::{region_of_node, region_of_path};
pub use report::NodeReport;
pub use session::{
    HelperHost, HelperOptions, HelperSession, MirrorKind, OverlayHandle, SceneFrame,
    SnapshotTicket, Subscription, SubscriptionKind,
};
pub use snapshot::{Snapshot, SnapshotError, color_hex};
