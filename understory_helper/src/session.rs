// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The overlay session: activation lifecycle and the per-frame loop.

use kurbo::{Point, Rect, Size};
use peniko::Color;
use understory_region::Region;
use understory_scene::{AccessTree, NodeId, Scene, contains_inclusive};

use crate::hit::{PickingMode, hit_test};
use crate::mirror::{
    AccessMirror, AccessMirrorSource, MirrorId, MirrorOptions, SceneMirror, SceneMirrorSource,
};
use crate::path::ScenePath;
use crate::region::region_of_path;
use crate::report::NodeReport;
use crate::snapshot::{Snapshot, SnapshotError};

/// Event streams the session listens to while active.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SubscriptionKind {
    /// Pointer move, down, and up.
    Pointer,
    /// Frame ticks.
    Frame,
}

/// Host-issued handle for an event subscription.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(pub u64);

/// Host-issued handle for the attached overlay surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OverlayHandle(pub u64);

/// Identifies a snapshot request. Hand it back with the result to
/// [`HelperSession::deliver_snapshot`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SnapshotTicket(u64);

/// Everything the session needs from its host.
pub trait HelperHost {
    /// Stop advancing simulation time.
    fn pause_time(&mut self);
    /// Resume advancing simulation time.
    fn resume_time(&mut self);
    /// Size of the host surface in root coordinates.
    fn surface_size(&self) -> Size;
    /// Start delivering events of `kind` to the session.
    fn subscribe(&mut self, kind: SubscriptionKind) -> Subscription;
    /// Stop delivering events for `subscription`.
    fn unsubscribe(&mut self, subscription: Subscription);
    /// Attach an overlay surface of `size` above the scene.
    fn attach_overlay(&mut self, size: Size) -> OverlayHandle;
    /// Remove the overlay surface.
    fn detach_overlay(&mut self, overlay: OverlayHandle);
    /// Schedule an overlay repaint.
    fn request_repaint(&mut self, overlay: OverlayHandle);
    /// Start capturing the surface. The result is delivered later, together
    /// with `ticket`, through [`HelperSession::deliver_snapshot`].
    fn request_snapshot(&mut self, ticket: SnapshotTicket);
}

/// The host state a frame is computed against.
#[derive(Clone, Copy, Debug)]
pub struct SceneFrame<'a> {
    /// The scene.
    pub scene: &'a Scene,
    /// The inspected root.
    pub root: NodeId,
    /// The accessibility tree, if the host maintains one.
    pub access: Option<&'a AccessTree>,
}

/// Which mirror a row id belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MirrorKind {
    /// The visual scene mirror.
    Visual,
    /// The accessibility mirror.
    Access,
}

/// Session configuration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HelperOptions {
    /// Initial picking mode.
    pub picking: PickingMode,
    /// Options for both mirrors.
    pub mirror: MirrorOptions,
}

#[derive(Clone, Debug)]
struct Active {
    overlay: OverlayHandle,
    subscriptions: Vec<Subscription>,
    surface_size: Size,
}

/// The inspection overlay controller.
///
/// The host owns the session, forwards pointer and frame events to it while
/// it is active, and reads the results back: hovered, selected and preview
/// paths, the highlighted region, both mirror trees, and pointer readouts.
#[derive(Debug)]
pub struct HelperSession {
    options: HelperOptions,
    active: Option<Active>,
    epoch: u64,
    pointer: Option<Point>,
    chrome: Vec<Rect>,
    over_chrome: bool,
    hovered: ScenePath,
    selected: ScenePath,
    region: Region,
    snapshot: Option<Snapshot>,
    visual_mirror: SceneMirror,
    access_mirror: AccessMirror,
}

impl Default for HelperSession {
    fn default() -> Self {
        Self::new(HelperOptions::default())
    }
}

impl HelperSession {
    /// An inactive session.
    #[must_use]
    pub fn new(options: HelperOptions) -> Self {
        Self {
            options,
            active: None,
            epoch: 0,
            pointer: None,
            chrome: Vec::new(),
            over_chrome: false,
            hovered: ScenePath::new(),
            selected: ScenePath::new(),
            region: Region::EMPTY,
            snapshot: None,
            visual_mirror: SceneMirror::new(options.mirror),
            access_mirror: AccessMirror::new(options.mirror),
        }
    }

    /// Returns `true` between [`activate`](Self::activate) and
    /// [`deactivate`](Self::deactivate).
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Pause the host, attach the overlay, subscribe to events, and request a
    /// snapshot. No-op when already active.
    pub fn activate(&mut self, host: &mut dyn HelperHost) {
        if self.is_active() {
            return;
        }
        self.epoch += 1;
        host.pause_time();
        let surface_size = host.surface_size();
        let overlay = host.attach_overlay(surface_size);
        let subscriptions = vec![
            host.subscribe(SubscriptionKind::Pointer),
            host.subscribe(SubscriptionKind::Frame),
        ];
        self.active = Some(Active {
            overlay,
            subscriptions,
            surface_size,
        });
        host.request_snapshot(SnapshotTicket(self.epoch));
        log::debug!("helper activated (epoch {})", self.epoch);
    }

    /// Undo [`activate`](Self::activate) and drop the snapshot and both
    /// mirrors. No-op when inactive.
    pub fn deactivate(&mut self, host: &mut dyn HelperHost) {
        let Some(active) = self.active.take() else {
            return;
        };
        for subscription in active.subscriptions {
            host.unsubscribe(subscription);
        }
        host.detach_overlay(active.overlay);
        host.resume_time();
        self.snapshot = None;
        self.visual_mirror.clear();
        self.access_mirror.clear();
        self.hovered = ScenePath::new();
        self.region = Region::EMPTY;
        self.over_chrome = false;
        log::debug!("helper deactivated (epoch {})", self.epoch);
    }

    /// Activate when inactive, deactivate when active.
    pub fn toggle(&mut self, host: &mut dyn HelperHost) {
        if self.is_active() {
            self.deactivate(host);
        } else {
            self.activate(host);
        }
    }

    /// Record the pointer position (root coordinates).
    pub fn on_pointer_move(&mut self, pt: Point) {
        self.pointer = Some(pt);
    }

    /// Record the pointer position (root coordinates).
    pub fn on_pointer_down(&mut self, pt: Point) {
        self.pointer = Some(pt);
    }

    /// Record the pointer position and, unless it is over the overlay's own
    /// chrome, make the hovered path the selection. An empty hover clears
    /// the selection.
    pub fn on_pointer_up(&mut self, pt: Point) {
        self.pointer = Some(pt);
        if self.is_active() && !self.is_over_chrome(pt) {
            self.set_selected(self.hovered.clone());
        }
    }

    /// Recompute everything for a new frame, then request a repaint.
    ///
    /// Structure is synchronized first, then the hover hit test, the region
    /// of the preview path, and finally the mirror highlights.
    pub fn on_frame(&mut self, host: &mut dyn HelperHost, frame: SceneFrame<'_>) {
        let Some(overlay) = self.active.as_ref().map(|a| a.overlay) else {
            return;
        };
        self.over_chrome = self.pointer.is_some_and(|pt| self.is_over_chrome(pt));

        self.visual_mirror.sync(&SceneMirrorSource {
            scene: frame.scene,
            root: frame.root,
        });
        match frame.access {
            Some(tree) => {
                self.access_mirror.sync(&AccessMirrorSource {
                    tree,
                    scene: frame.scene,
                });
            }
            None => self.access_mirror.clear(),
        }

        if !self.over_chrome {
            self.hovered = self
                .pointer
                .and_then(|pt| hit_test(frame.scene, frame.root, pt, self.options.picking))
                .unwrap_or_default();
        }
        if !self.selected.is_empty() && !self.selected.is_valid(frame.scene) {
            log::debug!("dropping selection that left the scene");
            self.selected = ScenePath::new();
        }

        self.region = region_of_path(frame.scene, self.preview(), self.options.picking.areas());
        self.refresh_highlights();

        host.request_repaint(overlay);
    }

    /// Accept the result of a snapshot request.
    ///
    /// Results for an inactive session or an earlier activation are
    /// discarded. Returns `true` if a snapshot was stored.
    pub fn deliver_snapshot(
        &mut self,
        ticket: SnapshotTicket,
        result: Result<&[u8], SnapshotError>,
    ) -> bool {
        if !self.is_active() || ticket.0 != self.epoch {
            log::debug!("discarding stale snapshot (ticket {})", ticket.0);
            return false;
        }
        match result.and_then(Snapshot::decode_png) {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                true
            }
            Err(err) => {
                log::warn!("helper snapshot unavailable: {err}");
                self.snapshot = None;
                false
            }
        }
    }

    /// Change how the pointer is hit tested. Clears the hover.
    pub fn set_picking_mode(&mut self, mode: PickingMode) {
        self.options.picking = mode;
        self.hovered = ScenePath::new();
        self.refresh_highlights();
    }

    /// The current picking mode.
    #[must_use]
    pub fn picking_mode(&self) -> PickingMode {
        self.options.picking
    }

    /// Register the overlay's own UI rectangles (root coordinates).
    /// Pointer activity over them does not hover or select scene content.
    pub fn set_chrome_bounds(&mut self, chrome: impl IntoIterator<Item = Rect>) {
        self.chrome = chrome.into_iter().collect();
    }

    /// Whether the pointer was over the overlay UI at the last frame.
    #[must_use]
    pub fn is_pointer_over_chrome(&self) -> bool {
        self.over_chrome
    }

    /// Replace the selection.
    ///
    /// Mirror highlights follow immediately, so
    /// [`TreeMirror::focus_selected`](crate::TreeMirror::focus_selected) sees
    /// the new path without waiting for a frame.
    pub fn select(&mut self, path: ScenePath) {
        self.set_selected(path);
    }

    /// Clear the selection.
    pub fn clear_selection(&mut self) {
        self.set_selected(ScenePath::new());
    }

    /// Select the path of a mirror row. Returns `false` for unknown rows.
    pub fn select_mirror_node(&mut self, kind: MirrorKind, id: MirrorId) -> bool {
        let path = match kind {
            MirrorKind::Visual => self.visual_mirror.get(id).map(|n| n.path().clone()),
            MirrorKind::Access => self.access_mirror.get(id).map(|n| n.path().clone()),
        };
        match path {
            Some(path) => {
                self.set_selected(path);
                true
            }
            None => false,
        }
    }

    /// The sticky selection.
    #[must_use]
    pub fn selected(&self) -> &ScenePath {
        &self.selected
    }

    /// The path under the pointer at the last frame.
    #[must_use]
    pub fn hovered(&self) -> &ScenePath {
        &self.hovered
    }

    /// The selection if there is one, else the hover.
    #[must_use]
    pub fn preview(&self) -> &ScenePath {
        if self.selected.is_empty() {
            &self.hovered
        } else {
            &self.selected
        }
    }

    /// The region of the preview path, in root coordinates.
    #[must_use]
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Last pointer position in root coordinates.
    #[must_use]
    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// The pointer in the preview terminal's local coordinates.
    #[must_use]
    pub fn pointer_in_preview(&self, scene: &Scene) -> Option<Point> {
        let preview = self.preview();
        if preview.is_empty() {
            return None;
        }
        preview.global_to_local_point(scene, self.pointer?)
    }

    /// Snapshot color under the pointer.
    #[must_use]
    pub fn pointer_color(&self) -> Option<Color> {
        let size = self.active.as_ref()?.surface_size;
        self.snapshot.as_ref()?.sample(self.pointer?, size)
    }

    /// The current snapshot, if one has been delivered.
    #[must_use]
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Summary of the preview path's terminal.
    #[must_use]
    pub fn node_report(&self, scene: &Scene) -> Option<NodeReport> {
        NodeReport::for_path(scene, self.preview())
    }

    /// The visual mirror.
    #[must_use]
    pub fn visual_mirror(&self) -> &SceneMirror {
        &self.visual_mirror
    }

    /// The visual mirror, for expand and collapse.
    pub fn visual_mirror_mut(&mut self) -> &mut SceneMirror {
        &mut self.visual_mirror
    }

    /// The accessibility mirror.
    #[must_use]
    pub fn access_mirror(&self) -> &AccessMirror {
        &self.access_mirror
    }

    /// The accessibility mirror, for expand and collapse.
    pub fn access_mirror_mut(&mut self) -> &mut AccessMirror {
        &mut self.access_mirror
    }

    fn set_selected(&mut self, path: ScenePath) {
        self.selected = path;
        self.refresh_highlights();
    }

    fn refresh_highlights(&mut self) {
        self.visual_mirror
            .update_highlights(&self.selected, &self.hovered);
        self.access_mirror
            .update_highlights(&self.selected, &self.hovered);
    }

    fn is_over_chrome(&self, pt: Point) -> bool {
        self.chrome.iter().any(|&rect| contains_inclusive(rect, pt))
    }
}
