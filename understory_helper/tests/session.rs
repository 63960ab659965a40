// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for the `HelperSession` lifecycle and per-frame loop, driven by a
//! recording host.

use std::io::Cursor;

use image::{ImageOutputFormat, RgbaImage};
use kurbo::{Point, Rect, Shape, Size};
use peniko::Color;
use understory_helper::{
    Highlight, HelperHost, HelperSession, MirrorKind, OverlayHandle, PickingMode,
    SceneMirrorSource, ScenePath, SceneFrame, SnapshotError, SnapshotTicket, Subscription,
    SubscriptionKind, color_hex,
};
use understory_scene::{Content, InputListener, Node, NodeId, PaintedPath, Scene};

#[derive(Debug, Default)]
struct MockHost {
    paused: bool,
    next_handle: u64,
    subscriptions: Vec<(Subscription, SubscriptionKind)>,
    overlay: Option<OverlayHandle>,
    repaints: usize,
    tickets: Vec<SnapshotTicket>,
}

impl HelperHost for MockHost {
    fn pause_time(&mut self) {
        self.paused = true;
    }

    fn resume_time(&mut self) {
        self.paused = false;
    }

    fn surface_size(&self) -> Size {
        Size::new(100.0, 100.0)
    }

    fn subscribe(&mut self, kind: SubscriptionKind) -> Subscription {
        self.next_handle += 1;
        let subscription = Subscription(self.next_handle);
        self.subscriptions.push((subscription, kind));
        subscription
    }

    fn unsubscribe(&mut self, subscription: Subscription) {
        self.subscriptions.retain(|(s, _)| *s != subscription);
    }

    fn attach_overlay(&mut self, _size: Size) -> OverlayHandle {
        self.next_handle += 1;
        let overlay = OverlayHandle(self.next_handle);
        self.overlay = Some(overlay);
        overlay
    }

    fn detach_overlay(&mut self, overlay: OverlayHandle) {
        assert_eq!(self.overlay, Some(overlay));
        self.overlay = None;
    }

    fn request_repaint(&mut self, _overlay: OverlayHandle) {
        self.repaints += 1;
    }

    fn request_snapshot(&mut self, ticket: SnapshotTicket) {
        self.tickets.push(ticket);
    }
}

/// A root with a left "button" (with a listener) and a plain right square.
fn scene() -> (Scene, NodeId, NodeId, NodeId) {
    let mut scene = Scene::new();
    let root = scene.insert(Node::default());
    let button = scene.insert(Node {
        name: Some("button".into()),
        listeners: vec![InputListener::new()],
        content: Content::Path(
            PaintedPath::new(Rect::new(0.0, 0.0, 40.0, 40.0).to_path(0.1)).with_fill(Color::BLACK),
        ),
        ..Node::default()
    });
    let square = scene.insert(Node {
        content: Content::Path(
            PaintedPath::new(Rect::new(60.0, 0.0, 100.0, 40.0).to_path(0.1))
                .with_fill(Color::BLACK),
        ),
        ..Node::default()
    });
    scene.add_child(root, button).unwrap();
    scene.add_child(root, square).unwrap();
    (scene, root, button, square)
}

fn frame(scene: &Scene, root: NodeId) -> SceneFrame<'_> {
    SceneFrame {
        scene,
        root,
        access: None,
    }
}

fn red_png() -> Vec<u8> {
    let mut png = Cursor::new(Vec::new());
    RgbaImage::from_pixel(10, 10, image::Rgba([255, 0, 0, 255]))
        .write_to(&mut png, ImageOutputFormat::Png)
        .unwrap();
    png.into_inner()
}

#[test]
fn activation_and_deactivation_balance_host_calls() {
    let mut host = MockHost::default();
    let mut session = HelperSession::default();

    session.activate(&mut host);
    assert!(session.is_active());
    assert!(host.paused);
    assert!(host.overlay.is_some());
    assert_eq!(host.subscriptions.len(), 2);
    assert_eq!(host.tickets.len(), 1);

    // Activating twice is a no-op.
    session.activate(&mut host);
    assert_eq!(host.subscriptions.len(), 2);

    session.toggle(&mut host);
    assert!(!session.is_active());
    assert!(!host.paused);
    assert!(host.overlay.is_none());
    assert!(host.subscriptions.is_empty());
    assert!(session.snapshot().is_none());
    assert!(session.visual_mirror().is_empty());
}

#[test]
fn frames_hover_and_click_selects() {
    let (scene, root, button, square) = scene();
    let mut host = MockHost::default();
    let mut session = HelperSession::default();
    session.activate(&mut host);

    session.on_pointer_move(Point::new(20.0, 20.0));
    session.on_frame(&mut host, frame(&scene, root));
    assert_eq!(session.hovered().terminal(), Some(button));
    assert!(session.selected().is_empty());
    assert!(session.region().contains(Point::new(39.0, 39.0)));
    assert_eq!(host.repaints, 1);

    // Default picking prefers listeners; the square has none.
    session.on_pointer_move(Point::new(80.0, 20.0));
    session.on_frame(&mut host, frame(&scene, root));
    assert!(session.hovered().is_empty());

    session.set_picking_mode(PickingMode::Visual);
    session.on_frame(&mut host, frame(&scene, root));
    assert_eq!(session.hovered().terminal(), Some(square));

    session.on_pointer_up(Point::new(80.0, 20.0));
    assert_eq!(session.selected().terminal(), Some(square));

    // The selection is sticky and drives the preview.
    session.on_pointer_move(Point::new(20.0, 20.0));
    session.on_frame(&mut host, frame(&scene, root));
    assert_eq!(session.preview().terminal(), Some(square));
    let report = session.node_report(&scene).unwrap();
    assert_eq!(report.node, square);
    assert_eq!(report.depth, 1);
    assert_eq!(report.global_bounds, Some(Rect::new(60.0, 0.0, 100.0, 40.0)));

    // Clicking empty space clears it.
    session.on_pointer_move(Point::new(50.0, 90.0));
    session.on_frame(&mut host, frame(&scene, root));
    session.on_pointer_up(Point::new(50.0, 90.0));
    assert!(session.selected().is_empty());
}

#[test]
fn chrome_suppresses_hover_and_selection() {
    let (scene, root, button, _) = scene();
    let mut host = MockHost::default();
    let mut session = HelperSession::default();
    session.activate(&mut host);
    session.set_chrome_bounds([Rect::new(0.0, 0.0, 10.0, 10.0)]);

    session.on_pointer_move(Point::new(20.0, 20.0));
    session.on_frame(&mut host, frame(&scene, root));
    assert_eq!(session.hovered().terminal(), Some(button));

    session.on_pointer_move(Point::new(5.0, 5.0));
    session.on_frame(&mut host, frame(&scene, root));
    assert!(session.is_pointer_over_chrome());
    session.on_pointer_up(Point::new(5.0, 5.0));
    assert!(session.selected().is_empty());
}

#[test]
fn selection_from_mirror_rows_and_invalidation() {
    let (mut scene, root, button, _) = scene();
    let mut host = MockHost::default();
    let mut session = HelperSession::default();
    session.activate(&mut host);
    session.on_frame(&mut host, frame(&scene, root));

    let path = ScenePath::from_nodes(&scene, &[root, button]).unwrap();
    let row = session.visual_mirror().find(&path).unwrap().id();
    assert!(session.select_mirror_node(MirrorKind::Visual, row));
    assert_eq!(session.selected(), &path);
    assert!(!session.select_mirror_node(MirrorKind::Access, row));

    scene.remove_child(root, button).unwrap();
    session.on_frame(&mut host, frame(&scene, root));
    assert!(session.selected().is_empty());
    assert!(session.visual_mirror().find(&path).is_none());

    session.select(ScenePath::from_root(root));
    session.clear_selection();
    assert!(session.selected().is_empty());
}

#[test]
fn explicit_selection_reaches_the_mirrors_immediately() {
    let (scene, root, button, _) = scene();
    let mut host = MockHost::default();
    let mut session = HelperSession::default();
    session.activate(&mut host);
    session.on_frame(&mut host, frame(&scene, root));

    let path = ScenePath::from_nodes(&scene, &[root, button]).unwrap();
    session.select(path.clone());
    let row = session.visual_mirror().find(&path).unwrap();
    assert_eq!(row.highlight(), Highlight::Selected);
    let row = row.id();

    let root_row = session.visual_mirror().root().unwrap();
    session.visual_mirror_mut().collapse(root_row);
    let source = SceneMirrorSource {
        scene: &scene,
        root,
    };
    assert_eq!(session.visual_mirror_mut().focus_selected(&source), Some(row));

    session.clear_selection();
    assert_eq!(
        session.visual_mirror().get(row).map(|n| n.highlight()),
        Some(Highlight::None)
    );
    assert_eq!(session.visual_mirror_mut().focus_selected(&source), None);
}

#[test]
fn snapshots_are_tied_to_their_activation() {
    let mut host = MockHost::default();
    let mut session = HelperSession::default();
    session.activate(&mut host);
    let stale = host.tickets[0];
    session.deactivate(&mut host);

    // Delivered after deactivation.
    assert!(!session.deliver_snapshot(stale, Ok(red_png().as_slice())));

    session.activate(&mut host);
    let current = host.tickets[1];
    // From an earlier activation.
    assert!(!session.deliver_snapshot(stale, Ok(red_png().as_slice())));
    assert!(session.snapshot().is_none());

    assert!(!session.deliver_snapshot(
        current,
        Err(SnapshotError::Capture("surface lost".into()))
    ));
    assert!(session.snapshot().is_none());

    assert!(session.deliver_snapshot(current, Ok(red_png().as_slice())));
    session.on_pointer_move(Point::new(55.0, 55.0));
    let color = session.pointer_color().unwrap();
    assert_eq!(color_hex(color), "#ff0000ff");
}
