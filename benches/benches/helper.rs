// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Affine, Point, Rect, Shape};
use peniko::Color;
use std::time::Duration;
use understory_helper::{
    PickingMode, SceneMirror, SceneMirrorSource, hit_test, region_of_path, visual_hit_test,
};
use understory_region::Region;
use understory_scene::{Content, InputListener, Node, NodeId, PaintedPath, Scene};

/// A grid of `side * side` cells, each a translated group holding a
/// background square and a smaller listener-bearing button. Every fourth row
/// is clipped to its left half.
fn build_grid(side: usize) -> (Scene, NodeId) {
    let mut scene = Scene::new();
    let root = scene.insert(Node::default());
    for row in 0..side {
        let row_node = scene.insert(Node {
            transform: Affine::translate((0.0, row as f64 * 20.0)),
            clip: (row % 4 == 0).then(|| {
                Region::from_rect(Rect::new(0.0, 0.0, side as f64 * 10.0, 20.0))
            }),
            ..Node::default()
        });
        scene.add_child(root, row_node).unwrap();
        for col in 0..side {
            let cell = scene.insert(Node {
                transform: Affine::translate((col as f64 * 20.0, 0.0)),
                ..Node::default()
            });
            let background = scene.insert(Node {
                content: Content::Path(
                    PaintedPath::new(Rect::new(0.0, 0.0, 20.0, 20.0).to_path(0.1))
                        .with_fill(Color::WHITE),
                ),
                ..Node::default()
            });
            let button = scene.insert(Node {
                listeners: vec![InputListener::new()],
                content: Content::Path(
                    PaintedPath::new(Rect::new(4.0, 4.0, 16.0, 16.0).to_path(0.1))
                        .with_fill(Color::BLACK),
                ),
                ..Node::default()
            });
            scene.add_child(row_node, cell).unwrap();
            scene.add_child(cell, background).unwrap();
            scene.add_child(cell, button).unwrap();
        }
    }
    (scene, root)
}

fn probes(side: usize) -> Vec<Point> {
    let extent = side as f64 * 20.0;
    (0..64)
        .map(|i| {
            let t = f64::from(i) / 64.0;
            Point::new(extent * t, extent * (1.0 - t))
        })
        .collect()
}

fn bench_hit_test(c: &mut Criterion) {
    let mut group = c.benchmark_group("helper/hit_test");
    for side in [8_usize, 32, 64] {
        let (scene, root) = build_grid(side);
        let points = probes(side);
        group.throughput(Throughput::Elements(points.len() as u64));

        group.bench_with_input(BenchmarkId::new("visual", side), &points, |b, points| {
            b.iter(|| {
                for &pt in points {
                    black_box(visual_hit_test(&scene, root, pt));
                }
            });
        });

        group.bench_with_input(
            BenchmarkId::new("interaction", side),
            &points,
            |b, points| {
                b.iter(|| {
                    for &pt in points {
                        black_box(hit_test(&scene, root, pt, PickingMode::default()));
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_region(c: &mut Criterion) {
    let mut group = c.benchmark_group("helper/region_of_path");
    for side in [8_usize, 32] {
        let (scene, root) = build_grid(side);
        let Some(path) = visual_hit_test(&scene, root, Point::new(10.0, 30.0)) else {
            continue;
        };
        let row = path.subpath_to(path.nodes()[1]).unwrap_or_default();
        group.bench_function(BenchmarkId::new("row_contains", side), |b| {
            b.iter(|| {
                let region = region_of_path(&scene, &row, PickingMode::Visual.areas());
                black_box(region.contains(Point::new(10.0, 30.0)))
            });
        });
    }
    group.finish();
}

fn bench_mirror_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("helper/mirror_sync");
    for side in [8_usize, 32] {
        let (mut scene, root) = build_grid(side);
        let mut mirror = SceneMirror::default();
        mirror.sync(&SceneMirrorSource {
            scene: &scene,
            root,
        });

        group.bench_function(BenchmarkId::new("unchanged", side), |b| {
            b.iter(|| {
                black_box(mirror.sync(&SceneMirrorSource {
                    scene: &scene,
                    root,
                }))
            });
        });

        let first_row = scene.children_of(root)[0];
        group.bench_function(BenchmarkId::new("one_row_edited", side), |b| {
            b.iter(|| {
                let extra = scene.insert(Node::default());
                scene.add_child(first_row, extra).unwrap();
                mirror.sync(&SceneMirrorSource {
                    scene: &scene,
                    root,
                });
                scene.remove(extra);
                black_box(mirror.sync(&SceneMirrorSource {
                    scene: &scene,
                    root,
                }))
            });
        });
    }
    group.finish();
}

fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = criterion_config();
    targets = bench_hit_test, bench_region, bench_mirror_sync
}
criterion_main!(benches);
