use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spatialprint_core::{Segment, Tolerances};
use spatialprint_settings::{Config, WeightingSettings};
use spatialprint_toolpath::{assign_weights, refine_weights, SpatialGraph, ToolpathPlanner};

/// A grid of posts with braces and a ring of horizontals per level.
fn lattice(size: usize, levels: usize) -> Vec<Segment> {
    let mut segments = Vec::new();
    for level in 0..levels {
        let z0 = level as f64 * 20.0;
        let z1 = z0 + 20.0;
        for i in 0..size {
            for j in 0..size {
                let (x, y) = (i as f64 * 20.0, j as f64 * 20.0);
                segments.push(Segment::from_coords([x, y, z0], [x, y, z1]));
                if i + 1 < size {
                    segments.push(Segment::from_coords([x, y, z1], [x + 20.0, y, z0]));
                    segments.push(Segment::from_coords([x, y, z1], [x + 20.0, y, z1]));
                }
            }
        }
    }
    segments
}

fn bench_graph_build(c: &mut Criterion) {
    let tol = Tolerances::default();
    let mut group = c.benchmark_group("graph_build");
    for size in [4, 8, 16] {
        let segments = lattice(size, 3);
        group.bench_with_input(BenchmarkId::from_parameter(size), &segments, |b, s| {
            b.iter(|| SpatialGraph::build(black_box(s), &tol))
        });
    }
    group.finish();
}

fn bench_weighting(c: &mut Criterion) {
    let tol = Tolerances::default();
    let settings = WeightingSettings::default();
    let graph = SpatialGraph::build(&lattice(8, 3), &tol).unwrap().graph;
    c.bench_function("assign_and_refine", |b| {
        b.iter(|| {
            let mut w = assign_weights(black_box(&graph), &settings).unwrap();
            refine_weights(&graph, &mut w, &settings)
        })
    });
}

fn bench_plan(c: &mut Criterion) {
    let planner = ToolpathPlanner::new(Config::default()).unwrap();
    let segments = lattice(6, 2);
    c.bench_function("plan_lattice", |b| {
        b.iter(|| planner.plan(black_box(&segments)))
    });
}

criterion_group!(benches, bench_graph_build, bench_weighting, bench_plan);
criterion_main!(benches);
