use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::DVec3;
use skyproj::sphere::sphe_to_rect;
use skyproj::{
    FrameType, ModelViewTransform, ProjectionKind, Projector, ProjectorParams, SkyGrid, Tessellator,
    Topology,
};

fn projector(kind: ProjectionKind, fov: f64) -> Projector {
    let params = ProjectorParams::for_viewport(0, 0, 1600, 1000, fov);
    let mvt = ModelViewTransform::looking_at(sphe_to_rect(0.7, 0.4), DVec3::Z);
    Projector::new(kind, mvt, &params)
}

/// Directions spread over the whole sphere.
fn sky_points(n: usize) -> Vec<DVec3> {
    (0..n)
        .map(|i| {
            let t = i as f64 / n as f64;
            sphe_to_rect(t * 97.0, (2.0 * t - 1.0).asin())
        })
        .collect()
}

fn bench_project(c: &mut Criterion) {
    let points = sky_points(10_000);
    let mut group = c.benchmark_group("project");
    for kind in [ProjectionKind::Stereographic, ProjectionKind::Hammer, ProjectionKind::Mercator] {
        let prj = projector(kind, 90.0);
        group.bench_function(kind.name(), |b| {
            b.iter(|| {
                let mut visible = 0usize;
                for &p in &points {
                    if prj.project(black_box(p)).1 {
                        visible += 1;
                    }
                }
                visible
            })
        });
    }
    group.finish();
}

fn bench_tessellate(c: &mut Criterion) {
    let prj = projector(ProjectionKind::Fisheye, 180.0);
    let tess = Tessellator::new(&prj);
    let points = sky_points(200);

    let mut group = c.benchmark_group("tessellate");
    group.bench_function("great_circle_arcs_200", |b| {
        b.iter(|| tess.great_circle_arcs(black_box(&points), Topology::LineStrip, None))
    });
    group.bench_function("spherical_triangles_198", |b| {
        b.iter(|| tess.spherical_triangles(black_box(&points[..198]), Topology::Triangles, None))
    });
    group.finish();
}

fn bench_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid");
    group.sample_size(20);
    for (kind, fov) in [(ProjectionKind::Stereographic, 60.0), (ProjectionKind::Hammer, 360.0)] {
        let prj = projector(kind, fov);
        let grid = SkyGrid::new(FrameType::EquatorialJ2000);
        group.bench_function(kind.name(), |b| {
            b.iter(|| {
                let tess = Tessellator::new(&prj);
                grid.draw(&tess, |l| {
                    black_box(l);
                })
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_project, bench_tessellate, bench_grid);
criterion_main!(benches);
