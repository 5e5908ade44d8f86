use cdag_core::prelude::*;
use cdag_test_utils::{layered, podcast_with_effect};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_paths(c: &mut Criterion) {
    let mut group = c.benchmark_group("paths");
    for (width, depth) in [(2, 2), (3, 3), (4, 3)] {
        let dag = layered(width, depth);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{width}x{depth}")),
            &dag,
            |b, dag| {
                let finder = PathFinder::for_designated(dag).unwrap();
                b.iter(|| black_box(finder.paths().count()));
            },
        );
    }
    group.finish();
}

fn bench_adjustment(c: &mut Criterion) {
    let podcast = podcast_with_effect();
    c.bench_function("adjustment/podcast", |b| {
        let solver = AdjustmentSetSolver::for_designated(&podcast).unwrap();
        b.iter(|| black_box(solver.find_adjustment_sets().unwrap()));
    });

    let wide = layered(3, 3);
    c.bench_function("adjustment/layered_3x3", |b| {
        let solver = AdjustmentSetSolver::for_designated(&wide).unwrap();
        b.iter(|| black_box(solver.find_adjustment_sets().unwrap()));
    });
}

criterion_group!(benches, bench_paths, bench_adjustment);
criterion_main!(benches);
