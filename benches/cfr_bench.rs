//! Benchmarks for the CFR family.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use regret_solver::cfr::{build_all, Algorithm, CFRSolver, SolverConfig};
use regret_solver::games::kuhn::KuhnPoker;
use regret_solver::games::leduc::LeducPoker;
use regret_solver::metrics::Logger;

fn kuhn_iteration_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("kuhn_single_iteration");
    for algorithm in Algorithm::ALL {
        let mut solver = CFRSolver::new(KuhnPoker::new(), SolverConfig::new(algorithm))
            .unwrap()
            .with_metrics(Logger::new());
        group.bench_with_input(BenchmarkId::from_parameter(algorithm), &algorithm, |b, _| {
            b.iter(|| {
                solver.run_iteration();
                black_box(solver.iteration())
            })
        });
    }
    group.finish();
}

fn kuhn_exploitability_benchmark(c: &mut Criterion) {
    let mut solver = CFRSolver::new(KuhnPoker::new(), SolverConfig::vanilla())
        .unwrap()
        .with_metrics(Logger::new());
    solver.train(100);

    c.bench_function("kuhn_exploitability", |b| {
        b.iter(|| black_box(solver.evaluate().unwrap()))
    });
}

fn leduc_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("leduc");
    group.sample_size(10);

    group.bench_function("enumerate", |b| {
        b.iter(|| black_box(build_all(&LeducPoker::new(), 1_000_000).unwrap().1.len()))
    });

    let mut solver = CFRSolver::new(LeducPoker::new(), SolverConfig::new(Algorithm::Dcfr))
        .unwrap()
        .with_metrics(Logger::new());
    group.bench_function("dcfr_iteration", |b| {
        b.iter(|| {
            solver.run_iteration();
            black_box(solver.iteration())
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    kuhn_iteration_benchmark,
    kuhn_exploitability_benchmark,
    leduc_benchmark
);
criterion_main!(benches);
