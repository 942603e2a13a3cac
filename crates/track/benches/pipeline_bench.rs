//! Criterion benchmarks for the track edit pipeline.
//!
//! Benchmarks:
//!   - compile: normalize + rule matching of a multi-clause request
//!   - execute: a random-heavy plan at increasing grid sizes
//!   - edit: one full request through the queued plugin system
//!
//! Run with: cargo bench -p track --bench pipeline_bench --features bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use track::compiler::compile;
use track::kernel::{execute_plan, TrackGrid, TrackRng};
use track::normalize::normalize;
use track::params::TrackParams;
use track::plan::TrackOp;
use track::rules::RuleRepository;
use track::test_harness::TestTrack;
use track::Plan;

const REQUEST: &str = "build 200 by 5, random holes 10%, 4 jump gaps, \
    curve left 25 degrees over rows 20 to 80, s-bend 15 degrees over rows 90 to 150, \
    slopes -6 to 6 every 8 rows, protect start 5 and end 5, smooth heights 3 passes";

// ---------------------------------------------------------------------------
// Benchmark: compile
// ---------------------------------------------------------------------------

fn bench_compile(c: &mut Criterion) {
    let rules = RuleRepository::builtin().unwrap_or_default();
    c.bench_function("compile_request", |b| {
        b.iter(|| {
            let normalized = normalize(black_box(REQUEST));
            black_box(compile(&normalized, &rules))
        });
    });
}

// ---------------------------------------------------------------------------
// Benchmark: execute
// ---------------------------------------------------------------------------

fn random_plan(rows: u32) -> Plan {
    Plan::new(vec![
        TrackOp::Seed { value: 42 },
        TrackOp::BuildAbs { rows, cols: 5 },
        TrackOp::SafeMarginStart { n: 5 },
        TrackOp::RandomHoles { pct: 15.0 },
        TrackOp::InsertJumpGaps { n: 8 },
        TrackOp::SlopesRandomAuto {
            min_deg: -6.0,
            max_deg: 6.0,
            seg_len: 10,
        },
        TrackOp::SmoothColumns { passes: 3 },
    ])
}

fn bench_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute_plan");
    let params = TrackParams::default();

    for rows in [1_000u32, 10_000, 100_000] {
        let plan = random_plan(rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &plan, |b, plan| {
            b.iter(|| {
                let mut grid = TrackGrid::default();
                let mut rng = TrackRng::default();
                let reports = execute_plan(plan, &mut grid, &mut rng, &params);
                black_box((reports, grid.tile_count()))
            });
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: edit through the plugin
// ---------------------------------------------------------------------------

fn bench_queued_edit(c: &mut Criterion) {
    c.bench_function("queued_edit", |b| {
        b.iter(|| {
            let mut track = TestTrack::new();
            black_box(track.edit(REQUEST))
        });
    });
}

// ---------------------------------------------------------------------------
// Register groups
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_compile, bench_execute, bench_queued_edit);
criterion_main!(benches);
