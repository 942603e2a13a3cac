//! Criterion benchmarks for grid snapshots.
//!
//! Measures encode (bitcode + lz4 + header) and decode (checksum, inflate,
//! decode, digest check) for grids of increasing length.
//!
//! Run with: `cargo bench -p save --bench snapshot_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use save::snapshot::{decode_snapshot, encode_snapshot, GridSnapshot};
use track::kernel::{execute_plan, TrackGrid, TrackRng};
use track::params::TrackParams;
use track::{Plan, TrackOp};

fn shaped_grid(rows: u32) -> TrackGrid {
    let plan = Plan::new(vec![
        TrackOp::BuildAbs { rows, cols: 5 },
        TrackOp::RandomHoles { pct: 10.0 },
        TrackOp::SlopesRandomAuto {
            min_deg: -5.0,
            max_deg: 5.0,
            seg_len: 10,
        },
    ]);
    let mut grid = TrackGrid::default();
    let mut rng = TrackRng::default();
    let _ = execute_plan(&plan, &mut grid, &mut rng, &TrackParams::default());
    grid
}

fn bench_snapshot(c: &mut Criterion) {
    let mut encode = c.benchmark_group("snapshot_encode");
    for rows in [1_000u32, 100_000] {
        let snapshot = GridSnapshot::capture(&shaped_grid(rows), "");
        encode.bench_with_input(BenchmarkId::from_parameter(rows), &snapshot, |b, s| {
            b.iter(|| black_box(encode_snapshot(s)));
        });
    }
    encode.finish();

    let mut decode = c.benchmark_group("snapshot_decode");
    for rows in [1_000u32, 100_000] {
        let bytes = encode_snapshot(&GridSnapshot::capture(&shaped_grid(rows), ""));
        decode.bench_with_input(BenchmarkId::from_parameter(rows), &bytes, |b, bytes| {
            b.iter(|| black_box(decode_snapshot(bytes)));
        });
    }
    decode.finish();
}

criterion_group!(benches, bench_snapshot);
criterion_main!(benches);
