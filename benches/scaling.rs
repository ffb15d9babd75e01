use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use nakchal::ml::scaler::StandardScaler;

const ROW_COUNT: usize = 10_000;
const FEATURE_COUNT: usize = 24;

fn feature_rows() -> Vec<Vec<f32>> {
    (0..ROW_COUNT)
        .map(|i| {
            (0..FEATURE_COUNT)
                .map(|j| ((i * 31 + j * 17) % 1_000) as f32 * 0.5 + j as f32)
                .collect()
        })
        .collect()
}

fn bench_fit(c: &mut Criterion) {
    let rows = feature_rows();
    c.bench_with_input(BenchmarkId::new("scaler_fit", ROW_COUNT), &rows, |b, rows| {
        b.iter(|| StandardScaler::fit(black_box(rows)).expect("fit"));
    });
}

fn bench_transform(c: &mut Criterion) {
    let rows = feature_rows();
    let scaler = StandardScaler::fit(&rows).expect("fit");
    c.bench_with_input(
        BenchmarkId::new("scaler_transform", ROW_COUNT),
        &rows,
        |b, rows| {
            b.iter(|| scaler.transform(black_box(rows)).expect("transform"));
        },
    );
}

criterion_group!(benches, bench_fit, bench_transform);
criterion_main!(benches);
