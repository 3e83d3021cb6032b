use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use tofit::constants::TimeMeasurements;
use tofit::{RobustFit, TimeMeasurement};

/// A cluster of in-time measurements with `outliers` late hits mixed in.
fn synthetic_set(n: usize, outliers: usize) -> TimeMeasurements {
    (0..n)
        .map(|i| {
            let late = i % (n / outliers.max(1)).max(1) == 0;
            let time_corr = if late { 60.0 + i as f64 } else { 0.1 * (i % 7) as f64 };
            let distance = 400.0 + 10.0 * i as f64;
            TimeMeasurement {
                distance,
                time_corr,
                weight_inv_beta: distance * distance / (49.0 * 900.0),
                weight_time_vtx: 1.0 / 49.0,
            }
        })
        .collect()
}

fn bench_robust_fit(c: &mut Criterion) {
    let fit = RobustFit::new(9.0, false).unwrap();

    let mut group = c.benchmark_group("robust_fit");
    for (n, outliers) in [(8, 1), (32, 4), (128, 16)] {
        let tms = synthetic_set(n, outliers);
        group.bench_function(format!("n{n}_out{outliers}"), |b| {
            b.iter(|| fit.fit(black_box(tms.clone())))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_robust_fit);
criterion_main!(benches);
