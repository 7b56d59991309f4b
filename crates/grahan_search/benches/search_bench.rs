use criterion::{Criterion, black_box, criterion_group, criterion_main};
use grahan_core::GeoPosition;
use grahan_search::{
    EclipseSearchConfig, next_lunar_eclipse, next_solar_eclipse_global, next_solar_eclipse_local,
    solar_eclipse_where,
};
use grahan_testkit::{AnalyticEphemeris, jd_ut};

fn solar_bench(c: &mut Criterion) {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let start = jd_ut(2024, 3, 1, 0, 0);
    let site = GeoPosition::new(-96.80, 32.78, 140.0);

    let mut group = c.benchmark_group("search_solar");
    group.sample_size(20);
    group.bench_function("next_solar_eclipse_global", |b| {
        b.iter(|| {
            next_solar_eclipse_global(black_box(&eph), black_box(start), black_box(&config))
                .expect("search should succeed")
        })
    });
    group.bench_function("next_solar_eclipse_local", |b| {
        b.iter(|| {
            next_solar_eclipse_local(black_box(&eph), black_box(start), black_box(&site), &config)
                .expect("search should succeed")
        })
    });
    group.bench_function("solar_eclipse_where", |b| {
        let t = jd_ut(2024, 4, 8, 18, 17);
        b.iter(|| solar_eclipse_where(black_box(&eph), black_box(t), &config).expect("where"))
    });
    group.finish();
}

fn lunar_bench(c: &mut Criterion) {
    let eph = AnalyticEphemeris::new();
    let config = EclipseSearchConfig::default();
    let start = jd_ut(2025, 1, 1, 0, 0);

    let mut group = c.benchmark_group("search_lunar");
    group.sample_size(20);
    group.bench_function("next_lunar_eclipse", |b| {
        b.iter(|| {
            next_lunar_eclipse(black_box(&eph), black_box(start), black_box(&config))
                .expect("search should succeed")
        })
    });
    group.finish();
}

criterion_group!(benches, solar_bench, lunar_bench);
criterion_main!(benches);
