use criterion::{Criterion, black_box, criterion_group, criterion_main};
use slipstream::laps::{DEFAULT_OUTLIER_FACTOR, LapAnalyzer, display_laps, median_lap_time};
use slipstream::model::{DistanceSample, Driver, LapDetail, LapSample, LapTime, SessionKey};
use slipstream::{ComparisonPayload, TrackGeometry, comparison::DriverLapData};
use std::time::Duration;

fn create_race_laps(count: u32) -> Vec<LapSample> {
    (1..=count)
        .map(|lap_number| {
            let lap_time = match lap_number % 20 {
                0 => LapTime::NotATime,
                // pit laps
                1 => LapTime::Seconds(110.0 + lap_number as f64 * 0.01),
                n => LapTime::Seconds(88.0 + n as f64 * 0.05),
            };
            LapSample {
                lap_number,
                lap_time,
                compound: Some("HARD".to_string()),
                tyre_life: Some((lap_number % 20) as f32),
                deleted: false,
            }
        })
        .collect()
}

fn create_side(number: &str, speed: f64) -> DriverLapData {
    DriverLapData {
        driver: Driver {
            driver_number: number.to_string(),
            ..Driver::default()
        },
        lap: create_race_laps(16).pop().unwrap(),
        detail: LapDetail {
            samples: (0..5400)
                .map(|i| DistanceSample {
                    distance: i as f64,
                    speed: speed + (i % 300) as f64 * 0.1,
                    ..DistanceSample::default()
                })
                .collect(),
        },
    }
}

fn bench_lap_filters(c: &mut Criterion) {
    let mut group = c.benchmark_group("lap_filters");
    let laps = create_race_laps(70);

    group.bench_function("median_70_laps", |b| {
        b.iter(|| black_box(median_lap_time(black_box(&laps))));
    });

    group.bench_function("display_laps_70_laps", |b| {
        b.iter(|| {
            black_box(display_laps(
                black_box(&laps),
                false,
                false,
                DEFAULT_OUTLIER_FACTOR,
            ))
        });
    });

    group.bench_function("toggle_both_filters", |b| {
        let mut analyzer = LapAnalyzer::default();
        analyzer.load_laps(laps.clone());
        b.iter(|| {
            analyzer.toggle_invalid_laps();
            analyzer.toggle_outliers();
            black_box(analyzer.display_laps().len());
        });
    });

    group.finish();
}

fn bench_mini_sectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("comparison");
    let payload = ComparisonPayload {
        key: SessionKey {
            year: 2023,
            venue: "Qatar Grand Prix".to_string(),
            session_type: "Sprint".to_string(),
        },
        track: TrackGeometry::default(),
        first: create_side("44", 200.),
        second: create_side("63", 201.),
    };

    group.bench_function("mini_sectors_25", |b| {
        b.iter(|| black_box(payload.mini_sectors(black_box(25))));
    });

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .measurement_time(Duration::from_secs(5))
        .sample_size(100);
    targets = bench_lap_filters, bench_mini_sectors
}
criterion_main!(benches);
