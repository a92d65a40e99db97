// End to end tests running a comparison session against lap data stored on disk

use std::fs;

use slipstream::model::DistanceSample;
use slipstream::{
    AppConfig, ComparisonPayload, ComparisonRenderer, ComparisonSession, Driver,
    FileBasedProvider, LapDataProvider, LapDetail, LapSample, LapTime, SessionKey,
    SlipstreamError, SlotChange, TrackGeometry, writer,
};
use tempfile::TempDir;

fn qatar_sprint() -> SessionKey {
    SessionKey {
        year: 2023,
        venue: "Qatar Grand Prix".to_string(),
        session_type: "Sprint".to_string(),
    }
}

fn driver(number: &str, first: &str, last: &str) -> Driver {
    Driver {
        driver_number: number.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        ..Driver::default()
    }
}

fn lap(lap_number: u32, lap_time: LapTime) -> LapSample {
    LapSample {
        lap_number,
        lap_time,
        compound: Some("SOFT".to_string()),
        tyre_life: None,
        deleted: false,
    }
}

fn lap_detail(speed: f64) -> LapDetail {
    LapDetail {
        samples: (0..=50)
            .map(|i| DistanceSample {
                distance: i as f64 * 100.,
                speed,
                throttle: 1.,
                ..DistanceSample::default()
            })
            .collect(),
    }
}

/// A data directory with one session, two drivers and one detailed lap each
fn seed_data_dir(temp_dir: &TempDir) -> FileBasedProvider {
    let provider = FileBasedProvider::new(temp_dir.path().to_path_buf()).unwrap();
    let key = qatar_sprint();
    provider
        .store_venues(2023, &["Qatar Grand Prix".to_string()])
        .unwrap();
    provider
        .store_sessions(2023, &key.venue, &["Sprint".to_string()])
        .unwrap();
    provider
        .store_drivers(
            &key,
            &[
                driver("63", "George", "Russell"),
                driver("44", "Lewis", "Hamilton"),
            ],
        )
        .unwrap();
    provider
        .store_track_geometry(&key, &TrackGeometry::default())
        .unwrap();
    for (number, base) in [("44", 88.0), ("63", 88.3)] {
        let laps = vec![
            lap(1, LapTime::NotATime),
            lap(2, LapTime::Seconds(base + 0.4)),
            lap(3, LapTime::Seconds(base)),
            lap(4, LapTime::Seconds(base + 0.2)),
            lap(5, LapTime::Seconds(base + 25.)),
        ];
        provider.store_laps(&key, number, &laps).unwrap();
    }
    provider
        .store_lap_detail(&key, "44", 3, &lap_detail(230.))
        .unwrap();
    provider
        .store_lap_detail(&key, "63", 3, &lap_detail(235.))
        .unwrap();
    provider
}

#[derive(Default)]
struct CountingRenderer {
    track_maps: usize,
    dominance_maps: usize,
}

impl ComparisonRenderer for CountingRenderer {
    fn draw_track_map(&mut self, _track: &TrackGeometry) {
        self.track_maps += 1;
    }

    fn draw_dominance_map(&mut self, _payload: &ComparisonPayload) {
        self.dominance_maps += 1;
    }
}

#[tokio::test]
async fn test_compare_laps_from_disk() {
    let temp_dir = TempDir::new().unwrap();
    let provider = seed_data_dir(&temp_dir);
    let mut session = ComparisonSession::new(provider, &AppConfig::default());

    session.on_slot_changed(SlotChange::Year(2023)).await.unwrap();
    session.advance().await.unwrap();
    session
        .on_slot_changed(SlotChange::Venue("Qatar Grand Prix".to_string()))
        .await
        .unwrap();
    session.advance().await.unwrap();
    session
        .on_slot_changed(SlotChange::SessionType("Sprint".to_string()))
        .await
        .unwrap();
    session.advance().await.unwrap();

    let hamilton = session.drivers().next().cloned().unwrap();
    assert_eq!(hamilton.to_string(), "44 - Lewis Hamilton");
    session
        .on_slot_changed(SlotChange::FirstDriver(hamilton))
        .await
        .unwrap();
    let shown: Vec<u32> = session.display_laps().iter().map(|l| l.lap_number).collect();
    assert_eq!(shown, vec![2, 3, 4]);

    session.advance().await.unwrap();
    let russell = session.filter_drivers("russell")[0].clone();
    session
        .on_slot_changed(SlotChange::SecondDriver(russell))
        .await
        .unwrap();
    session.select_lap_number(3).unwrap();
    session.retreat().await.unwrap();
    session.select_lap_number(3).unwrap();

    let mut renderer = CountingRenderer::default();
    let payload = session.run_comparison(&mut renderer).await.unwrap().clone();
    assert_eq!(renderer.track_maps, 1);
    assert_eq!(renderer.dominance_maps, 1);
    assert_eq!(payload.first.detail.samples.len(), 51);

    let output = temp_dir.path().join("comparison.json");
    writer::write_comparison(&output, &payload).unwrap();
    let read: ComparisonPayload = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(read.second.driver.driver_number, "63");
    let sectors = read.mini_sectors(AppConfig::default().mini_sectors);
    assert_eq!(sectors.len(), 25);
    assert!(sectors.iter().all(|s| s.second_speed > s.first_speed));
}

#[tokio::test]
async fn test_missing_lap_detail_fails_comparison() {
    let temp_dir = TempDir::new().unwrap();
    let provider = seed_data_dir(&temp_dir);
    let key = qatar_sprint();
    let result = provider.fetch_lap_detail(&key, "44", 4).await;
    assert!(matches!(result, Err(SlipstreamError::DataNotFound { .. })));
}

#[tokio::test]
async fn test_timing_feed_lap_file() {
    let temp_dir = TempDir::new().unwrap();
    let provider = FileBasedProvider::new(temp_dir.path().to_path_buf()).unwrap();
    let key = qatar_sprint();
    let laps_dir = temp_dir
        .path()
        .join("2023")
        .join("qatar_grand_prix")
        .join("sprint")
        .join("laps");
    fs::create_dir_all(&laps_dir).unwrap();
    fs::write(
        laps_dir.join("44.jsonl"),
        concat!(
            r#"{"lapNumber": 1, "lapTime": "NaT", "compound": "SOFT", "deleted": false}"#,
            "\n",
            r#"{"lapNumber": 2, "lapTime": "88.731"}"#,
            "\n",
            r#"{"lapNumber": 3, "lapTime": 89.1, "tyreLife": 3.0}"#,
            "\n",
            r#"{"lapNumber": 4, "lapTime": null}"#,
            "\n",
        ),
    )
    .unwrap();

    let laps = provider.fetch_laps(&key, "44").await.unwrap();
    assert_eq!(laps.len(), 4);
    assert_eq!(laps[0].lap_time, LapTime::NotATime);
    assert_eq!(laps[1].lap_time.seconds(), Some(88.731));
    assert_eq!(laps[2].tyre_life, Some(3.0));
    assert!(laps[3].lap_time.is_invalid());

    let output = temp_dir.path().join("laps.jsonl");
    writer::write_display_laps(&output, &laps).unwrap();
    assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 4);
}
