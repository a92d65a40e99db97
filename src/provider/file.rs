// Lap data provider backed by a directory of JSON files
//
// Layout under the root directory, names normalized with `normalize_name`:
//
//   <year>/venues.json                                  ["Qatar Grand Prix", ...]
//   <year>/<venue>/sessions.json                        ["Sprint", "Race", ...]
//   <year>/<venue>/<session>/drivers.json               [Driver, ...]
//   <year>/<venue>/<session>/track.json                 TrackGeometry
//   <year>/<venue>/<session>/laps/<driver>.jsonl        one LapSample per line
//   <year>/<venue>/<session>/laps/<driver>/<lap>.json   LapDetail

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::SlipstreamError;
use crate::model::{Driver, LapDetail, LapSample, SessionKey, TrackGeometry};

use super::LapDataProvider;

const VENUES_FILE: &str = "venues.json";
const SESSIONS_FILE: &str = "sessions.json";
const DRIVERS_FILE: &str = "drivers.json";
const TRACK_FILE: &str = "track.json";
const LAPS_DIR: &str = "laps";

pub struct FileBasedProvider {
    root: PathBuf,
}

impl FileBasedProvider {
    pub fn new(root: PathBuf) -> Result<Self, SlipstreamError> {
        if !root.is_dir() {
            return Err(SlipstreamError::DataNotFound {
                what: "data directory".to_string(),
                path: root.display().to_string(),
            });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Normalize a venue, session or driver name for consistent file naming
    pub fn normalize_name(name: &str) -> String {
        name.trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    }

    fn year_dir(&self, year: i32) -> PathBuf {
        self.root.join(year.to_string())
    }

    fn venue_dir(&self, year: i32, venue: &str) -> PathBuf {
        self.year_dir(year).join(Self::normalize_name(venue))
    }

    fn session_dir(&self, key: &SessionKey) -> PathBuf {
        self.venue_dir(key.year, &key.venue)
            .join(Self::normalize_name(&key.session_type))
    }

    fn laps_dir(&self, key: &SessionKey) -> PathBuf {
        self.session_dir(key).join(LAPS_DIR)
    }

    fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, SlipstreamError> {
        if !path.exists() {
            return Err(SlipstreamError::DataNotFound {
                what: what.to_string(),
                path: path.display().to_string(),
            });
        }
        debug!("Reading {what} from {path:?}");
        let content = fs::read_to_string(path).map_err(|e| SlipstreamError::DataLoadError {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| SlipstreamError::DataParseError {
            path: path.display().to_string(),
            source: e,
        })
    }

    fn read_json_lines<T: DeserializeOwned>(
        path: &Path,
        what: &str,
    ) -> Result<Vec<T>, SlipstreamError> {
        if !path.exists() {
            return Err(SlipstreamError::DataNotFound {
                what: what.to_string(),
                path: path.display().to_string(),
            });
        }
        debug!("Reading {what} from {path:?}");
        serde_jsonlines::json_lines::<T, _>(path)
            .and_then(|lines| lines.collect::<Result<Vec<T>, std::io::Error>>())
            .map_err(|e| SlipstreamError::DataLoadError {
                path: path.display().to_string(),
                source: e,
            })
    }

    fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SlipstreamError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SlipstreamError::WriterError { source: e })?;
        }
        let content = serde_json::to_string_pretty(value).map_err(|e| {
            SlipstreamError::DataParseError {
                path: path.display().to_string(),
                source: e,
            }
        })?;
        fs::write(path, content).map_err(|e| SlipstreamError::WriterError { source: e })
    }

    pub fn store_venues(&self, year: i32, venues: &[String]) -> Result<(), SlipstreamError> {
        Self::write_json(&self.year_dir(year).join(VENUES_FILE), &venues)
    }

    pub fn store_sessions(
        &self,
        year: i32,
        venue: &str,
        sessions: &[String],
    ) -> Result<(), SlipstreamError> {
        Self::write_json(&self.venue_dir(year, venue).join(SESSIONS_FILE), &sessions)
    }

    pub fn store_drivers(&self, key: &SessionKey, drivers: &[Driver]) -> Result<(), SlipstreamError> {
        Self::write_json(&self.session_dir(key).join(DRIVERS_FILE), &drivers)
    }

    pub fn store_track_geometry(
        &self,
        key: &SessionKey,
        track: &TrackGeometry,
    ) -> Result<(), SlipstreamError> {
        Self::write_json(&self.session_dir(key).join(TRACK_FILE), track)
    }

    pub fn store_laps(
        &self,
        key: &SessionKey,
        driver_number: &str,
        laps: &[LapSample],
    ) -> Result<(), SlipstreamError> {
        let dir = self.laps_dir(key);
        fs::create_dir_all(&dir).map_err(|e| SlipstreamError::WriterError { source: e })?;
        let path = dir.join(format!("{}.jsonl", Self::normalize_name(driver_number)));
        serde_jsonlines::write_json_lines(path, laps)
            .map_err(|e| SlipstreamError::WriterError { source: e })
    }

    pub fn store_lap_detail(
        &self,
        key: &SessionKey,
        driver_number: &str,
        lap_number: u32,
        detail: &LapDetail,
    ) -> Result<(), SlipstreamError> {
        let path = self
            .laps_dir(key)
            .join(Self::normalize_name(driver_number))
            .join(format!("{lap_number}.json"));
        Self::write_json(&path, detail)
    }
}

#[async_trait]
impl LapDataProvider for FileBasedProvider {
    async fn fetch_venues(&self, year: i32) -> Result<Vec<String>, SlipstreamError> {
        Self::read_json(&self.year_dir(year).join(VENUES_FILE), "venues")
    }

    async fn fetch_sessions(&self, year: i32, venue: &str) -> Result<Vec<String>, SlipstreamError> {
        Self::read_json(&self.venue_dir(year, venue).join(SESSIONS_FILE), "sessions")
    }

    async fn fetch_drivers(&self, key: &SessionKey) -> Result<Vec<Driver>, SlipstreamError> {
        Self::read_json(&self.session_dir(key).join(DRIVERS_FILE), "drivers")
    }

    async fn fetch_laps(
        &self,
        key: &SessionKey,
        driver_number: &str,
    ) -> Result<Vec<LapSample>, SlipstreamError> {
        let path = self
            .laps_dir(key)
            .join(format!("{}.jsonl", Self::normalize_name(driver_number)));
        Self::read_json_lines(&path, "laps")
    }

    async fn fetch_track_geometry(
        &self,
        key: &SessionKey,
    ) -> Result<TrackGeometry, SlipstreamError> {
        Self::read_json(&self.session_dir(key).join(TRACK_FILE), "track geometry")
    }

    async fn fetch_lap_detail(
        &self,
        key: &SessionKey,
        driver_number: &str,
        lap_number: u32,
    ) -> Result<LapDetail, SlipstreamError> {
        let path = self
            .laps_dir(key)
            .join(Self::normalize_name(driver_number))
            .join(format!("{lap_number}.json"));
        Self::read_json(&path, "lap detail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LapTime;
    use tempfile::TempDir;

    fn qatar_sprint() -> SessionKey {
        SessionKey {
            year: 2023,
            venue: "Qatar Grand Prix".to_string(),
            session_type: "Sprint".to_string(),
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(
            FileBasedProvider::normalize_name("Qatar Grand Prix"),
            "qatar_grand_prix"
        );
        assert_eq!(FileBasedProvider::normalize_name(" Sprint "), "sprint");
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileBasedProvider::new(temp_dir.path().join("missing"));
        assert!(matches!(result, Err(SlipstreamError::DataNotFound { .. })));
    }

    #[tokio::test]
    async fn test_store_and_fetch_laps() {
        let temp_dir = TempDir::new().unwrap();
        let provider = FileBasedProvider::new(temp_dir.path().to_path_buf()).unwrap();
        let key = qatar_sprint();
        let laps = vec![
            LapSample {
                lap_number: 1,
                lap_time: LapTime::Seconds(92.5),
                compound: Some("MEDIUM".to_string()),
                tyre_life: Some(1.),
                deleted: false,
            },
            LapSample {
                lap_number: 2,
                lap_time: LapTime::NotATime,
                compound: Some("MEDIUM".to_string()),
                tyre_life: Some(2.),
                deleted: true,
            },
        ];
        provider.store_laps(&key, "44", &laps).unwrap();

        let fetched = provider.fetch_laps(&key, "44").await.unwrap();
        assert_eq!(fetched, laps);
    }

    #[tokio::test]
    async fn test_missing_file_reports_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let provider = FileBasedProvider::new(temp_dir.path().to_path_buf()).unwrap();
        match provider.fetch_venues(1999).await {
            Err(SlipstreamError::DataNotFound { what, .. }) => assert_eq!(what, "venues"),
            other => panic!("Expected DataNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_file_reports_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let provider = FileBasedProvider::new(temp_dir.path().to_path_buf()).unwrap();
        let dir = temp_dir.path().join("2023");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(VENUES_FILE), "{not json").unwrap();
        assert!(matches!(
            provider.fetch_venues(2023).await,
            Err(SlipstreamError::DataParseError { .. })
        ));
    }
}
