// Contract for the source of seasons, sessions, drivers, laps and lap telemetry

pub mod file;

use async_trait::async_trait;

use crate::errors::SlipstreamError;
use crate::model::{Driver, LapDetail, LapSample, SessionKey, TrackGeometry};

pub use file::FileBasedProvider;

/// Retrieves the data the wizard and the lap analyzer work on.
///
/// Implementations own transport concerns such as timeouts and retries. Errors are
/// handed back to the caller unchanged.
#[async_trait]
pub trait LapDataProvider: Send + Sync {
    /// Venues that hosted a session in `year`
    async fn fetch_venues(&self, year: i32) -> Result<Vec<String>, SlipstreamError>;

    /// Session types (e.g. "Race", "Sprint") held at `venue` in `year`
    async fn fetch_sessions(&self, year: i32, venue: &str) -> Result<Vec<String>, SlipstreamError>;

    /// Drivers taking part in a session, in no particular order
    async fn fetch_drivers(&self, key: &SessionKey) -> Result<Vec<Driver>, SlipstreamError>;

    /// Every lap a driver completed in a session
    async fn fetch_laps(
        &self,
        key: &SessionKey,
        driver_number: &str,
    ) -> Result<Vec<LapSample>, SlipstreamError>;

    async fn fetch_track_geometry(&self, key: &SessionKey)
    -> Result<TrackGeometry, SlipstreamError>;

    /// Per-distance telemetry of a single lap
    async fn fetch_lap_detail(
        &self,
        key: &SessionKey,
        driver_number: &str,
        lap_number: u32,
    ) -> Result<LapDetail, SlipstreamError>;
}
