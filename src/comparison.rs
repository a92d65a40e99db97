// Two driver lap comparison: concurrent detail retrieval and the dominance dataset

use itertools::Itertools;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::SlipstreamError;
use crate::model::{Driver, LapDetail, LapSample, SessionKey, TrackGeometry};
use crate::provider::LapDataProvider;
use crate::wizard::DriverSlot;

/// One side of a comparison: who, which lap, and that lap's telemetry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DriverLapData {
    pub driver: Driver,
    pub lap: LapSample,
    pub detail: LapDetail,
}

/// Everything the dominance renderer needs, assembled once both lap details resolved
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ComparisonPayload {
    pub key: SessionKey,
    pub track: TrackGeometry,
    pub first: DriverLapData,
    pub second: DriverLapData,
}

/// Which lap of which driver to compare, on both sides
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonRequest {
    pub key: SessionKey,
    pub first: (Driver, LapSample),
    pub second: (Driver, LapSample),
}

/// Draws the track map and the dominance overlay
pub trait ComparisonRenderer {
    fn draw_track_map(&mut self, track: &TrackGeometry);

    fn draw_dominance_map(&mut self, payload: &ComparisonPayload);
}

/// A slice of the lap by distance and which driver was quicker through it
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct MiniSector {
    pub index: usize,
    pub start_m: f64,
    pub end_m: f64,
    /// Mean speed of the first driver in this slice, if it has samples there
    pub first_speed: Option<f64>,
    pub second_speed: Option<f64>,
    pub faster: Option<DriverSlot>,
}

/// Fetch the track geometry and both lap details concurrently, then hand the result
/// to `renderer`.
///
/// Nothing is drawn unless all three requests succeed. The first error is returned
/// as-is.
pub async fn assemble_comparison<P, R>(
    provider: &P,
    request: ComparisonRequest,
    renderer: &mut R,
) -> Result<ComparisonPayload, SlipstreamError>
where
    P: LapDataProvider + ?Sized,
    R: ComparisonRenderer + ?Sized,
{
    let ComparisonRequest {
        key,
        first: (first_driver, first_lap),
        second: (second_driver, second_lap),
    } = request;
    for (driver, lap) in [(&first_driver, &first_lap), (&second_driver, &second_lap)] {
        if lap.lap_number == 0 {
            return Err(SlipstreamError::ComparisonNotReady {
                reason: format!("no valid lap picked for driver {}", driver.driver_number),
            });
        }
    }

    info!(
        "Comparing lap {} of #{} with lap {} of #{} at {key}",
        first_lap.lap_number,
        first_driver.driver_number,
        second_lap.lap_number,
        second_driver.driver_number
    );
    let (track, first_detail, second_detail) = tokio::join!(
        provider.fetch_track_geometry(&key),
        provider.fetch_lap_detail(&key, &first_driver.driver_number, first_lap.lap_number),
        provider.fetch_lap_detail(&key, &second_driver.driver_number, second_lap.lap_number),
    );
    let track = track?;
    let first_detail = first_detail?;
    let second_detail = second_detail?;
    debug!(
        "Lap details resolved with {} and {} samples",
        first_detail.samples.len(),
        second_detail.samples.len()
    );

    let payload = ComparisonPayload {
        key,
        track,
        first: DriverLapData {
            driver: first_driver,
            lap: first_lap,
            detail: first_detail,
        },
        second: DriverLapData {
            driver: second_driver,
            lap: second_lap,
            detail: second_detail,
        },
    };
    renderer.draw_track_map(&payload.track);
    renderer.draw_dominance_map(&payload);
    Ok(payload)
}

impl ComparisonPayload {
    pub fn driver(&self, driver_slot: DriverSlot) -> &DriverLapData {
        match driver_slot {
            DriverSlot::First => &self.first,
            DriverSlot::Second => &self.second,
        }
    }

    /// Split the lap into `count` equal distance slices and pick the driver with the
    /// higher mean speed in each
    pub fn mini_sectors(&self, count: usize) -> Vec<MiniSector> {
        let lap_length = self
            .first
            .detail
            .samples
            .iter()
            .chain(self.second.detail.samples.iter())
            .map(|sample| sample.distance)
            .fold(0., f64::max);
        if count == 0 || lap_length <= 0. {
            return Vec::new();
        }
        let width = lap_length / count as f64;
        let first_speeds = binned_mean_speed(&self.first.detail, width, count);
        let second_speeds = binned_mean_speed(&self.second.detail, width, count);

        first_speeds
            .into_iter()
            .zip(second_speeds)
            .enumerate()
            .map(|(index, (first_speed, second_speed))| {
                let faster = match (first_speed, second_speed) {
                    (Some(first), Some(second)) if first > second => Some(DriverSlot::First),
                    (Some(first), Some(second)) if second > first => Some(DriverSlot::Second),
                    (Some(_), None) => Some(DriverSlot::First),
                    (None, Some(_)) => Some(DriverSlot::Second),
                    _ => None,
                };
                MiniSector {
                    index,
                    start_m: index as f64 * width,
                    end_m: (index + 1) as f64 * width,
                    first_speed,
                    second_speed,
                    faster,
                }
            })
            .collect()
    }
}

fn binned_mean_speed(detail: &LapDetail, width: f64, count: usize) -> Vec<Option<f64>> {
    let bins = detail
        .samples
        .iter()
        .filter(|sample| sample.distance.is_finite() && sample.speed.is_finite())
        .map(|sample| {
            let bin = ((sample.distance.max(0.) / width) as usize).min(count - 1);
            (bin, sample.speed)
        })
        .into_group_map();
    (0..count)
        .map(|bin| {
            bins.get(&bin)
                .map(|speeds| speeds.iter().sum::<f64>() / speeds.len() as f64)
        })
        .collect()
}
