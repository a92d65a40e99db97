use serde::Serialize;

use crate::model::LapSample;

pub const LAP_TIME_SERIES_NAME: &str = "Lap Time";

#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct ChartPoint {
    /// Lap number
    pub x: u32,
    /// Lap time in seconds, 0 for laps without a usable time
    pub y: f64,
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisRange {
    pub min: u32,
    pub max: u32,
}

/// Chart-ready lap time trend of the displayed laps
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct LapChartSeries {
    pub name: &'static str,
    pub points: Vec<ChartPoint>,
    /// Spans every raw lap so the axis does not rescale when laps are hidden
    pub x_axis: AxisRange,
}

pub fn lap_time_series(displayed: &[LapSample], raw_laps: &[LapSample]) -> LapChartSeries {
    let points = displayed
        .iter()
        .map(|lap| ChartPoint {
            x: lap.lap_number,
            y: lap.lap_time.seconds().unwrap_or(0.),
        })
        .collect();
    let max = raw_laps
        .iter()
        .map(|lap| lap.lap_number)
        .max()
        .unwrap_or(1)
        .max(1);
    LapChartSeries {
        name: LAP_TIME_SERIES_NAME,
        points,
        x_axis: AxisRange { min: 1, max },
    }
}
