pub mod filters;
pub mod series;

use log::debug;
use serde::Serialize;

use crate::errors::SlipstreamError;
use crate::model::LapSample;
use crate::wizard::DriverSlot;

pub use filters::{
    DEFAULT_OUTLIER_FACTOR, display_laps, median_lap_time, outlier_threshold, remove_invalid_laps,
    remove_outliers,
};
pub use series::{AxisRange, ChartPoint, LapChartSeries, lap_time_series};

/// The lap picked for each of the two drivers
#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct ChosenLaps {
    pub first: Option<LapSample>,
    pub second: Option<LapSample>,
}

impl ChosenLaps {
    pub fn get(&self, driver_slot: DriverSlot) -> Option<&LapSample> {
        match driver_slot {
            DriverSlot::First => self.first.as_ref(),
            DriverSlot::Second => self.second.as_ref(),
        }
    }

    fn set(&mut self, driver_slot: DriverSlot, lap: Option<LapSample>) {
        match driver_slot {
            DriverSlot::First => self.first = lap,
            DriverSlot::Second => self.second = lap,
        }
    }

    /// Both laps are picked and carry a real lap number
    pub fn is_complete(&self) -> bool {
        matches!(
            (&self.first, &self.second),
            (Some(first), Some(second)) if first.lap_number > 0 && second.lap_number > 0
        )
    }
}

/// Holds the raw laps of the driver being picked from and the display set derived from
/// them under the "show invalid" and "show outliers" toggles.
///
/// The display set is recomputed from the raw laps on every change, never patched.
#[derive(Clone, Debug)]
pub struct LapAnalyzer {
    raw_laps: Vec<LapSample>,
    displayed: Vec<LapSample>,
    show_invalid: bool,
    show_outliers: bool,
    outlier_factor: f64,
    chosen: ChosenLaps,
}

impl Default for LapAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_OUTLIER_FACTOR)
    }
}

impl LapAnalyzer {
    pub fn new(outlier_factor: f64) -> Self {
        Self {
            raw_laps: Vec::new(),
            displayed: Vec::new(),
            show_invalid: false,
            show_outliers: false,
            outlier_factor,
            chosen: ChosenLaps::default(),
        }
    }

    pub fn raw_laps(&self) -> &[LapSample] {
        &self.raw_laps
    }

    pub fn display_laps(&self) -> &[LapSample] {
        &self.displayed
    }

    pub fn show_invalid(&self) -> bool {
        self.show_invalid
    }

    pub fn show_outliers(&self) -> bool {
        self.show_outliers
    }

    pub fn outlier_factor(&self) -> f64 {
        self.outlier_factor
    }

    pub fn chosen_laps(&self) -> &ChosenLaps {
        &self.chosen
    }

    pub fn chart_series(&self) -> LapChartSeries {
        lap_time_series(&self.displayed, &self.raw_laps)
    }

    /// Prepare for a new lap list: both toggles go back to hiding, and unless
    /// `preserve_selection` is set the lap picked for `target` is dropped.
    pub fn begin_load(&mut self, target: DriverSlot, preserve_selection: bool) {
        self.show_invalid = false;
        self.show_outliers = false;
        if !preserve_selection {
            self.chosen.set(target, None);
        }
        self.recompute();
    }

    /// Replace the raw lap list wholesale
    pub fn load_laps(&mut self, laps: Vec<LapSample>) {
        self.raw_laps = laps;
        self.recompute();
        debug!(
            "Loaded {} laps, displaying {}",
            self.raw_laps.len(),
            self.displayed.len()
        );
    }

    pub fn clear_laps(&mut self) {
        self.raw_laps.clear();
        self.recompute();
    }

    pub fn clear_chosen_laps(&mut self) {
        self.chosen = ChosenLaps::default();
    }

    pub fn toggle_invalid_laps(&mut self) {
        self.show_invalid = !self.show_invalid;
        self.recompute();
    }

    /// Turning outliers "on" stops removing them, it never selects only outliers
    pub fn toggle_outliers(&mut self) {
        self.show_outliers = !self.show_outliers;
        self.recompute();
    }

    /// Pick the lap at `index` of the display set for `target`
    pub fn select_lap(
        &mut self,
        index: usize,
        target: DriverSlot,
    ) -> Result<LapSample, SlipstreamError> {
        let lap = self
            .displayed
            .get(index)
            .cloned()
            .ok_or(SlipstreamError::LapIndexOutOfRange {
                index,
                len: self.displayed.len(),
            })?;
        debug!("Picked lap {} for the {target}", lap.lap_number);
        self.chosen.set(target, Some(lap.clone()));
        Ok(lap)
    }

    pub fn is_comparison_possible(&self) -> bool {
        self.chosen.is_complete()
    }

    fn recompute(&mut self) {
        self.displayed = display_laps(
            &self.raw_laps,
            self.show_invalid,
            self.show_outliers,
            self.outlier_factor,
        );
    }
}
