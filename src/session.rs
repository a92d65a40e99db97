// Wires the selection wizard and the lap analyzer to a data provider and a renderer

use itertools::Itertools;
use log::{debug, info};

use crate::comparison::{
    ComparisonPayload, ComparisonRenderer, ComparisonRequest, assemble_comparison,
};
use crate::config::AppConfig;
use crate::errors::SlipstreamError;
use crate::laps::{ChosenLaps, LapAnalyzer, LapChartSeries};
use crate::model::{Driver, LapSample, SessionKey};
use crate::provider::LapDataProvider;
use crate::search::SearchIndex;
use crate::wizard::{DriverSlot, SelectionWizard, SlotChange, Ticket, WizardEffect};

/// One lap comparison session.
///
/// Every operation takes `&mut self` and runs to completion, including the provider
/// requests it triggers, before the next one can start. Results of requests issued for
/// a selection that has since changed are dropped.
pub struct ComparisonSession<P> {
    provider: P,
    wizard: SelectionWizard,
    analyzer: LapAnalyzer,
    years: SearchIndex<i32>,
    venues: SearchIndex<String>,
    session_types: Vec<String>,
    drivers: SearchIndex<Driver>,
    /// Driver whose laps are currently in the analyzer
    loaded_driver: Option<(DriverSlot, Driver)>,
    comparison: Option<ComparisonPayload>,
}

impl<P: LapDataProvider> ComparisonSession<P> {
    pub fn new(provider: P, config: &AppConfig) -> Self {
        Self {
            provider,
            wizard: SelectionWizard::new(),
            analyzer: LapAnalyzer::new(config.outlier_factor),
            years: SearchIndex::new(config.seasons()),
            venues: SearchIndex::default(),
            session_types: Vec::new(),
            drivers: SearchIndex::default(),
            loaded_driver: None,
            comparison: None,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn wizard(&self) -> &SelectionWizard {
        &self.wizard
    }

    pub fn analyzer(&self) -> &LapAnalyzer {
        &self.analyzer
    }

    pub fn years(&self) -> impl Iterator<Item = &i32> {
        self.years.items()
    }

    pub fn venues(&self) -> impl Iterator<Item = &String> {
        self.venues.items()
    }

    pub fn session_types(&self) -> &[String] {
        &self.session_types
    }

    /// Drivers of the selected session, ascending by car number
    pub fn drivers(&self) -> impl Iterator<Item = &Driver> {
        self.drivers.items()
    }

    pub fn filter_years(&self, query: &str) -> Vec<&i32> {
        self.years.filter(query)
    }

    pub fn filter_venues(&self, query: &str) -> Vec<&String> {
        self.venues.filter(query)
    }

    pub fn filter_drivers(&self, query: &str) -> Vec<&Driver> {
        self.drivers.filter(query)
    }

    pub fn loaded_driver(&self) -> Option<&(DriverSlot, Driver)> {
        self.loaded_driver.as_ref()
    }

    pub fn display_laps(&self) -> &[LapSample] {
        self.analyzer.display_laps()
    }

    pub fn chart_series(&self) -> LapChartSeries {
        self.analyzer.chart_series()
    }

    pub fn chosen_laps(&self) -> &ChosenLaps {
        self.analyzer.chosen_laps()
    }

    pub fn comparison(&self) -> Option<&ComparisonPayload> {
        self.comparison.as_ref()
    }

    pub fn is_current_step_invalid(&self) -> bool {
        self.wizard.is_current_step_invalid()
    }

    pub async fn on_slot_changed(&mut self, change: SlotChange) -> Result<(), SlipstreamError> {
        let effects = self.wizard.on_slot_changed(change);
        self.execute(effects).await
    }

    pub async fn advance(&mut self) -> Result<(), SlipstreamError> {
        let effects = self.wizard.advance();
        self.execute(effects).await
    }

    pub async fn retreat(&mut self) -> Result<(), SlipstreamError> {
        let effects = self.wizard.retreat();
        self.execute(effects).await
    }

    /// Back to an empty selection on the first step
    pub async fn reinitialize(&mut self) -> Result<(), SlipstreamError> {
        let effects = self.wizard.reinitialize();
        self.venues = SearchIndex::default();
        self.session_types.clear();
        self.drivers = SearchIndex::default();
        self.execute(effects).await
    }

    pub fn toggle_invalid_laps(&mut self) {
        self.analyzer.toggle_invalid_laps();
    }

    pub fn toggle_outliers(&mut self) {
        self.analyzer.toggle_outliers();
    }

    /// Pick the displayed lap at `index` for the driver of the active step.
    ///
    /// The displayed laps must belong to that driver.
    pub fn select_lap(&mut self, index: usize) -> Result<LapSample, SlipstreamError> {
        let step = self.wizard.active_step();
        let target = self
            .wizard
            .active_driver_slot()
            .ok_or(SlipstreamError::NoActiveDriver { step })?;
        let driver = self.wizard.state().driver(target).value();
        match &self.loaded_driver {
            Some((slot, loaded)) if *slot == target && Some(loaded) == driver => {
                self.analyzer.select_lap(index, target)
            }
            _ => Err(SlipstreamError::LapsNotLoaded { step }),
        }
    }

    /// Set both toggles to the given state
    pub fn show_laps(&mut self, show_invalid: bool, show_outliers: bool) {
        if self.analyzer.show_invalid() != show_invalid {
            self.analyzer.toggle_invalid_laps();
        }
        if self.analyzer.show_outliers() != show_outliers {
            self.analyzer.toggle_outliers();
        }
    }

    /// Pick a displayed lap by its lap number
    pub fn select_lap_number(&mut self, lap_number: u32) -> Result<LapSample, SlipstreamError> {
        let index = self
            .analyzer
            .display_laps()
            .iter()
            .position(|lap| lap.lap_number == lap_number)
            .ok_or_else(|| SlipstreamError::InvalidUserInput {
                field: "lap".to_string(),
                reason: format!("lap {lap_number} is not among the displayed laps"),
            })?;
        self.select_lap(index)
    }

    pub fn is_comparison_possible(&self) -> bool {
        self.analyzer.is_comparison_possible()
    }

    /// Fetch both lap details and the track geometry, then draw the comparison.
    ///
    /// Refuses to issue any request unless both drivers have a lap picked.
    pub async fn run_comparison<R>(
        &mut self,
        renderer: &mut R,
    ) -> Result<&ComparisonPayload, SlipstreamError>
    where
        R: ComparisonRenderer + ?Sized,
    {
        let request = self.comparison_request()?;
        let payload = assemble_comparison(&self.provider, request, renderer).await?;
        Ok(&*self.comparison.insert(payload))
    }

    fn comparison_request(&self) -> Result<ComparisonRequest, SlipstreamError> {
        let not_ready = |reason: &str| SlipstreamError::ComparisonNotReady {
            reason: reason.to_string(),
        };
        if !self.is_comparison_possible() {
            return Err(not_ready("a lap must be picked for both drivers"));
        }
        let state = self.wizard.state();
        let key = state
            .session_key()
            .ok_or_else(|| not_ready("season, venue and session must be selected"))?;
        let first_driver = state
            .first_driver()
            .filled()
            .cloned()
            .ok_or_else(|| not_ready("first driver is not selected"))?;
        let second_driver = state
            .second_driver()
            .filled()
            .cloned()
            .ok_or_else(|| not_ready("second driver is not selected"))?;
        let ChosenLaps { first, second } = self.analyzer.chosen_laps().clone();
        match (first, second) {
            (Some(first_lap), Some(second_lap)) => Ok(ComparisonRequest {
                key,
                first: (first_driver, first_lap),
                second: (second_driver, second_lap),
            }),
            _ => Err(not_ready("a lap must be picked for both drivers")),
        }
    }

    fn is_stale(&self, ticket: Ticket) -> bool {
        ticket != self.wizard.current_ticket()
    }

    async fn execute(&mut self, effects: Vec<WizardEffect>) -> Result<(), SlipstreamError> {
        for effect in effects {
            let result = match effect {
                WizardEffect::FetchVenues { ticket, year } => FetchResult::Venues {
                    ticket,
                    year,
                    venues: self.provider.fetch_venues(year).await?,
                },
                WizardEffect::FetchSessions {
                    ticket,
                    year,
                    venue,
                } => FetchResult::Sessions {
                    ticket,
                    sessions: self.provider.fetch_sessions(year, &venue).await?,
                    venue,
                },
                WizardEffect::FetchDrivers { ticket, key } => FetchResult::Drivers {
                    ticket,
                    drivers: self.provider.fetch_drivers(&key).await?,
                    key,
                },
                WizardEffect::ClearChosenLaps => {
                    self.analyzer.clear_chosen_laps();
                    self.comparison = None;
                    continue;
                }
                WizardEffect::LoadLaps {
                    ticket,
                    target,
                    key,
                    driver,
                    preserve_selection,
                } => {
                    self.analyzer.begin_load(target, preserve_selection);
                    match self.provider.fetch_laps(&key, &driver.driver_number).await {
                        Ok(laps) => FetchResult::Laps {
                            ticket,
                            target,
                            driver,
                            laps,
                        },
                        Err(e) => {
                            // the list on screen must never belong to another driver
                            self.analyzer.clear_laps();
                            self.loaded_driver = None;
                            return Err(e);
                        }
                    }
                }
                WizardEffect::ClearLaps => {
                    self.analyzer.clear_laps();
                    self.loaded_driver = None;
                    continue;
                }
            };
            self.apply(result);
        }
        Ok(())
    }

    /// Store a provider result unless the selection it was requested for is gone.
    /// Returns whether the result was kept.
    pub(crate) fn apply(&mut self, result: FetchResult) -> bool {
        match result {
            FetchResult::Venues {
                ticket,
                year,
                venues,
            } => {
                if self.is_stale(ticket) {
                    debug!("Dropping venues of {year}, selection changed meanwhile");
                    return false;
                }
                info!("Found {} venues for {year}", venues.len());
                self.venues = SearchIndex::new(venues);
            }
            FetchResult::Sessions {
                ticket,
                venue,
                sessions,
            } => {
                if self.is_stale(ticket) {
                    debug!("Dropping sessions of {venue}, selection changed meanwhile");
                    return false;
                }
                info!("Found {} sessions at {venue}", sessions.len());
                self.session_types = sessions;
            }
            FetchResult::Drivers {
                ticket,
                key,
                drivers,
            } => {
                if self.is_stale(ticket) {
                    debug!("Dropping drivers of {key}, selection changed meanwhile");
                    return false;
                }
                info!("Found {} drivers in {key}", drivers.len());
                self.drivers = SearchIndex::new(
                    drivers
                        .into_iter()
                        .sorted_by_key(Driver::sort_key)
                        .collect(),
                );
            }
            FetchResult::Laps {
                ticket,
                target,
                driver,
                laps,
            } => {
                let still_selected = self.wizard.state().driver(target).value() == Some(&driver);
                if self.is_stale(ticket) || !still_selected {
                    debug!(
                        "Dropping laps of #{}, selection changed meanwhile",
                        driver.driver_number
                    );
                    return false;
                }
                info!("Loaded {} laps of {driver}", laps.len());
                self.analyzer.load_laps(laps);
                self.loaded_driver = Some((target, driver));
            }
        }
        true
    }
}

/// A provider response together with the selection generation it was requested under
pub(crate) enum FetchResult {
    Venues {
        ticket: Ticket,
        year: i32,
        venues: Vec<String>,
    },
    Sessions {
        ticket: Ticket,
        venue: String,
        sessions: Vec<String>,
    },
    Drivers {
        ticket: Ticket,
        key: SessionKey,
        drivers: Vec<Driver>,
    },
    Laps {
        ticket: Ticket,
        target: DriverSlot,
        driver: Driver,
        laps: Vec<LapSample>,
    },
}
