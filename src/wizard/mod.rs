// Guarded five step selection wizard: year, venue, session, first and second driver

pub mod effects;
pub mod selection;

use log::{debug, info, warn};

pub use effects::{DriverSlot, Ticket, WizardEffect};
pub use selection::{Required, SelectionState, Slot, SlotChange, SlotRecord};

/// Index of the last wizard step
pub const LAST_STEP: usize = Slot::ORDER.len() - 1;

/// How a step is presented in the stepper header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepView {
    pub label: &'static str,
    pub active: bool,
    pub filled: bool,
}

/// Enforces the Year → Venue → Session → First driver → Second driver order.
///
/// The wizard never talks to the data source itself. Every operation returns the
/// [`WizardEffect`]s the host has to carry out, in order.
#[derive(Clone, Debug, Default)]
pub struct SelectionWizard {
    state: SelectionState,
    active_step: usize,
}

impl SelectionWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn active_step(&self) -> usize {
        self.active_step
    }

    pub fn active_slot(&self) -> Slot {
        // active_step is kept within 0..=LAST_STEP
        Slot::ORDER[self.active_step]
    }

    /// Driver slot bound to the active step, if the active step picks a driver
    pub fn active_driver_slot(&self) -> Option<DriverSlot> {
        self.active_slot().driver_slot()
    }

    pub fn steps(&self) -> Vec<StepView> {
        Slot::ORDER
            .iter()
            .map(|slot| StepView {
                label: slot.label(),
                active: slot.index() == self.active_step,
                filled: self.state.is_filled(*slot),
            })
            .collect()
    }

    pub fn current_ticket(&self) -> Ticket {
        Ticket(self.state.generation())
    }

    pub fn is_current_step_invalid(&self) -> bool {
        !self.state.is_filled(self.active_slot())
    }

    /// The active slot and every slot before it hold a valid value
    fn is_path_filled(&self) -> bool {
        Slot::ORDER[..=self.active_step]
            .iter()
            .all(|slot| self.state.is_filled(*slot))
    }

    /// Start over: every slot unset, back on the first step
    pub fn reinitialize(&mut self) -> Vec<WizardEffect> {
        self.state.clear();
        self.active_step = 0;
        vec![WizardEffect::ClearChosenLaps, WizardEffect::ClearLaps]
    }

    /// React to the user picking a value for a slot.
    ///
    /// Re-selecting the value last committed for the slot is a no-op. A genuinely new
    /// value resets every downstream slot, clears both chosen laps and requests the
    /// data the next selection depends on.
    pub fn on_slot_changed(&mut self, change: SlotChange) -> Vec<WizardEffect> {
        let slot = change.slot();
        if !self.state.is_change(&change) {
            debug!("{slot} re-selected with its committed value, nothing to do");
            self.state.set(change);
            return Vec::new();
        }

        let filled = change.is_filled();
        self.state.set(change);
        if !filled {
            debug!("{slot} cleared, waiting for a value");
            return Vec::new();
        }

        self.state.reset_after(slot);
        let generation = self.state.bump_generation();
        info!("{slot} changed, resetting {:?}", slot.downstream());

        let mut effects = vec![WizardEffect::ClearChosenLaps];
        effects.extend(self.fetch_for(slot, Ticket(generation), false));
        effects
    }

    /// Move to the next step if the active slot holds a valid value
    pub fn advance(&mut self) -> Vec<WizardEffect> {
        if self.active_step == LAST_STEP {
            return Vec::new();
        }
        if !self.is_path_filled() {
            debug!(
                "Cannot leave step {}, {} or an earlier slot is not filled",
                self.active_step,
                self.active_slot()
            );
            return Vec::new();
        }

        self.state.commit(self.active_slot());
        self.active_step += 1;
        self.on_step_entered()
    }

    /// Move to the previous step
    pub fn retreat(&mut self) -> Vec<WizardEffect> {
        if self.active_step == 0 {
            return Vec::new();
        }

        self.state.commit(self.active_slot());
        self.active_step -= 1;
        self.on_step_entered()
    }

    fn on_step_entered(&self) -> Vec<WizardEffect> {
        debug!("Entered step {} ({})", self.active_step, self.active_slot());
        let Some(driver_slot) = self.active_driver_slot() else {
            return Vec::new();
        };
        if self.state.driver(driver_slot).is_filled() {
            self.fetch_for(self.active_slot(), self.current_ticket(), true)
                .into_iter()
                .collect()
        } else {
            vec![WizardEffect::ClearLaps]
        }
    }

    fn fetch_for(
        &self,
        slot: Slot,
        ticket: Ticket,
        preserve_selection: bool,
    ) -> Option<WizardEffect> {
        let effect = match slot {
            Slot::Year => WizardEffect::FetchVenues {
                ticket,
                year: *self.state.year().filled()?,
            },
            Slot::Venue => {
                let year = self.state.year().filled();
                let venue = self.state.venue().filled();
                match (year, venue) {
                    (Some(year), Some(venue)) => WizardEffect::FetchSessions {
                        ticket,
                        year: *year,
                        venue: venue.clone(),
                    },
                    _ => {
                        warn!("Venue picked before a season, not fetching sessions");
                        return None;
                    }
                }
            }
            Slot::SessionType => match self.state.session_key() {
                Some(key) => WizardEffect::FetchDrivers { ticket, key },
                None => {
                    warn!("Session picked before season and venue, not fetching drivers");
                    return None;
                }
            },
            Slot::FirstDriver | Slot::SecondDriver => {
                let target = slot.driver_slot()?;
                let driver = self.state.driver(target).filled()?.clone();
                match self.state.session_key() {
                    Some(key) => WizardEffect::LoadLaps {
                        ticket,
                        target,
                        key,
                        driver,
                        preserve_selection,
                    },
                    None => {
                        warn!("Driver picked before the session is known, not loading laps");
                        return None;
                    }
                }
            }
        };
        Some(effect)
    }
}
