// Selection slots and the state they hold

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Driver, SessionKey};

use super::effects::DriverSlot;

/// The five ordered selections the wizard walks through
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    Year,
    Venue,
    SessionType,
    FirstDriver,
    SecondDriver,
}

impl Slot {
    /// Slots in dependency order, position `i` is bound to wizard step `i`
    pub const ORDER: [Slot; 5] = [
        Slot::Year,
        Slot::Venue,
        Slot::SessionType,
        Slot::FirstDriver,
        Slot::SecondDriver,
    ];

    pub fn index(self) -> usize {
        match self {
            Slot::Year => 0,
            Slot::Venue => 1,
            Slot::SessionType => 2,
            Slot::FirstDriver => 3,
            Slot::SecondDriver => 4,
        }
    }

    pub fn from_step(step: usize) -> Option<Slot> {
        Self::ORDER.get(step).copied()
    }

    /// Slots that depend on this one
    pub fn downstream(self) -> &'static [Slot] {
        &Self::ORDER[self.index() + 1..]
    }

    pub fn label(self) -> &'static str {
        match self {
            Slot::Year => "Select Year",
            Slot::Venue => "Select Venue",
            Slot::SessionType => "Select Session",
            Slot::FirstDriver => "Select First Driver",
            Slot::SecondDriver => "Select Second Driver",
        }
    }

    pub fn driver_slot(self) -> Option<DriverSlot> {
        match self {
            Slot::FirstDriver => Some(DriverSlot::First),
            Slot::SecondDriver => Some(DriverSlot::Second),
            _ => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Year => write!(f, "year"),
            Slot::Venue => write!(f, "venue"),
            Slot::SessionType => write!(f, "sessionType"),
            Slot::FirstDriver => write!(f, "firstDriver"),
            Slot::SecondDriver => write!(f, "secondDriver"),
        }
    }
}

/// Values a slot may hold must say whether they satisfy the "required" rule
pub trait Required {
    fn is_filled(&self) -> bool;
}

impl Required for i32 {
    fn is_filled(&self) -> bool {
        true
    }
}

impl Required for String {
    fn is_filled(&self) -> bool {
        !self.is_empty()
    }
}

impl Required for Driver {
    fn is_filled(&self) -> bool {
        !self.driver_number.is_empty()
    }
}

/// A single selection slot: its current value plus the value last committed by step
/// navigation. Only a value that differs from the committed one counts as a change.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotRecord<T> {
    value: Option<T>,
    last_committed: Option<T>,
}

impl<T> Default for SlotRecord<T> {
    fn default() -> Self {
        Self {
            value: None,
            last_committed: None,
        }
    }
}

impl<T: Clone + PartialEq + Required> SlotRecord<T> {
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn last_committed(&self) -> Option<&T> {
        self.last_committed.as_ref()
    }

    pub fn is_filled(&self) -> bool {
        self.value.as_ref().is_some_and(|value| value.is_filled())
    }

    /// Filled value, `None` when the slot is unset or fails the required rule
    pub fn filled(&self) -> Option<&T> {
        self.value.as_ref().filter(|value| value.is_filled())
    }

    fn is_change(&self, new_value: &T) -> bool {
        self.last_committed.as_ref() != Some(new_value)
    }

    fn set(&mut self, new_value: T) {
        self.value = Some(new_value);
    }

    fn commit(&mut self) {
        self.last_committed = self.value.clone();
    }

    fn reset(&mut self) {
        self.value = None;
        self.last_committed = None;
    }
}

/// A new value for one slot, as chosen by the user
#[derive(Clone, Debug, PartialEq)]
pub enum SlotChange {
    Year(i32),
    Venue(String),
    SessionType(String),
    FirstDriver(Driver),
    SecondDriver(Driver),
}

impl SlotChange {
    pub fn slot(&self) -> Slot {
        match self {
            SlotChange::Year(_) => Slot::Year,
            SlotChange::Venue(_) => Slot::Venue,
            SlotChange::SessionType(_) => Slot::SessionType,
            SlotChange::FirstDriver(_) => Slot::FirstDriver,
            SlotChange::SecondDriver(_) => Slot::SecondDriver,
        }
    }

    pub(crate) fn is_filled(&self) -> bool {
        match self {
            SlotChange::Year(year) => year.is_filled(),
            SlotChange::Venue(venue) => venue.is_filled(),
            SlotChange::SessionType(session_type) => session_type.is_filled(),
            SlotChange::FirstDriver(driver) | SlotChange::SecondDriver(driver) => {
                driver.is_filled()
            }
        }
    }
}

/// The five selection slots of a wizard session.
///
/// `generation` is bumped on every genuine slot change, so results of requests issued
/// for an earlier selection can be told apart from current ones.
#[derive(Clone, Debug, Default)]
pub struct SelectionState {
    year: SlotRecord<i32>,
    venue: SlotRecord<String>,
    session_type: SlotRecord<String>,
    first_driver: SlotRecord<Driver>,
    second_driver: SlotRecord<Driver>,
    generation: u64,
}

impl SelectionState {
    pub fn year(&self) -> &SlotRecord<i32> {
        &self.year
    }

    pub fn venue(&self) -> &SlotRecord<String> {
        &self.venue
    }

    pub fn session_type(&self) -> &SlotRecord<String> {
        &self.session_type
    }

    pub fn first_driver(&self) -> &SlotRecord<Driver> {
        &self.first_driver
    }

    pub fn second_driver(&self) -> &SlotRecord<Driver> {
        &self.second_driver
    }

    pub fn driver(&self, driver_slot: DriverSlot) -> &SlotRecord<Driver> {
        match driver_slot {
            DriverSlot::First => &self.first_driver,
            DriverSlot::Second => &self.second_driver,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_filled(&self, slot: Slot) -> bool {
        match slot {
            Slot::Year => self.year.is_filled(),
            Slot::Venue => self.venue.is_filled(),
            Slot::SessionType => self.session_type.is_filled(),
            Slot::FirstDriver => self.first_driver.is_filled(),
            Slot::SecondDriver => self.second_driver.is_filled(),
        }
    }

    /// Season, venue and session type, once all three are filled
    pub fn session_key(&self) -> Option<SessionKey> {
        Some(SessionKey {
            year: *self.year.filled()?,
            venue: self.venue.filled()?.clone(),
            session_type: self.session_type.filled()?.clone(),
        })
    }

    pub(crate) fn is_change(&self, change: &SlotChange) -> bool {
        match change {
            SlotChange::Year(year) => self.year.is_change(year),
            SlotChange::Venue(venue) => self.venue.is_change(venue),
            SlotChange::SessionType(session_type) => self.session_type.is_change(session_type),
            SlotChange::FirstDriver(driver) => self.first_driver.is_change(driver),
            SlotChange::SecondDriver(driver) => self.second_driver.is_change(driver),
        }
    }

    pub(crate) fn set(&mut self, change: SlotChange) {
        match change {
            SlotChange::Year(year) => self.year.set(year),
            SlotChange::Venue(venue) => self.venue.set(venue),
            SlotChange::SessionType(session_type) => self.session_type.set(session_type),
            SlotChange::FirstDriver(driver) => self.first_driver.set(driver),
            SlotChange::SecondDriver(driver) => self.second_driver.set(driver),
        }
    }

    pub(crate) fn commit(&mut self, slot: Slot) {
        match slot {
            Slot::Year => self.year.commit(),
            Slot::Venue => self.venue.commit(),
            Slot::SessionType => self.session_type.commit(),
            Slot::FirstDriver => self.first_driver.commit(),
            Slot::SecondDriver => self.second_driver.commit(),
        }
    }

    pub(crate) fn reset(&mut self, slot: Slot) {
        match slot {
            Slot::Year => self.year.reset(),
            Slot::Venue => self.venue.reset(),
            Slot::SessionType => self.session_type.reset(),
            Slot::FirstDriver => self.first_driver.reset(),
            Slot::SecondDriver => self.second_driver.reset(),
        }
    }

    pub(crate) fn reset_after(&mut self, slot: Slot) {
        for downstream in slot.downstream() {
            self.reset(*downstream);
        }
    }

    /// Unset every slot. The generation keeps counting so in-flight results stay stale.
    pub(crate) fn clear(&mut self) {
        for slot in Slot::ORDER {
            self.reset(slot);
        }
        self.bump_generation();
    }

    pub(crate) fn bump_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }
}
