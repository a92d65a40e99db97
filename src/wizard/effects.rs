// Side effects requested by the wizard, executed by the hosting session

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Driver, SessionKey};

/// Which of the two compared drivers a lap or a load belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DriverSlot {
    First,
    Second,
}

impl fmt::Display for DriverSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverSlot::First => write!(f, "first driver"),
            DriverSlot::Second => write!(f, "second driver"),
        }
    }
}

/// Selection generation a request was issued under
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(pub(crate) u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum WizardEffect {
    FetchVenues {
        ticket: Ticket,
        year: i32,
    },
    FetchSessions {
        ticket: Ticket,
        year: i32,
        venue: String,
    },
    FetchDrivers {
        ticket: Ticket,
        key: SessionKey,
    },
    /// Forget the laps picked for both drivers
    ClearChosenLaps,
    /// Replace the working lap list with the laps of `driver`. When
    /// `preserve_selection` is set the lap already picked for `target` is kept.
    LoadLaps {
        ticket: Ticket,
        target: DriverSlot,
        key: SessionKey,
        driver: Driver,
        preserve_selection: bool,
    },
    /// Empty the working lap list
    ClearLaps,
}
