// Library interface for slipstream
// This allows integration tests to access internal modules

pub mod comparison;
pub mod config;
pub mod errors;
pub mod laps;
pub mod model;
pub mod provider;
pub mod search;
pub mod session;
pub mod wizard;
pub mod writer;

// Re-export commonly used types
pub use comparison::{ComparisonPayload, ComparisonRenderer, ComparisonRequest, MiniSector};
pub use config::AppConfig;
pub use errors::SlipstreamError;
pub use laps::{ChosenLaps, LapAnalyzer};
pub use model::{Driver, LapDetail, LapSample, LapTime, SessionKey, TrackGeometry};
pub use provider::{FileBasedProvider, LapDataProvider};
pub use session::ComparisonSession;
pub use wizard::{DriverSlot, SelectionWizard, Slot, SlotChange, WizardEffect};
