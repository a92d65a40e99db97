// Error types for slipstream

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum SlipstreamError {
    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error reading or writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Data retrieval errors
    #[snafu(display("No {what} available at {path}"))]
    DataNotFound { what: String, path: String },
    #[snafu(display("Error reading data file {path}"))]
    DataLoadError { path: String, source: io::Error },
    #[snafu(display("Error parsing data file {path}"))]
    DataParseError {
        path: String,
        source: serde_json::Error,
    },
    #[snafu(display("Lap data provider error: {description}"))]
    ProviderError { description: String },

    // Lap selection and comparison errors
    #[snafu(display("Lap index {index} is out of range, {len} laps are displayed"))]
    LapIndexOutOfRange { index: usize, len: usize },
    #[snafu(display("Laps can only be picked while choosing a driver, current step is {step}"))]
    NoActiveDriver { step: usize },
    #[snafu(display("No laps are loaded for the driver of step {step}"))]
    LapsNotLoaded { step: usize },
    #[snafu(display("Comparison is not possible yet: {reason}"))]
    ComparisonNotReady { reason: String },

    // User input validation errors
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },

    // Errors for the export writer
    #[snafu(display("Error writing output file"))]
    WriterError { source: io::Error },
}
