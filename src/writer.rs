use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::info;

use crate::{SlipstreamError, comparison::ComparisonPayload, model::LapSample};

/// Write the laps one JSON object per line
pub fn write_display_laps(file: &Path, laps: &[LapSample]) -> Result<(), SlipstreamError> {
    serde_jsonlines::write_json_lines(file, laps)
        .map_err(|e| SlipstreamError::WriterError { source: e })?;
    info!("Wrote {} laps to {}", laps.len(), file.display());
    Ok(())
}

pub fn write_comparison(file: &Path, payload: &ComparisonPayload) -> Result<(), SlipstreamError> {
    let comparison_file =
        File::create(file).map_err(|e| SlipstreamError::WriterError { source: e })?;
    let mut comparison_file_writer = BufWriter::new(comparison_file);
    serde_json::to_writer_pretty(&mut comparison_file_writer, payload)
        .map_err(|e| SlipstreamError::WriterError { source: e.into() })?;
    comparison_file_writer
        .flush()
        .map_err(|e| SlipstreamError::WriterError { source: e })?;
    info!("Wrote comparison of {} to {}", payload.key, file.display());
    Ok(())
}
