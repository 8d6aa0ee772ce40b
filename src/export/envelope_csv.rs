//! Envelope CSV export
//!
//! One row per frame: `index,time_s,left_volume,right_volume,left_forward,right_forward`.

use crate::sound::Sound;
use crate::{Result, WaveError};
use std::io::Write;

/// Write the derived arrays of `sound` as CSV to `out`
///
/// Every `stride`-th frame is written (a stride of 0 is treated as 1), which
/// keeps dumps of long files small enough to plot.
pub fn write_envelope_csv<W: Write>(sound: &Sound, out: W, stride: usize) -> Result<usize> {
    let format = sound.format().ok_or(WaveError::NotLoaded)?;
    let env = sound.envelope();
    let stride = stride.max(1);
    let rate = format.sample_rate as f64;

    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record([
            "index",
            "time_s",
            "left_volume",
            "right_volume",
            "left_forward",
            "right_forward",
        ])
        .map_err(csv_error)?;

    let mut rows = 0;
    for i in (0..env.len()).step_by(stride) {
        writer
            .write_record(&[
                i.to_string(),
                format!("{:.6}", i as f64 / rate),
                env.left_volume[i].to_string(),
                env.right_volume[i].to_string(),
                env.left_forward_avg[i].to_string(),
                env.right_forward_avg[i].to_string(),
            ])
            .map_err(csv_error)?;
        rows += 1;
    }

    writer.flush()?;
    log::debug!("Wrote {} envelope rows (stride {})", rows, stride);
    Ok(rows)
}

fn csv_error(e: csv::Error) -> WaveError {
    WaveError::AudioFileError(format!("Failed to write CSV: {}", e))
}
