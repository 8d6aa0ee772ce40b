//! WAV file export functionality

use crate::sound::Sound;
use crate::{Result, WaveError};
use std::path::Path;

/// Write the sound's current samples as a stereo 16-bit PCM WAV file
///
/// The header carries the current sample rate, so a speed change is baked
/// into the exported file.
///
/// # Examples
///
/// ```no_run
/// use wavedance::{export_to_wav, Sound};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut sound = Sound::new();
/// sound.load("song.wav")?;
/// sound.reverse();
/// export_to_wav(&sound, "reversed.wav")?;
/// # Ok(())
/// # }
/// ```
pub fn export_to_wav<P: AsRef<Path>>(sound: &Sound, output_path: P) -> Result<()> {
    let format = sound.format().ok_or(WaveError::NotLoaded)?;
    let spec = hound::WavSpec {
        channels: format.channels,
        sample_rate: format.sample_rate,
        bits_per_sample: format.bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(output_path.as_ref(), spec)
        .map_err(|e| WaveError::AudioFileError(format!("Failed to create WAV file: {}", e)))?;

    for &sample in sound.samples() {
        writer
            .write_sample(sample)
            .map_err(|e| WaveError::AudioFileError(format!("Failed to write sample: {}", e)))?;
    }

    writer
        .finalize()
        .map_err(|e| WaveError::AudioFileError(format!("Failed to finalize WAV file: {}", e)))?;

    log::info!(
        "Exported {} frames to {}",
        sound.sample_count(),
        output_path.as_ref().display()
    );
    Ok(())
}
