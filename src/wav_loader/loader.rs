//! WAV File Loader
//!
//! Reads WAV files from disk, distinguishing a missing file from other I/O
//! failures before delegating to [`parse_wave`].

use crate::wav_parser::{parse_wave, ParsedWave};
use crate::{Result, WaveError};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Loads WAV files from disk
pub struct WavFileLoader;

impl WavFileLoader {
    /// Load and validate a stereo 16-bit PCM WAV file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ParsedWave> {
        let path = path.as_ref();
        let file_data = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => WaveError::FileNotFound(path.to_path_buf()),
            _ => WaveError::Io(e),
        })?;

        log::debug!("Read {} bytes from {}", file_data.len(), path.display());
        parse_wave(&file_data)
    }
}
