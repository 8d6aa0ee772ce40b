//! WAV File Loader Domain
//!
//! Handles file I/O for loading WAV files from disk and hands the bytes to
//! the container parser.

pub mod loader;

pub use loader::WavFileLoader;

use crate::wav_parser::ParsedWave;
use crate::Result;
use std::path::Path;

/// Convenience function to load a WAV file from disk
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<ParsedWave> {
    WavFileLoader::load(path)
}
