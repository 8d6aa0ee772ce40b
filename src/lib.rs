//! Stereo WAV loader and volume analyzer
//!
//! Loads stereo 16-bit PCM RIFF/WAVE files, derives per-sample volume
//! envelopes and forward-looking windowed averages, applies simple
//! transforms (reverse, speed change, amplitude effects) and tracks the
//! playback position of an external audio device so that a display loop
//! can react to the music in real time.
//!
//! # Features
//! - Strict RIFF/WAVE container validation (PCM, stereo, 16-bit)
//! - Per-channel instantaneous volume (normalized energy)
//! - O(n) forward averages over a fixed-duration window
//! - In-place reversal, speed change and pluggable amplitude effects
//! - Playback position oracle over a pluggable playback backend
//!
//! # Crate feature flags
//! - `export` (default): WAV re-export (`hound`) and envelope CSV dumps (`csv`)
//! - `streaming` (opt-in): Real-time audio output (enables optional `rodio` dep)
//!
//! # Quick start
//! ```no_run
//! use wavedance::{Sound, Track};
//!
//! let mut sound = Sound::new();
//! sound.load("song.wav").unwrap();
//! sound.reverse();
//! sound.change_speed(1.1);
//! if let Some(format) = sound.format() {
//!     println!("{} samples at {} Hz", sound.sample_count(), format.sample_rate);
//! }
//! let _ = sound.volume_forward(Track::Both);
//! ```

#![warn(missing_docs)]

pub mod analysis; // Volume envelopes and forward averages
pub mod config; // Player configuration
#[cfg(feature = "export")]
pub mod export; // WAV / CSV output
pub mod playback; // Playback device seams
pub mod sound; // Loaded sound aggregate
#[cfg(feature = "streaming")]
pub mod streaming; // Audio output via rodio
pub mod visualization; // Canvas capability and terminal helpers
pub mod wav_loader; // WAV file I/O
pub mod wav_parser; // RIFF/WAVE container parsing

use std::path::PathBuf;

/// Error types for WAV loading, analysis and playback
#[derive(thiserror::Error, Debug)]
pub enum WaveError {
    /// The requested file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// A chunk tag did not match the expected RIFF/WAVE layout
    #[error("Malformed container: expected {expected:?}, found {found:?}")]
    MalformedContainer {
        /// Tag required at this position
        expected: &'static str,
        /// Tag actually present (lossy UTF-8)
        found: String,
    },

    /// Valid container, but not PCM / stereo / 16-bit
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The data chunk holds no complete stereo frame
    #[error("Data chunk is empty")]
    EmptyData,

    /// The stream ended before the named field could be read
    #[error("Unexpected end of data while reading {0}")]
    Truncated(&'static str),

    /// Operation requires a loaded sound
    #[error("No sound is loaded")]
    NotLoaded,

    /// Error writing audio file
    #[error("Audio file write error: {0}")]
    AudioFileError(String),

    /// Audio device error
    #[error("Audio device error: {0}")]
    AudioDeviceError(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// IO error from filesystem or device
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for WAV operations
pub type Result<T> = std::result::Result<T, WaveError>;

// Public API exports
pub use analysis::{channel_volumes, forward_averages, WindowPolicy};
pub use config::PlayerConfig;
#[cfg(feature = "export")]
pub use export::{export_to_wav, write_envelope_csv};
pub use playback::{PlaybackBackend, PlaybackDevice, PlaybackPosition, Track};
pub use sound::effects::{AmplitudeEffect, EchoEffect};
pub use sound::Sound;
#[cfg(feature = "streaming")]
pub use streaming::{AudioDevice, RodioBackend};
pub use visualization::{create_volume_bar, Canvas, TerminalCanvas, TextFormatter};
pub use wav_loader::load_file;
pub use wav_parser::{parse_wave, FormatTag, ParsedWave, WaveFormat};
