//! Playback Device Domain
//!
//! Narrow seam between a loaded sound and whatever actually emits audio.
//! The sound only ever asks a backend to open a device for its format and
//! samples, polls the device's elapsed-sample counter, and closes it.

pub mod simulated;

pub use simulated::{ClockBackend, ManualBackend};

use crate::wav_parser::WaveFormat;
use crate::Result;

/// Opens playback devices for a sound
pub trait PlaybackBackend {
    /// Start playing `samples` (interleaved L/R) with `format`
    fn open(&self, format: &WaveFormat, samples: &[i16]) -> Result<Box<dyn PlaybackDevice>>;

    /// Backend name for diagnostics
    fn name(&self) -> &str;
}

/// A device that is playing (or has finished playing) one sound
///
/// Dropping a device must release it; `close` exists so the owner can
/// release it explicitly while keeping the box around.
pub trait PlaybackDevice {
    /// Number of frames the device has played so far
    fn elapsed_samples(&self) -> usize;

    /// Stop output and release the device
    fn close(&mut self);
}

/// Answer of the playback position oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPosition {
    /// The device is playing; the index is always below the sample count
    Playing(usize),
    /// No device is open, or playback reached the end
    Stopped,
}

impl PlaybackPosition {
    /// Index of the current sample, if playing
    pub fn index(&self) -> Option<usize> {
        match self {
            PlaybackPosition::Playing(i) => Some(*i),
            PlaybackPosition::Stopped => None,
        }
    }

    /// True while playing
    pub fn is_playing(&self) -> bool {
        matches!(self, PlaybackPosition::Playing(_))
    }
}

/// Channel selector for volume queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    /// Left channel only
    Left,
    /// Right channel only
    Right,
    /// Mean of both channels
    Both,
}
