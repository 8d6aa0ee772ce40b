//! Volume Analysis Domain
//!
//! Derives per-sample loudness information from interleaved stereo
//! amplitudes:
//! - Instantaneous volume per channel (normalized energy in [0, 1])
//! - Forward-looking windowed averages of those volumes
//!
//! Both are pure functions of the sample buffer and sample rate, so a
//! [`Envelope`] is always recomputed from scratch rather than patched.

pub mod envelope;

pub use envelope::Envelope;

use serde::{Deserialize, Serialize};

/// Largest positive 16-bit amplitude, used to normalize volumes
pub const MAX_AMPLITUDE: f32 = 32767.0;

/// Normalized energy of one amplitude: `(s / 32767)^2`, capped at 1.0
///
/// The cap only matters for `i16::MIN`, whose magnitude exceeds `MAX_AMPLITUDE`.
#[inline]
pub fn sample_volume(sample: i16) -> f32 {
    let normalized = sample as f32 / MAX_AMPLITUDE;
    (normalized * normalized).min(1.0)
}

/// Split interleaved L/R amplitudes into per-channel volume arrays
///
/// A trailing unpaired value is ignored.
pub fn channel_volumes(samples: &[i16]) -> (Vec<f32>, Vec<f32>) {
    let frames = samples.len() / 2;
    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);

    for frame in samples.chunks_exact(2) {
        left.push(sample_volume(frame[0]));
        right.push(sample_volume(frame[1]));
    }

    (left, right)
}

/// Forward average of `source` over `width` samples
///
/// `answer[i]` is the mean of `source[i..i + width]`, where positions past the
/// end contribute 0.0. The window is always divided by the full `width`, so
/// averages fade out over the last `width` samples. Runs in O(n) using a
/// running sum.
pub fn forward_averages(source: &[f32], width: usize) -> Vec<f32> {
    let n = source.len();
    let width = width.max(1);
    let mut answer = Vec::with_capacity(n);

    // f64 accumulator keeps drift negligible for multi-minute files
    let mut sum: f64 = source[..width.min(n)].iter().map(|&v| v as f64).sum();
    let divisor = width as f64;

    for i in 0..n {
        answer.push(((sum / divisor) as f32).clamp(0.0, 1.0));
        sum -= source[i] as f64;
        if i + width < n {
            sum += source[i + width] as f64;
        }
    }

    answer
}

/// How the forward-average window width is derived from the sample rate
///
/// The window spans `sample_rate / divisor` samples, i.e. `1 / divisor`
/// seconds of audio. The default divisor of 4 gives a quarter-second window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPolicy {
    divisor: u32,
}

impl WindowPolicy {
    /// Quarter-second window (`sample_rate / 4`)
    pub const QUARTER_SECOND: WindowPolicy = WindowPolicy { divisor: 4 };

    /// Tenth-of-a-second window (`sample_rate / 10`)
    pub const TENTH_SECOND: WindowPolicy = WindowPolicy { divisor: 10 };

    /// Window of `1 / divisor` seconds; a zero divisor is treated as 1
    pub fn new(divisor: u32) -> Self {
        WindowPolicy {
            divisor: divisor.max(1),
        }
    }

    /// The configured divisor
    pub fn divisor(&self) -> u32 {
        self.divisor
    }

    /// Window width in samples for the given rate, never below 1
    pub fn width(&self, sample_rate: u32) -> usize {
        ((sample_rate / self.divisor.max(1)) as usize).max(1)
    }
}

impl Default for WindowPolicy {
    fn default() -> Self {
        Self::QUARTER_SECOND
    }
}
