//! Derived per-sample signals of a stereo sound

use super::{channel_volumes, forward_averages, WindowPolicy};

/// The four derived arrays of a loaded sound
///
/// All arrays have one entry per stereo frame and values in [0, 1].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    /// Instantaneous left-channel volume
    pub left_volume: Vec<f32>,
    /// Instantaneous right-channel volume
    pub right_volume: Vec<f32>,
    /// Left volume averaged over the upcoming window
    pub left_forward_avg: Vec<f32>,
    /// Right volume averaged over the upcoming window
    pub right_forward_avg: Vec<f32>,
}

impl Envelope {
    /// Compute all four arrays from interleaved samples
    pub fn compute(samples: &[i16], sample_rate: u32, policy: WindowPolicy) -> Self {
        let width = policy.width(sample_rate);
        let (left_volume, right_volume) = channel_volumes(samples);
        let left_forward_avg = forward_averages(&left_volume, width);
        let right_forward_avg = forward_averages(&right_volume, width);

        log::debug!(
            "Computed envelope: {} frames, window {} samples",
            left_volume.len(),
            width
        );

        Envelope {
            left_volume,
            right_volume,
            left_forward_avg,
            right_forward_avg,
        }
    }

    /// Number of frames covered
    pub fn len(&self) -> usize {
        self.left_volume.len()
    }

    /// True when no frames are covered
    pub fn is_empty(&self) -> bool {
        self.left_volume.is_empty()
    }

    /// Reverse all four arrays in lockstep
    pub fn reverse(&mut self) {
        self.left_volume.reverse();
        self.right_volume.reverse();
        self.left_forward_avg.reverse();
        self.right_forward_avg.reverse();
    }

    /// Iterate over the four arrays
    pub fn arrays(&self) -> [&[f32]; 4] {
        [
            self.left_volume.as_slice(),
            self.right_volume.as_slice(),
            self.left_forward_avg.as_slice(),
            self.right_forward_avg.as_slice(),
        ]
    }
}
