//! Amplitude-domain effects
//!
//! Effects rewrite the interleaved sample buffer in place. The owning
//! [`Sound`](crate::Sound) recomputes every derived array afterwards.

/// In-place transformation of interleaved L/R amplitudes
pub trait AmplitudeEffect {
    /// Rewrite `samples`
    fn apply(&self, samples: &mut [i16]);

    /// Effect name for logs
    fn name(&self) -> &str;
}

impl<F> AmplitudeEffect for F
where
    F: Fn(&mut [i16]),
{
    fn apply(&self, samples: &mut [i16]) {
        self(samples)
    }

    fn name(&self) -> &str {
        "custom"
    }
}

/// Delayed-echo mix
///
/// `new[i] = old[i] / 2 + old[i + lag] / 2` for every `i < len - lag`, with
/// integer halving. The final `lag` values have no partner and are left
/// unchanged; a buffer no longer than `lag` is not touched at all.
///
/// `lag` counts interleaved values, so an even lag keeps left and right
/// channels apart. `len` is the full interleaved length (`2 * sample_count`),
/// so every value with a partner is mixed. Limiting the loop to
/// `sample_count - lag` would leave the second half of longer buffers dry
/// and turn a sound of up to `lag` frames into a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoEffect {
    lag: usize,
}

impl EchoEffect {
    /// Default lag in interleaved values (150 000 frames, ~3.4 s at 44.1 kHz)
    pub const DEFAULT_LAG: usize = 300_000;

    /// Echo with the given lag in interleaved values
    pub fn new(lag: usize) -> Self {
        EchoEffect { lag }
    }

    /// Lag in interleaved values
    pub fn lag(&self) -> usize {
        self.lag
    }
}

impl Default for EchoEffect {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LAG)
    }
}

impl AmplitudeEffect for EchoEffect {
    fn apply(&self, samples: &mut [i16]) {
        if self.lag == 0 || samples.len() <= self.lag {
            return;
        }

        // Forward pass reads samples[i + lag] before it is overwritten
        for i in 0..samples.len() - self.lag {
            samples[i] = samples[i] / 2 + samples[i + self.lag] / 2;
        }
    }

    fn name(&self) -> &str {
        "echo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo_mixes_with_future_samples() {
        let mut data = vec![100i16, 200, 300, 400, 500, 600];
        EchoEffect::new(2).apply(&mut data);
        assert_eq!(data, vec![200, 300, 400, 500, 500, 600]);
    }

    #[test]
    fn test_echo_spans_interleaved_length() {
        // 5 frames, lag 4: mixing stops at value 6, not at frame count 5 - 4
        let mut data: Vec<i16> = (1..=10).map(|v| v * 100).collect();
        EchoEffect::new(4).apply(&mut data);
        assert_eq!(&data[..6], &[300, 400, 500, 600, 700, 800]);
        assert_eq!(&data[6..], &[700, 800, 900, 1000]);
    }

    #[test]
    fn test_echo_reads_unmodified_values() {
        // Each output depends only on pre-effect samples
        let mut data = vec![10i16, 0, 20, 0, 40, 0, 80, 0];
        EchoEffect::new(2).apply(&mut data);
        assert_eq!(data, vec![15, 0, 30, 0, 60, 0, 80, 0]);
    }

    #[test]
    fn test_echo_truncates_toward_zero() {
        let mut data = vec![-3i16, 0, -3, 0];
        EchoEffect::new(2).apply(&mut data);
        assert_eq!(data[0], -2);
    }

    #[test]
    fn test_echo_extremes_do_not_overflow() {
        let mut data = vec![i16::MAX, i16::MIN, i16::MAX, i16::MIN];
        EchoEffect::new(2).apply(&mut data);
        assert_eq!(data[0], 32766);
        assert_eq!(data[1], i16::MIN);
    }

    #[test]
    fn test_echo_short_buffer_untouched() {
        let mut data = vec![1i16, 2, 3, 4];
        EchoEffect::default().apply(&mut data);
        assert_eq!(data, vec![1, 2, 3, 4]);

        EchoEffect::new(4).apply(&mut data);
        assert_eq!(data, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_closure_effect() {
        let invert = |samples: &mut [i16]| {
            for s in samples.iter_mut() {
                *s = s.saturating_neg();
            }
        };
        let mut data = vec![1i16, -2, i16::MIN];
        invert.apply(&mut data);
        assert_eq!(data, vec![-1, 2, i16::MAX]);
        assert_eq!(invert.name(), "custom");
    }
}
