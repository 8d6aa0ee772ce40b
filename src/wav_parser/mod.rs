//! WAV Format Parsing Domain
//!
//! Decodes RIFF/WAVE byte streams into a typed format descriptor and an
//! interleaved 16-bit sample buffer. Only the canonical 44-byte header layout
//! (RIFF, `fmt `, `data`) with stereo 16-bit PCM content is accepted.

pub mod riff;

pub use riff::parse_wave;

use crate::{Result, WaveError};
use num_derive::FromPrimitive;

/// Number of interleaved channels the loader accepts
pub const REQUIRED_CHANNELS: u16 = 2;

/// Bit depth the loader accepts
pub const REQUIRED_BITS_PER_SAMPLE: u16 = 16;

/// Bytes in one stereo 16-bit frame (2 bytes x 2 channels)
pub const BYTES_PER_FRAME: usize = 4;

/// Known WAVE `AudioFormat` codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive)]
#[repr(u16)]
pub enum FormatTag {
    /// Linear pulse-code modulation
    Pcm = 0x0001,
    /// Microsoft ADPCM
    Adpcm = 0x0002,
    /// 32/64-bit IEEE float
    IeeeFloat = 0x0003,
    /// ITU G.711 A-law
    ALaw = 0x0006,
    /// ITU G.711 mu-law
    MuLaw = 0x0007,
    /// WAVE_FORMAT_EXTENSIBLE
    Extensible = 0xFFFE,
}

/// Format descriptor of a loaded WAV file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveFormat {
    /// Audio encoding (always [`FormatTag::Pcm`] after a successful load)
    pub format_tag: FormatTag,
    /// Interleaved channel count (always 2)
    pub channels: u16,
    /// Frames per second in Hz; rescaled by speed changes
    pub sample_rate: u32,
    /// Declared byte rate
    pub avg_bytes_per_sec: u32,
    /// Declared bytes per frame
    pub block_align: u16,
    /// Bits per single-channel sample (always 16)
    pub bits_per_sample: u16,
}

impl WaveFormat {
    /// Stereo 16-bit PCM format at the given rate with consistent byte rate
    /// and block alignment
    pub fn stereo_pcm16(sample_rate: u32) -> Self {
        WaveFormat {
            format_tag: FormatTag::Pcm,
            channels: REQUIRED_CHANNELS,
            sample_rate,
            avg_bytes_per_sec: sample_rate.saturating_mul(BYTES_PER_FRAME as u32),
            block_align: BYTES_PER_FRAME as u16,
            bits_per_sample: REQUIRED_BITS_PER_SAMPLE,
        }
    }

    /// Check that this describes stereo 16-bit PCM at a non-zero rate
    pub fn validate(&self) -> Result<()> {
        if self.format_tag != FormatTag::Pcm {
            return Err(WaveError::UnsupportedFormat(format!(
                "{:?} encoding (only PCM is supported)",
                self.format_tag
            )));
        }
        if self.channels != REQUIRED_CHANNELS {
            return Err(WaveError::UnsupportedFormat(format!(
                "{} channel(s) (only stereo is supported)",
                self.channels
            )));
        }
        if self.sample_rate == 0 {
            return Err(WaveError::UnsupportedFormat("sample rate of 0 Hz".into()));
        }
        if self.bits_per_sample != REQUIRED_BITS_PER_SAMPLE {
            return Err(WaveError::UnsupportedFormat(format!(
                "{}-bit samples (only 16-bit is supported)",
                self.bits_per_sample
            )));
        }
        Ok(())
    }
}

/// Result of parsing a WAV byte stream
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedWave {
    /// Validated format descriptor
    pub format: WaveFormat,
    /// Interleaved left/right amplitudes, length = 2 x sample count
    pub samples: Vec<i16>,
}

impl ParsedWave {
    /// Number of stereo frames
    pub fn sample_count(&self) -> usize {
        self.samples.len() / REQUIRED_CHANNELS as usize
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Hand-built WAV byte streams for unit tests

    /// Header fields that tests may want to corrupt
    pub struct HeaderSpec {
        pub riff: [u8; 4],
        pub wave: [u8; 4],
        pub fmt: [u8; 4],
        pub format_tag: u16,
        pub channels: u16,
        pub sample_rate: u32,
        pub bits_per_sample: u16,
        pub data: [u8; 4],
    }

    impl Default for HeaderSpec {
        fn default() -> Self {
            HeaderSpec {
                riff: *b"RIFF",
                wave: *b"WAVE",
                fmt: *b"fmt ",
                format_tag: 1,
                channels: 2,
                sample_rate: 44100,
                bits_per_sample: 16,
                data: *b"data",
            }
        }
    }

    /// Serialize interleaved samples under the given header
    pub fn wav_bytes_with(spec: &HeaderSpec, samples: &[i16]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut out = Vec::with_capacity(44 + data_len as usize);
        out.extend_from_slice(&spec.riff);
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(&spec.wave);
        out.extend_from_slice(&spec.fmt);
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&spec.format_tag.to_le_bytes());
        out.extend_from_slice(&spec.channels.to_le_bytes());
        out.extend_from_slice(&spec.sample_rate.to_le_bytes());
        out.extend_from_slice(&(spec.sample_rate * 4).to_le_bytes());
        out.extend_from_slice(&4u16.to_le_bytes());
        out.extend_from_slice(&spec.bits_per_sample.to_le_bytes());
        out.extend_from_slice(&spec.data);
        out.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            out.extend_from_slice(&s.to_le_bytes());
        }
        out
    }

    /// Valid stereo 16-bit PCM stream
    pub fn wav_bytes(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        wav_bytes_with(
            &HeaderSpec {
                sample_rate,
                ..HeaderSpec::default()
            },
            samples,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_stereo_pcm16() {
        assert!(WaveFormat::stereo_pcm16(44100).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_each_field() {
        let good = WaveFormat::stereo_pcm16(44100);
        let cases = [
            WaveFormat {
                format_tag: FormatTag::IeeeFloat,
                ..good
            },
            WaveFormat {
                channels: 1,
                ..good
            },
            WaveFormat {
                sample_rate: 0,
                ..good
            },
            WaveFormat {
                bits_per_sample: 24,
                ..good
            },
        ];
        for format in cases {
            assert!(
                matches!(format.validate(), Err(WaveError::UnsupportedFormat(_))),
                "{:?} should be rejected",
                format
            );
        }
    }
}
