//! RIFF/WAVE container parser
//!
//! Reads the canonical little-endian layout field by field:
//!
//! | Offset | Field         | Size | Requirement  |
//! |--------|---------------|------|--------------|
//! | 0      | ChunkID       | 4    | `"RIFF"`     |
//! | 4      | ChunkSize     | 4    | ignored      |
//! | 8      | Format        | 4    | `"WAVE"`     |
//! | 12     | Subchunk1ID   | 4    | `"fmt "`     |
//! | 16     | Subchunk1Size | 4    | ignored      |
//! | 20     | AudioFormat   | 2    | PCM          |
//! | 22     | NumChannels   | 2    | 2            |
//! | 24     | SampleRate    | 4    | > 0          |
//! | 28     | ByteRate      | 4    | stored       |
//! | 32     | BlockAlign    | 2    | stored       |
//! | 34     | BitsPerSample | 2    | 16           |
//! | 36     | Subchunk2ID   | 4    | `"data"`     |
//! | 40     | Subchunk2Size | 4    | > 0          |
//! | 44     | Data          | n    | L/R int16    |

use super::{FormatTag, ParsedWave, WaveFormat, BYTES_PER_FRAME};
use crate::{Result, WaveError};
use nom::bytes::complete::take;
use nom::number::complete::{le_u16, le_u32};
use nom::IResult;
use num_traits::FromPrimitive;

type Input<'a> = &'a [u8];

/// Run one nom field parser, mapping any failure to a truncation of `what`
fn read<'a, O, P>(input: Input<'a>, what: &'static str, mut parser: P) -> Result<(Input<'a>, O)>
where
    P: FnMut(Input<'a>) -> IResult<Input<'a>, O>,
{
    parser(input).map_err(|_| WaveError::Truncated(what))
}

/// Consume a four-character chunk tag and require it to equal `expected`
fn expect_tag<'a>(input: Input<'a>, expected: &'static str) -> Result<Input<'a>> {
    let (rest, found) = read(input, expected, take(4usize))?;
    if found != expected.as_bytes() {
        return Err(WaveError::MalformedContainer {
            expected,
            found: String::from_utf8_lossy(found).into_owned(),
        });
    }
    Ok(rest)
}

/// Parse a stereo 16-bit PCM WAV byte stream
///
/// Bytes following the data chunk are ignored, as is a trailing partial
/// frame inside it.
pub fn parse_wave(data: &[u8]) -> Result<ParsedWave> {
    let input = expect_tag(data, "RIFF")?;
    let (input, _riff_size) = read(input, "RIFF chunk size", le_u32)?;
    let input = expect_tag(input, "WAVE")?;
    let input = expect_tag(input, "fmt ")?;
    let (input, _fmt_size) = read(input, "fmt chunk size", le_u32)?;

    let (input, raw_tag) = read(input, "audio format", le_u16)?;
    let format_tag = FormatTag::from_u16(raw_tag).ok_or_else(|| {
        WaveError::UnsupportedFormat(format!("unknown audio format tag 0x{:04X}", raw_tag))
    })?;
    let (input, channels) = read(input, "channel count", le_u16)?;
    let (input, sample_rate) = read(input, "sample rate", le_u32)?;
    let (input, avg_bytes_per_sec) = read(input, "byte rate", le_u32)?;
    let (input, block_align) = read(input, "block alignment", le_u16)?;
    let (input, bits_per_sample) = read(input, "bits per sample", le_u16)?;

    let format = WaveFormat {
        format_tag,
        channels,
        sample_rate,
        avg_bytes_per_sec,
        block_align,
        bits_per_sample,
    };
    format.validate()?;

    let input = expect_tag(input, "data")?;
    let (input, data_len) = read(input, "data chunk size", le_u32)?;
    if data_len == 0 {
        return Err(WaveError::EmptyData);
    }

    let (_rest, raw) = read(input, "sample data", take(data_len as usize))?;
    let frames = raw.len() / BYTES_PER_FRAME;
    if frames == 0 {
        return Err(WaveError::EmptyData);
    }

    let samples: Vec<i16> = raw[..frames * BYTES_PER_FRAME]
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();

    log::debug!(
        "Parsed WAV: {} Hz, {} frames ({} data bytes)",
        sample_rate,
        frames,
        data_len
    );

    Ok(ParsedWave { format, samples })
}
