//! Audio device integration using rodio
//!
//! The elapsed counter advances as frames are pulled by the output mixer,
//! so it runs slightly ahead of what is audible (by the mixer's buffer).

use crate::playback::{PlaybackBackend, PlaybackDevice};
use crate::wav_parser::WaveFormat;
use crate::{Result, WaveError};
use rodio::{OutputStream, Sink, Source};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Audio source over an owned interleaved buffer that reports progress
struct CountingSource {
    samples: Vec<i16>,
    pos: usize,
    sample_rate: u32,
    channels: u16,
    /// Frames fully handed out so far
    played_frames: Arc<AtomicUsize>,
    stopped: Arc<AtomicBool>,
}

impl CountingSource {
    fn new(
        samples: Vec<i16>,
        sample_rate: u32,
        channels: u16,
        played_frames: Arc<AtomicUsize>,
        stopped: Arc<AtomicBool>,
    ) -> Self {
        CountingSource {
            samples,
            pos: 0,
            sample_rate,
            channels: channels.max(1),
            played_frames,
            stopped,
        }
    }
}

impl Source for CountingSource {
    fn current_frame_len(&self) -> Option<usize> {
        Some(self.samples.len() - self.pos)
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        let frames = self.samples.len() / self.channels as usize;
        Some(Duration::from_secs_f64(
            frames as f64 / self.sample_rate.max(1) as f64,
        ))
    }
}

impl Iterator for CountingSource {
    type Item = i16;

    fn next(&mut self) -> Option<i16> {
        if self.stopped.load(Ordering::Relaxed) {
            return None;
        }

        let sample = *self.samples.get(self.pos)?;
        self.pos += 1;
        if self.pos % self.channels as usize == 0 {
            self.played_frames
                .store(self.pos / self.channels as usize, Ordering::Relaxed);
        }
        Some(sample)
    }
}

/// Audio playback device using rodio
pub struct AudioDevice {
    _stream: OutputStream,
    sink: Sink,
    played_frames: Arc<AtomicUsize>,
    stopped: Arc<AtomicBool>,
}

impl AudioDevice {
    /// Open the default output device and start playing `samples`
    ///
    /// # Arguments
    /// * `sample_rate` - Frames per second the samples are played at
    /// * `channels` - Interleaved channel count (2 for stereo)
    /// * `samples` - Interleaved 16-bit amplitudes
    pub fn new(sample_rate: u32, channels: u16, samples: Vec<i16>) -> Result<Self> {
        // Create output stream
        let (stream, stream_handle) = OutputStream::try_default().map_err(|e| {
            WaveError::AudioDeviceError(format!("Failed to create audio stream: {}", e))
        })?;

        // Create sink for playback
        let sink = Sink::try_new(&stream_handle).map_err(|e| {
            WaveError::AudioDeviceError(format!("Failed to create audio sink: {}", e))
        })?;

        let played_frames = Arc::new(AtomicUsize::new(0));
        let stopped = Arc::new(AtomicBool::new(false));
        let source = CountingSource::new(
            samples,
            sample_rate,
            channels,
            Arc::clone(&played_frames),
            Arc::clone(&stopped),
        );
        sink.append(source);

        Ok(AudioDevice {
            _stream: stream,
            sink,
            played_frames,
            stopped,
        })
    }
}

impl PlaybackDevice for AudioDevice {
    fn elapsed_samples(&self) -> usize {
        self.played_frames.load(Ordering::Relaxed)
    }

    fn close(&mut self) {
        self.stopped.store(true, Ordering::Relaxed);
        self.sink.stop();
    }
}

impl Drop for AudioDevice {
    fn drop(&mut self) {
        self.close();
    }
}

/// Backend that plays through the system's default output device
#[derive(Debug, Clone, Copy, Default)]
pub struct RodioBackend;

impl PlaybackBackend for RodioBackend {
    fn open(&self, format: &WaveFormat, samples: &[i16]) -> Result<Box<dyn PlaybackDevice>> {
        let device = AudioDevice::new(format.sample_rate, format.channels, samples.to_vec())?;
        Ok(Box::new(device))
    }

    fn name(&self) -> &str {
        "rodio"
    }
}
