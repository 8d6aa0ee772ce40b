//! Backends that do not touch an audio device
//!
//! - [`ClockBackend`] advances its position with wall-clock time, so the
//!   display loop can run on machines without audio output.
//! - [`ManualBackend`] exposes its position counter to the caller, which
//!   makes the position oracle fully deterministic in tests.

use super::{PlaybackBackend, PlaybackDevice};
use crate::wav_parser::WaveFormat;
use crate::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Silent backend whose devices follow the wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct ClockBackend;

struct ClockDevice {
    started: Instant,
    sample_rate: u32,
    closed_at: Option<usize>,
}

impl PlaybackDevice for ClockDevice {
    fn elapsed_samples(&self) -> usize {
        match self.closed_at {
            Some(frozen) => frozen,
            None => (self.started.elapsed().as_secs_f64() * self.sample_rate as f64) as usize,
        }
    }

    fn close(&mut self) {
        if self.closed_at.is_none() {
            self.closed_at = Some(self.elapsed_samples());
        }
    }
}

impl PlaybackBackend for ClockBackend {
    fn open(&self, format: &WaveFormat, samples: &[i16]) -> Result<Box<dyn PlaybackDevice>> {
        log::info!(
            "Simulating playback of {} frames at {} Hz",
            samples.len() / 2,
            format.sample_rate
        );
        Ok(Box::new(ClockDevice {
            started: Instant::now(),
            sample_rate: format.sample_rate,
            closed_at: None,
        }))
    }

    fn name(&self) -> &str {
        "clock"
    }
}

/// Backend whose devices report a caller-controlled position
///
/// All devices opened from one backend share its counter.
#[derive(Debug, Clone, Default)]
pub struct ManualBackend {
    position: Arc<AtomicUsize>,
    open_devices: Arc<AtomicUsize>,
    opened: Arc<AtomicUsize>,
}

impl ManualBackend {
    /// New backend with the counter at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the elapsed-sample counter reported by devices
    pub fn set_position(&self, samples: usize) {
        self.position.store(samples, Ordering::Relaxed);
    }

    /// Number of devices currently open (not closed and not dropped)
    pub fn open_devices(&self) -> usize {
        self.open_devices.load(Ordering::Relaxed)
    }

    /// Number of devices ever opened
    pub fn opened_count(&self) -> usize {
        self.opened.load(Ordering::Relaxed)
    }
}

struct ManualDevice {
    position: Arc<AtomicUsize>,
    open_devices: Arc<AtomicUsize>,
    open: bool,
}

impl PlaybackDevice for ManualDevice {
    fn elapsed_samples(&self) -> usize {
        self.position.load(Ordering::Relaxed)
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.open_devices.fetch_sub(1, Ordering::Relaxed);
        }
    }
}

impl Drop for ManualDevice {
    fn drop(&mut self) {
        self.close();
    }
}

impl PlaybackBackend for ManualBackend {
    fn open(&self, _format: &WaveFormat, _samples: &[i16]) -> Result<Box<dyn PlaybackDevice>> {
        self.opened.fetch_add(1, Ordering::Relaxed);
        self.open_devices.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(ManualDevice {
            position: Arc::clone(&self.position),
            open_devices: Arc::clone(&self.open_devices),
            open: true,
        }))
    }

    fn name(&self) -> &str {
        "manual"
    }
}
