//! Loaded Sound Domain
//!
//! [`Sound`] owns a validated format, the interleaved sample buffer, the four
//! derived arrays computed from them, and the playback device while one is
//! open. Every mutation of samples or sample rate recomputes the derived
//! arrays in full.
//!
//! ```no_run
//! use wavedance::playback::ClockBackend;
//! use wavedance::{PlaybackPosition, Sound, Track};
//!
//! let mut sound = Sound::new();
//! sound.load("song.wav")?;
//! sound.start_play(&ClockBackend)?;
//! while let PlaybackPosition::Playing(index) = sound.playback_position() {
//!     println!("{} {:.3}", index, sound.volume_forward(Track::Both));
//! }
//! # Ok::<(), wavedance::WaveError>(())
//! ```

pub mod effects;

use crate::analysis::{Envelope, WindowPolicy};
use crate::playback::{PlaybackBackend, PlaybackDevice, PlaybackPosition, Track};
use crate::wav_parser::{parse_wave, ParsedWave, WaveFormat, REQUIRED_CHANNELS};
use crate::{wav_loader, Result, WaveError};
use effects::{AmplitudeEffect, EchoEffect};
use std::fmt;
use std::path::Path;

/// A stereo 16-bit sound with derived volume information
pub struct Sound {
    /// Present iff loaded
    format: Option<WaveFormat>,
    /// Interleaved L/R amplitudes
    samples: Vec<i16>,
    /// Derived arrays, always `sample_count` long
    envelope: Envelope,
    window: WindowPolicy,
    /// Open playback device, if playing
    device: Option<Box<dyn PlaybackDevice>>,
}

impl Sound {
    /// Create an unloaded sound with the default quarter-second window
    pub fn new() -> Self {
        Self::with_window(WindowPolicy::default())
    }

    /// Create an unloaded sound using `window` for forward averages
    pub fn with_window(window: WindowPolicy) -> Self {
        Sound {
            format: None,
            samples: Vec::new(),
            envelope: Envelope::default(),
            window,
            device: None,
        }
    }

    /// Build a loaded sound from an already parsed file
    ///
    /// The format is validated again, since `ParsedWave` can be built by hand.
    pub fn from_parsed(parsed: ParsedWave) -> Result<Self> {
        let mut sound = Self::new();
        sound.install(parsed)?;
        Ok(sound)
    }

    /// Load a WAV file, replacing whatever was loaded before
    ///
    /// Any current playback is stopped first. On failure the sound is left
    /// unloaded and the reason is returned.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.unload();
        let parsed = wav_loader::load_file(path.as_ref()).map_err(|e| {
            log::warn!("Failed to load {}: {}", path.as_ref().display(), e);
            e
        })?;
        self.install(parsed)
    }

    /// Load a WAV file from memory, with the same semantics as [`Sound::load`]
    pub fn load_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.unload();
        let parsed = parse_wave(data)?;
        self.install(parsed)
    }

    fn install(&mut self, parsed: ParsedWave) -> Result<()> {
        parsed.format.validate()?;
        let frames = parsed.sample_count();
        if frames == 0 {
            return Err(WaveError::EmptyData);
        }
        let mut samples = parsed.samples;
        samples.truncate(frames * REQUIRED_CHANNELS as usize);

        self.format = Some(parsed.format);
        self.samples = samples;
        self.recompute();
        log::info!(
            "Loaded {} frames at {} Hz ({:.2}s)",
            frames,
            parsed.format.sample_rate,
            self.duration_seconds()
        );
        Ok(())
    }

    /// Stop playback and release the sample buffer and derived arrays
    pub fn unload(&mut self) {
        self.stop_play();
        self.format = None;
        self.samples = Vec::new();
        self.envelope = Envelope::default();
    }

    /// True if a WAV file is loaded
    pub fn is_loaded(&self) -> bool {
        self.sample_count() > 0
    }

    /// Number of stereo frames (0 when unloaded)
    pub fn sample_count(&self) -> usize {
        self.samples.len() / REQUIRED_CHANNELS as usize
    }

    /// Format of the loaded file
    pub fn format(&self) -> Option<WaveFormat> {
        self.format
    }

    /// Interleaved L/R amplitudes
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// All derived arrays
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Instantaneous left volume per frame
    pub fn left_volume(&self) -> &[f32] {
        &self.envelope.left_volume
    }

    /// Instantaneous right volume per frame
    pub fn right_volume(&self) -> &[f32] {
        &self.envelope.right_volume
    }

    /// Forward-averaged left volume per frame
    pub fn left_forward_avg(&self) -> &[f32] {
        &self.envelope.left_forward_avg
    }

    /// Forward-averaged right volume per frame
    pub fn right_forward_avg(&self) -> &[f32] {
        &self.envelope.right_forward_avg
    }

    /// Policy used to size the forward-average window
    pub fn window_policy(&self) -> WindowPolicy {
        self.window
    }

    /// Change the window policy and recompute the averages
    pub fn set_window_policy(&mut self, window: WindowPolicy) {
        self.window = window;
        if self.is_loaded() {
            self.recompute();
        }
    }

    /// Forward-average window width in frames at the current rate
    pub fn window_width(&self) -> Option<usize> {
        self.format.map(|f| self.window.width(f.sample_rate))
    }

    /// Playing time at the current sample rate
    pub fn duration_seconds(&self) -> f32 {
        match self.format {
            Some(f) if f.sample_rate > 0 => self.sample_count() as f32 / f.sample_rate as f32,
            _ => 0.0,
        }
    }

    fn recompute(&mut self) {
        let rate = self.format.map(|f| f.sample_rate).unwrap_or(0);
        self.envelope = Envelope::compute(&self.samples, rate, self.window);
    }

    /// Multiply the sample rate by `factor`, changing speed and pitch
    ///
    /// Amplitudes are untouched; only the declared rate (and byte rate) and
    /// therefore the forward-average window change. The new rate is truncated
    /// to whole hertz and never drops below 1. Non-positive or non-finite
    /// factors are ignored.
    pub fn change_speed(&mut self, factor: f32) {
        let Some(format) = self.format.as_mut() else {
            return;
        };
        if !factor.is_finite() || factor <= 0.0 {
            log::warn!("Ignoring invalid speed factor {}", factor);
            return;
        }

        let new_rate = ((factor as f64 * format.sample_rate as f64) as u32).max(1);
        log::debug!("Speed x{}: {} Hz -> {} Hz", factor, format.sample_rate, new_rate);
        format.sample_rate = new_rate;
        format.avg_bytes_per_sec = new_rate.saturating_mul(format.block_align as u32);
        self.recompute();
    }

    /// Reverse the sound: frame `i` becomes frame `sample_count - 1 - i`
    ///
    /// Left/right pairs stay together and derived arrays are reversed in
    /// lockstep, so reversing twice restores everything exactly.
    pub fn reverse(&mut self) {
        if !self.is_loaded() {
            return;
        }
        reverse_frames(&mut self.samples, REQUIRED_CHANNELS as usize);
        self.envelope.reverse();
    }

    /// Apply the default echo effect
    pub fn modify(&mut self) {
        self.modify_with(&EchoEffect::default());
    }

    /// Apply `effect` to the amplitudes and recompute derived arrays
    pub fn modify_with(&mut self, effect: &dyn AmplitudeEffect) {
        if !self.is_loaded() {
            return;
        }
        log::debug!("Applying {} effect", effect.name());
        effect.apply(&mut self.samples);
        self.recompute();
    }

    /// Start playing on a device opened from `backend`
    ///
    /// A device that is already open is closed first.
    pub fn start_play(&mut self, backend: &dyn PlaybackBackend) -> Result<()> {
        let Some(format) = self.format else {
            return Err(WaveError::NotLoaded);
        };
        self.stop_play();
        let device = backend.open(&format, &self.samples)?;
        log::info!("Playback started on {} backend", backend.name());
        self.device = Some(device);
        Ok(())
    }

    /// Stop playing and release the device, if any
    pub fn stop_play(&mut self) {
        if let Some(mut device) = self.device.take() {
            device.close();
            log::debug!("Playback device released");
        }
    }

    /// True while a playback device is held
    pub fn is_playing(&self) -> bool {
        self.device.is_some()
    }

    /// Frame currently being played
    ///
    /// Returns `Playing(elapsed + 1)` while that index is inside the sound.
    /// Once the device reaches the end, playback is stopped, the device is
    /// released and `Stopped` is returned.
    pub fn playback_position(&mut self) -> PlaybackPosition {
        let Some(device) = self.device.as_ref() else {
            return PlaybackPosition::Stopped;
        };

        let next = device.elapsed_samples().saturating_add(1);
        if next < self.sample_count() {
            PlaybackPosition::Playing(next)
        } else {
            self.stop_play();
            PlaybackPosition::Stopped
        }
    }

    /// Volume of the frame playing right now (0.0 when stopped)
    pub fn volume_now(&mut self, track: Track) -> f32 {
        match self.playback_position() {
            PlaybackPosition::Playing(i) => select_track(
                track,
                self.envelope.left_volume[i],
                self.envelope.right_volume[i],
            ),
            PlaybackPosition::Stopped => 0.0,
        }
    }

    /// Average volume over the upcoming window (0.0 when stopped)
    pub fn volume_forward(&mut self, track: Track) -> f32 {
        match self.playback_position() {
            PlaybackPosition::Playing(i) => select_track(
                track,
                self.envelope.left_forward_avg[i],
                self.envelope.right_forward_avg[i],
            ),
            PlaybackPosition::Stopped => 0.0,
        }
    }
}

fn select_track(track: Track, left: f32, right: f32) -> f32 {
    match track {
        Track::Left => left,
        Track::Right => right,
        Track::Both => (left + right) / 2.0,
    }
}

/// Reverse the order of `frame_len`-sized frames, keeping each frame intact
///
/// A trailing partial frame is left where it is.
pub fn reverse_frames<T>(data: &mut [T], frame_len: usize) {
    if frame_len == 0 {
        return;
    }
    let whole = data.len() - data.len() % frame_len;
    let data = &mut data[..whole];
    data.reverse();
    for frame in data.chunks_exact_mut(frame_len) {
        frame.reverse();
    }
}

impl Default for Sound {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Sound {
    /// Deep-copies the samples and regenerates derived arrays; the copy is
    /// never playing.
    fn clone(&self) -> Self {
        let mut copy = Sound::with_window(self.window);
        if self.is_loaded() {
            copy.format = self.format;
            copy.samples = self.samples.clone();
            copy.recompute();
        }
        copy
    }
}

impl Drop for Sound {
    fn drop(&mut self) {
        self.stop_play();
    }
}

impl fmt::Debug for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sound")
            .field("format", &self.format)
            .field("sample_count", &self.sample_count())
            .field("window", &self.window)
            .field("playing", &self.is_playing())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::ManualBackend;
    use crate::wav_parser::test_support::{wav_bytes, wav_bytes_with, HeaderSpec};
    use approx::assert_relative_eq;

    fn ramp(frames: usize) -> Vec<i16> {
        (0..frames)
            .flat_map(|i| {
                let v = ((i * 131) % 30000) as i16;
                [v, -v / 2]
            })
            .collect()
    }

    fn loaded(rate: u32, frames: usize) -> Sound {
        let mut sound = Sound::new();
        sound.load_bytes(&wav_bytes(rate, &ramp(frames))).unwrap();
        sound
    }

    fn assert_envelope_invariants(sound: &Sound) {
        for array in sound.envelope().arrays() {
            assert_eq!(array.len(), sound.sample_count());
            assert!(array.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_new_sound_is_unloaded() {
        let sound = Sound::new();
        assert!(!sound.is_loaded());
        assert_eq!(sound.sample_count(), 0);
        assert!(sound.envelope().is_empty());
        assert!(sound.format().is_none());
    }

    #[test]
    fn test_load_bytes_populates_everything() {
        let sound = loaded(44100, 500);
        assert!(sound.is_loaded());
        assert_eq!(sound.sample_count(), 500);
        assert_eq!(sound.samples().len(), 1000);
        assert_eq!(sound.window_width(), Some(11025));
        assert_envelope_invariants(&sound);
    }

    #[test]
    fn test_failed_load_leaves_unloaded() {
        let mut sound = loaded(44100, 100);
        let bad = HeaderSpec {
            channels: 1,
            ..HeaderSpec::default()
        };
        let err = sound.load_bytes(&wav_bytes_with(&bad, &[1, 2])).unwrap_err();
        assert!(matches!(err, WaveError::UnsupportedFormat(_)));
        assert!(!sound.is_loaded());
        assert!(sound.envelope().is_empty());
        assert!(sound.format().is_none());
    }

    #[test]
    fn test_failed_load_stops_playback() {
        let backend = ManualBackend::new();
        let mut sound = loaded(44100, 100);
        sound.start_play(&backend).unwrap();
        assert_eq!(backend.open_devices(), 1);

        assert!(sound.load("no/such/file.wav").is_err());
        assert!(!sound.is_playing());
        assert_eq!(backend.open_devices(), 0);
    }

    #[test]
    fn test_reverse_twice_restores() {
        let mut sound = loaded(100, 300);
        let samples = sound.samples().to_vec();
        let envelope = sound.envelope().clone();

        sound.reverse();
        assert_eq!(sound.samples()[0], samples[598]);
        assert_eq!(sound.samples()[1], samples[599]);
        assert_eq!(sound.left_volume()[0], envelope.left_volume[299]);
        assert_envelope_invariants(&sound);

        sound.reverse();
        assert_eq!(sound.samples(), samples.as_slice());
        assert_eq!(sound.envelope(), &envelope);
    }

    #[test]
    fn test_reverse_frames_generic() {
        let mut frames = [1, 2, 3, 4, 5, 6];
        reverse_frames(&mut frames, 2);
        assert_eq!(frames, [5, 6, 3, 4, 1, 2]);

        let mut floats = [0.1f32, 0.2, 0.3];
        reverse_frames(&mut floats, 1);
        assert_eq!(floats, [0.3, 0.2, 0.1]);

        let mut odd = [1, 2, 3, 4, 9];
        reverse_frames(&mut odd, 2);
        assert_eq!(odd, [3, 4, 1, 2, 9]);
    }

    #[test]
    fn test_change_speed_round_trip() {
        let mut sound = loaded(44100, 100);
        sound.change_speed(2.0);
        assert_eq!(sound.format().unwrap().sample_rate, 88200);
        assert_eq!(sound.window_width(), Some(22050));
        assert_eq!(sound.format().unwrap().avg_bytes_per_sec, 88200 * 4);
        sound.change_speed(0.5);
        assert_eq!(sound.format().unwrap().sample_rate, 44100);
        assert_envelope_invariants(&sound);
    }

    #[test]
    fn test_change_speed_keeps_samples_and_recomputes_averages() {
        let mut sound = loaded(400, 400);
        let samples = sound.samples().to_vec();
        let before = sound.left_forward_avg().to_vec();

        sound.change_speed(0.25);
        assert_eq!(sound.samples(), samples.as_slice());
        assert_eq!(sound.window_width(), Some(25));
        assert_ne!(sound.left_forward_avg(), before.as_slice());
    }

    #[test]
    fn test_change_speed_ignores_invalid_factors() {
        let mut sound = loaded(44100, 10);
        for factor in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            sound.change_speed(factor);
        }
        assert_eq!(sound.format().unwrap().sample_rate, 44100);
    }

    #[test]
    fn test_change_speed_never_below_one_hz() {
        let mut sound = loaded(8, 10);
        sound.change_speed(0.01);
        assert_eq!(sound.format().unwrap().sample_rate, 1);
        assert_eq!(sound.window_width(), Some(1));
    }

    #[test]
    fn test_transforms_on_unloaded_are_noops() {
        let mut sound = Sound::new();
        sound.reverse();
        sound.change_speed(2.0);
        sound.modify();
        assert!(!sound.is_loaded());
        assert!(sound.envelope().is_empty());
    }

    #[test]
    fn test_modify_with_custom_effect_recomputes() {
        let mut sound = loaded(44100, 50);
        let silence = |samples: &mut [i16]| samples.fill(0);
        sound.modify_with(&silence);

        assert!(sound.samples().iter().all(|&s| s == 0));
        for array in sound.envelope().arrays() {
            assert!(array.iter().all(|&v| v == 0.0));
        }
    }

    #[test]
    fn test_modify_default_echo_short_sound_unchanged() {
        let mut sound = loaded(44100, 100);
        let samples = sound.samples().to_vec();
        sound.modify();
        assert_eq!(sound.samples(), samples.as_slice());
    }

    #[test]
    fn test_modify_default_echo_long_sound() {
        // 200 000 frames = 400 000 interleaved values, longer than the default lag
        let mut sound = loaded(44100, 200_000);
        let before = sound.samples().to_vec();
        let lag = EchoEffect::DEFAULT_LAG;
        sound.modify();

        let after = sound.samples();
        assert_eq!(after.len(), before.len());
        for i in 0..before.len() - lag {
            assert_eq!(after[i], before[i] / 2 + before[i + lag] / 2, "value {}", i);
        }
        assert_eq!(&after[before.len() - lag..], &before[before.len() - lag..]);

        assert_envelope_invariants(&sound);
        assert_eq!(
            sound.left_volume()[0],
            crate::analysis::sample_volume(after[0])
        );
        assert_eq!(
            sound.right_volume()[1],
            crate::analysis::sample_volume(after[3])
        );
    }

    #[test]
    fn test_from_parsed_validates_format() {
        let mono = ParsedWave {
            format: WaveFormat {
                channels: 1,
                sample_rate: 0,
                ..WaveFormat::stereo_pcm16(44100)
            },
            samples: vec![1, 2, 3, 4],
        };
        assert!(matches!(
            Sound::from_parsed(mono),
            Err(WaveError::UnsupportedFormat(_))
        ));

        let empty = ParsedWave {
            format: WaveFormat::stereo_pcm16(44100),
            samples: vec![1],
        };
        assert!(matches!(Sound::from_parsed(empty), Err(WaveError::EmptyData)));

        let sound = Sound::from_parsed(ParsedWave {
            format: WaveFormat::stereo_pcm16(8000),
            samples: vec![1, 2, 3, 4, 5],
        })
        .unwrap();
        assert_eq!(sound.sample_count(), 2);
        assert_eq!(sound.samples(), &[1, 2, 3, 4]);
        assert_envelope_invariants(&sound);
    }

    #[test]
    fn test_clone_regenerates_and_is_not_playing() {
        let backend = ManualBackend::new();
        let mut sound = loaded(1000, 200);
        sound.start_play(&backend).unwrap();

        let copy = sound.clone();
        assert!(copy.is_loaded());
        assert!(!copy.is_playing());
        assert_eq!(copy.samples(), sound.samples());
        assert_eq!(copy.envelope(), sound.envelope());
        assert_eq!(copy.format(), sound.format());
        assert_eq!(backend.open_devices(), 1);
    }

    #[test]
    fn test_position_without_device_is_stopped() {
        let mut sound = loaded(44100, 10);
        assert_eq!(sound.playback_position(), PlaybackPosition::Stopped);
        assert_eq!(sound.volume_now(Track::Left), 0.0);
        assert_eq!(sound.volume_forward(Track::Both), 0.0);
    }

    #[test]
    fn test_position_is_one_based_and_stops_at_end() {
        let backend = ManualBackend::new();
        let mut sound = loaded(44100, 10);
        sound.start_play(&backend).unwrap();

        assert_eq!(sound.playback_position(), PlaybackPosition::Playing(1));
        backend.set_position(8);
        assert_eq!(sound.playback_position(), PlaybackPosition::Playing(9));
        assert!(sound.is_playing());

        backend.set_position(9);
        assert_eq!(sound.playback_position(), PlaybackPosition::Stopped);
        assert!(!sound.is_playing());
        assert_eq!(backend.open_devices(), 0);

        // Device stays released even if the counter moves back
        backend.set_position(0);
        assert_eq!(sound.playback_position(), PlaybackPosition::Stopped);
    }

    #[test]
    fn test_position_past_end_stops() {
        let backend = ManualBackend::new();
        let mut sound = loaded(44100, 10);
        sound.start_play(&backend).unwrap();
        backend.set_position(usize::MAX);
        assert_eq!(sound.playback_position(), PlaybackPosition::Stopped);
        assert_eq!(backend.open_devices(), 0);
    }

    #[test]
    fn test_volume_queries_index_derived_arrays() {
        let backend = ManualBackend::new();
        let mut sound = loaded(100, 50);
        sound.start_play(&backend).unwrap();
        backend.set_position(19);

        let left = sound.left_volume()[20];
        let right = sound.right_volume()[20];
        assert_relative_eq!(sound.volume_now(Track::Left), left);
        assert_relative_eq!(sound.volume_now(Track::Right), right);
        assert_relative_eq!(sound.volume_now(Track::Both), (left + right) / 2.0);

        let left_avg = sound.left_forward_avg()[20];
        let right_avg = sound.right_forward_avg()[20];
        assert_relative_eq!(sound.volume_forward(Track::Left), left_avg);
        assert_relative_eq!(sound.volume_forward(Track::Both), (left_avg + right_avg) / 2.0);
    }

    #[test]
    fn test_start_play_requires_loaded() {
        let backend = ManualBackend::new();
        let mut sound = Sound::new();
        assert!(matches!(
            sound.start_play(&backend),
            Err(WaveError::NotLoaded)
        ));
        assert_eq!(backend.opened_count(), 0);
    }

    #[test]
    fn test_restart_closes_previous_device() {
        let backend = ManualBackend::new();
        let mut sound = loaded(44100, 10);
        sound.start_play(&backend).unwrap();
        sound.start_play(&backend).unwrap();
        assert_eq!(backend.opened_count(), 2);
        assert_eq!(backend.open_devices(), 1);

        drop(sound);
        assert_eq!(backend.open_devices(), 0);
    }

    #[test]
    fn test_set_window_policy_recomputes() {
        let mut sound = loaded(1000, 600);
        sound.set_window_policy(WindowPolicy::TENTH_SECOND);
        assert_eq!(sound.window_width(), Some(100));
        let expected = crate::analysis::forward_averages(sound.left_volume(), 100);
        assert_eq!(sound.left_forward_avg(), expected.as_slice());
    }
}
