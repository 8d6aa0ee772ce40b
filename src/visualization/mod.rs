//! Visual Feedback Domain
//!
//! The drawing surface is an external collaborator reached through the
//! [`Canvas`] capability trait. [`TerminalCanvas`] is the bundled adapter; it
//! redraws a block of text lines in place using ANSI cursor movement.
//!
//! Text output goes through an explicit [`TextFormatter`] owned by the
//! caller instead of any shared default stream.

pub mod terminal;

pub use terminal::TerminalCanvas;

use crate::playback::{PlaybackPosition, Track};
use crate::sound::Sound;
use crate::Result;

/// Primitive drawing operations understood by a canvas
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Clear the back buffer
    Clear,
    /// Plain text on a row
    Text {
        /// Row index from the top
        row: usize,
        /// Text to draw
        text: String,
    },
    /// Labeled level meter in [0, 1]
    Meter {
        /// Row index from the top
        row: usize,
        /// Label drawn before the meter
        label: String,
        /// Level, clamped to [0, 1]
        level: f32,
    },
}

/// User input reported by a canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A key press
    Key(char),
    /// The window was closed or the user asked to quit
    Quit,
}

/// Capability interface of a double-buffered drawing surface
pub trait Canvas {
    /// Open (or reset) the window
    fn open_window(&mut self, width: u32, height: u32, title: &str) -> Result<()>;

    /// Draw into the back buffer
    fn draw(&mut self, command: &DrawCommand) -> Result<()>;

    /// Present the back buffer
    fn swap_buffers(&mut self) -> Result<()>;

    /// Next pending input event, if any
    fn poll_input(&mut self) -> Option<InputEvent>;
}

/// Create a volume bar string
pub fn create_volume_bar(amplitude: f32, max_length: usize) -> String {
    let normalized = if amplitude.is_nan() {
        0.0
    } else {
        amplitude.clamp(0.0, 1.0)
    };
    let block_count = ((normalized * max_length as f32) as usize).min(max_length);
    let blocks = "█".repeat(block_count);
    let spaces = " ".repeat(max_length - block_count);
    format!("{}{}", blocks, spaces)
}

/// Explicit text formatting settings for status output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextFormatter {
    /// Digits after the decimal point for volumes
    pub precision: usize,
    /// Width of volume bars in characters
    pub bar_width: usize,
}

impl TextFormatter {
    /// Formatter with the given precision and bar width
    pub fn new(precision: usize, bar_width: usize) -> Self {
        TextFormatter {
            precision,
            bar_width,
        }
    }

    /// `"<label> = <value>"` with the configured precision
    pub fn volume(&self, label: &str, value: f32) -> String {
        format!("{} = {:.*}", label, self.precision, value)
    }

    /// `"<label> [bar] <value>"`
    pub fn meter(&self, label: &str, value: f32) -> String {
        format!(
            "{:<14} [{}] {:.*}",
            label,
            create_volume_bar(value, self.bar_width),
            self.precision,
            value
        )
    }

    /// Human readable playback position
    pub fn position(&self, position: PlaybackPosition) -> String {
        match position {
            PlaybackPosition::Playing(index) => format!("Sample Number = {}", index),
            PlaybackPosition::Stopped => "Stopped".to_string(),
        }
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new(3, crate::config::DEFAULT_BAR_WIDTH)
    }
}

/// Volumes at one playback instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeSnapshot {
    /// Oracle answer the volumes were read at
    pub position: PlaybackPosition,
    /// Left instantaneous volume
    pub left_now: f32,
    /// Right instantaneous volume
    pub right_now: f32,
    /// Left forward average
    pub left_forward: f32,
    /// Right forward average
    pub right_forward: f32,
}

impl VolumeSnapshot {
    /// Query the position oracle once and read all four volumes at it
    pub fn capture(sound: &mut Sound) -> Self {
        let position = sound.playback_position();
        match position.index() {
            Some(i) => {
                let env = sound.envelope();
                VolumeSnapshot {
                    position,
                    left_now: env.left_volume[i],
                    right_now: env.right_volume[i],
                    left_forward: env.left_forward_avg[i],
                    right_forward: env.right_forward_avg[i],
                }
            }
            None => VolumeSnapshot {
                position,
                left_now: 0.0,
                right_now: 0.0,
                left_forward: 0.0,
                right_forward: 0.0,
            },
        }
    }

    /// Instantaneous volume for a track
    pub fn now(&self, track: Track) -> f32 {
        match track {
            Track::Left => self.left_now,
            Track::Right => self.right_now,
            Track::Both => (self.left_now + self.right_now) / 2.0,
        }
    }

    /// Forward average for a track
    pub fn forward(&self, track: Track) -> f32 {
        match track {
            Track::Left => self.left_forward,
            Track::Right => self.right_forward,
            Track::Both => (self.left_forward + self.right_forward) / 2.0,
        }
    }
}

/// Draw one frame of the volume display and present it
pub fn render_snapshot(
    canvas: &mut dyn Canvas,
    formatter: &TextFormatter,
    snapshot: &VolumeSnapshot,
) -> Result<()> {
    canvas.draw(&DrawCommand::Clear)?;
    canvas.draw(&DrawCommand::Text {
        row: 0,
        text: formatter.position(snapshot.position),
    })?;
    let meters = [
        ("Left Volume", snapshot.left_now),
        ("Left Future", snapshot.left_forward),
        ("Right Volume", snapshot.right_now),
        ("Right Future", snapshot.right_forward),
    ];
    for (row, (label, level)) in meters.iter().enumerate() {
        canvas.draw(&DrawCommand::Meter {
            row: row + 1,
            label: label.to_string(),
            level: *level,
        })?;
    }
    canvas.swap_buffers()
}
