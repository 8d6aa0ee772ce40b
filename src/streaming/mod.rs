//! Audio Output & Streaming
//!
//! rodio-backed [`PlaybackBackend`](crate::PlaybackBackend). Each opened
//! device streams its own copy of the sound's samples and counts the frames
//! handed to the output mixer, which is what the position oracle polls.

pub mod audio_device;

pub use audio_device::{AudioDevice, RodioBackend};
