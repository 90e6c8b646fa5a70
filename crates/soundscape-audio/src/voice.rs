//! The external audio capability the engine orchestrates
//!
//! The engine never touches decoded buffers or the output device. It drives
//! a per-layer [`AudioVoice`] — one preloaded, gapless, low-latency playback
//! handle — and decides only *when* and *at what volume* to invoke it.

use crate::Result;
use std::time::Duration;

/// One live, playable instance of a decoded audio source.
///
/// Implementations are expected to be gapless and low-jitter; `fade` ramps
/// the volume between two levels over the given duration without blocking.
pub trait AudioVoice: Send {
    /// Start or resume playback.
    fn play(&mut self);

    /// Pause playback, preserving the decoded buffer and position for
    /// instant resume.
    fn pause(&mut self);

    /// Stop playback entirely.
    fn stop(&mut self);

    fn set_volume(&mut self, volume: f32);

    fn volume(&self) -> f32;

    /// Ramp the volume from `from` to `to` over `duration`.
    fn fade(&mut self, from: f32, to: f32, duration: Duration);

    fn is_playing(&self) -> bool;

    /// Release the decoded buffer. The voice is unusable afterwards.
    fn unload(&mut self);
}

/// Creates preloaded voices for layer sources.
///
/// `looped` carries the layer's loop hint so seamless sources keep sounding
/// without re-triggering. Creation fails when the source cannot be fetched
/// or decoded; the engine keeps such layers registered but silent.
pub trait VoiceFactory: Send {
    fn create(&self, source_url: &str, looped: bool) -> Result<Box<dyn AudioVoice>>;
}
