//! Master-cycle window math: how often and when a clip fires per window
//!
//! The scheduling math is pure and deterministic given an RNG, so the
//! effectful timer driving in `soundscape-audio` stays trivially thin.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Parameters of the repeating master window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowParams {
    /// Length of the master cycle in milliseconds.
    pub window_ms: u64,
    /// Maximum absolute jitter applied to each firing offset.
    pub half_jitter_ms: u64,
    /// Hard cap on per-window firings for very short clips.
    pub max_repeats: u32,
    /// Assumed clip length when a layer's duration is unknown.
    pub default_clip_ms: u64,
    /// Clips shorter than this get a fade envelope per firing even when
    /// seamlessly loopable.
    pub envelope_threshold_ms: u64,
    /// Fade-in/fade-out length for enveloped firings and teardown.
    pub fade_ms: u64,
}

impl Default for WindowParams {
    fn default() -> Self {
        WindowParams {
            window_ms: 30_000,
            half_jitter_ms: 1_500,
            max_repeats: 8,
            default_clip_ms: 5_000,
            envelope_threshold_ms: 10_000,
            fade_ms: 500,
        }
    }
}

/// How many times a clip of `duration_ms` fires per window: one full window
/// divided by the clip length, clamped to `[1, max_repeats]`.
pub fn repeat_count(duration_ms: u64, params: &WindowParams) -> u32 {
    let duration = if duration_ms == 0 {
        params.default_clip_ms
    } else {
        duration_ms
    };
    let repeats = params.window_ms / duration;
    (repeats as u32).clamp(1, params.max_repeats)
}

/// Compute one window's firing offsets for a clip: evenly spaced base
/// offsets perturbed by bounded uniform jitter, floored at zero.
///
/// Every window draws fresh jitter, which is what keeps the mix from
/// sounding like a robotic loop.
pub fn firing_offsets<R: Rng>(duration_ms: u64, params: &WindowParams, rng: &mut R) -> Vec<u64> {
    let repeats = repeat_count(duration_ms, params);
    let spacing = params.window_ms as f64 / repeats as f64;
    let half_jitter = params.half_jitter_ms as f64;

    (0..repeats)
        .map(|i| {
            let base = spacing * i as f64;
            let jitter = if half_jitter > 0.0 {
                rng.gen_range(-half_jitter..=half_jitter)
            } else {
                0.0
            };
            (base + jitter).max(0.0).round() as u64
        })
        .collect()
}

/// Whether a firing needs a fade envelope: short clips and sources that are
/// not seamlessly loopable would otherwise click at their edges.
pub fn needs_envelope(duration_ms: u64, loop_hint: bool, params: &WindowParams) -> bool {
    duration_ms < params.envelope_threshold_ms || !loop_hint
}
