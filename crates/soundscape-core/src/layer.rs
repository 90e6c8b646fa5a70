//! Layer model: one sound source contributing to the mix

use serde::{Deserialize, Serialize};

/// Clamp a volume into the valid `[0, 1]` range.
///
/// Non-finite input maps to silence rather than poisoning downstream gain
/// math.
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_finite() {
        volume.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// One audio source with its own volume, mute and loop settings.
///
/// The field names follow the JSON shape external collaborators (search
/// wrappers, AI layer-list generators) produce:
/// `{id, sourceUrl, volume, isMuted?, loopHint, durationSeconds?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    /// Opaque unique id, the identity key for voice mapping.
    pub id: String,
    /// Locator for the decodable audio asset.
    pub source_url: String,
    /// Target loudness in `[0, 1]`.
    pub volume: f32,
    /// When true the effective volume is forced to 0; `volume` is preserved.
    #[serde(default)]
    pub is_muted: bool,
    /// Last non-zero volume, restored on unmute.
    #[serde(default)]
    pub last_volume: f32,
    /// True if the source is known to be seamlessly loopable.
    #[serde(default)]
    pub loop_hint: bool,
    /// Known or estimated clip length; `None` falls back to a configured
    /// default.
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Layer {
    /// Create a layer with full volume and no loop hint.
    pub fn new(id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Layer {
            id: id.into(),
            source_url: source_url.into(),
            volume: 1.0,
            is_muted: false,
            last_volume: 0.0,
            loop_hint: false,
            duration_seconds: None,
            name: None,
        }
    }

    /// Set the target volume (clamped to `[0, 1]`).
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = clamp_volume(volume);
        self
    }

    /// Mark the source as seamlessly loopable.
    pub fn with_loop_hint(mut self, loop_hint: bool) -> Self {
        self.loop_hint = loop_hint;
        self
    }

    /// Set the known clip duration in seconds.
    pub fn with_duration_secs(mut self, seconds: f64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The volume this layer contributes before the master stage: 0 when
    /// muted, the target volume otherwise.
    pub fn effective_volume(&self) -> f32 {
        if self.is_muted {
            0.0
        } else {
            clamp_volume(self.volume)
        }
    }

    /// Clip length in milliseconds, falling back to `default_ms` when the
    /// duration is unknown or degenerate.
    pub fn duration_ms(&self, default_ms: u64) -> u64 {
        match self.duration_seconds {
            Some(secs) if secs > 0.0 => (secs * 1000.0).round() as u64,
            _ => default_ms,
        }
    }
}
