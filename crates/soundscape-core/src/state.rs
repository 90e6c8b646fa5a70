//! Authoritative registry of active layers plus the global transport state

use crate::layer::{clamp_volume, Layer};
use serde::{Deserialize, Serialize};

/// Errors from registry operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("layer already registered: {0}")]
    DuplicateLayer(String),

    #[error("no such layer: {0}")]
    UnknownLayer(String),
}

pub type Result<T> = std::result::Result<T, StateError>;

/// The mutable soundscape state: active layers and the global transport.
///
/// All mutation goes through the operations below so the volume/mute
/// invariants hold (volumes stay in `[0, 1]`, mute preserves the target
/// volume for restore). Consumers of the scheduler observe this as one
/// coherent snapshot per reconciliation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundscapeState {
    layers: Vec<Layer>,
    is_playing: bool,
    master_volume: f32,
    master_is_muted: bool,
    last_master_volume: f32,
}

impl SoundscapeState {
    /// Idle state: not playing, no layers, master at full volume.
    pub fn new() -> Self {
        SoundscapeState {
            layers: Vec::new(),
            is_playing: false,
            master_volume: 1.0,
            master_is_muted: false,
            last_master_volume: 1.0,
        }
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn master_is_muted(&self) -> bool {
        self.master_is_muted
    }

    /// The master gain factor applied on top of each layer's effective
    /// volume: 0 when master-muted.
    pub fn master_effective_volume(&self) -> f32 {
        if self.master_is_muted {
            0.0
        } else {
            self.master_volume
        }
    }

    /// Register a new layer. Ids are identity keys for voice mapping, so a
    /// duplicate is rejected rather than silently replaced.
    pub fn add_layer(&mut self, mut layer: Layer) -> Result<()> {
        if self.layers.iter().any(|l| l.id == layer.id) {
            return Err(StateError::DuplicateLayer(layer.id));
        }
        layer.volume = clamp_volume(layer.volume);
        self.layers.push(layer);
        Ok(())
    }

    pub fn remove_layer(&mut self, id: &str) -> Result<Layer> {
        let idx = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| StateError::UnknownLayer(id.to_string()))?;
        Ok(self.layers.remove(idx))
    }

    /// Set a layer's target volume.
    ///
    /// Dragging a control to zero mutes the layer and remembers the prior
    /// non-zero level; dragging it back up unmutes.
    pub fn set_layer_volume(&mut self, id: &str, volume: f32) -> Result<()> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StateError::UnknownLayer(id.to_string()))?;

        let volume = clamp_volume(volume);
        if volume == 0.0 {
            if layer.volume > 0.0 {
                layer.last_volume = layer.volume;
            }
            layer.volume = 0.0;
            layer.is_muted = true;
        } else {
            layer.volume = volume;
            layer.is_muted = false;
        }
        Ok(())
    }

    /// Flip a layer's mute state. Unmuting restores exactly the volume that
    /// was set before muting, including 0.
    pub fn toggle_layer_mute(&mut self, id: &str) -> Result<bool> {
        let layer = self
            .layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StateError::UnknownLayer(id.to_string()))?;

        if layer.is_muted {
            layer.is_muted = false;
            if layer.volume == 0.0 {
                layer.volume = layer.last_volume;
            }
        } else {
            if layer.volume > 0.0 {
                layer.last_volume = layer.volume;
            }
            layer.is_muted = true;
        }
        Ok(layer.is_muted)
    }

    /// Set the master volume, with the same zero-means-mute behavior as the
    /// per-layer control.
    pub fn set_master_volume(&mut self, volume: f32) {
        let volume = clamp_volume(volume);
        if volume == 0.0 {
            if self.master_volume > 0.0 {
                self.last_master_volume = self.master_volume;
            }
            self.master_volume = 0.0;
            self.master_is_muted = true;
        } else {
            self.master_volume = volume;
            self.master_is_muted = false;
        }
    }

    pub fn toggle_master_mute(&mut self) -> bool {
        if self.master_is_muted {
            self.master_is_muted = false;
            if self.master_volume == 0.0 {
                self.master_volume = self.last_master_volume;
            }
        } else {
            if self.master_volume > 0.0 {
                self.last_master_volume = self.master_volume;
            }
            self.master_is_muted = true;
        }
        self.master_is_muted
    }

    /// Flip the global play/pause switch, returning the new state.
    pub fn toggle_playback(&mut self) -> bool {
        self.is_playing = !self.is_playing;
        self.is_playing
    }

    /// Clear all layers and force playback off.
    pub fn reset(&mut self) {
        self.layers.clear();
        self.is_playing = false;
    }
}

impl Default for SoundscapeState {
    fn default() -> Self {
        Self::new()
    }
}
